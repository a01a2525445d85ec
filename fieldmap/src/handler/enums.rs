//! Unit and backed enums.

use serde_json::Value;

use crate::engine::Engine;
use crate::error::{Result, SerializerError};
use crate::handler::{describe_field, raw_text, Description, TypeHandler};
use crate::metadata::FieldMetadata;
use crate::reflect::{EnumCase, EnumDescriptor, TypeRef};
use crate::value::{EnumBacking, EnumValue, FieldValue};

/// Backed enums map to their backing value, unit enums to the case name.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumHandler;

impl EnumHandler {
    pub const ID: &'static str = "enum";

    fn descriptor<'a>(metadata: &FieldMetadata, engine: &'a Engine) -> Result<&'a EnumDescriptor> {
        metadata
            .runtime_type
            .enum_name()
            .and_then(|name| engine.types().enum_type(name))
            .ok_or_else(|| {
                SerializerError::serializer(format!(
                    "Unsupported value for EnumHandler::deserialize: {}",
                    metadata.runtime_type
                ))
            })
    }
}

impl TypeHandler for EnumHandler {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supports_serialize(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Enum(_))
    }

    fn supports_deserialize(&self, _value: &Value, ty: &TypeRef) -> bool {
        matches!(ty, TypeRef::Enum(_))
    }

    fn supports_describe(&self, _name: &str, metadata: &FieldMetadata) -> bool {
        matches!(metadata.runtime_type, TypeRef::Enum(_))
    }

    fn serialize(
        &self,
        value: &FieldValue,
        _metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<Value> {
        match value {
            FieldValue::Enum(EnumValue {
                backing: Some(backing),
                ..
            }) => Ok(backing.to_json()),
            FieldValue::Enum(value) => Ok(Value::String(value.case.clone())),
            other => Err(SerializerError::serializer(format!(
                "Unsupported value for EnumHandler::serialize: {}",
                other.type_label()
            ))),
        }
    }

    fn deserialize(
        &self,
        value: Value,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<FieldValue> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        let descriptor = Self::descriptor(metadata, engine)?;
        let raw = raw_text(&value);

        if descriptor.is_backed() {
            let backing = match value {
                Value::Number(number) => number.as_i64().map(EnumBacking::Int),
                Value::String(text) => Some(EnumBacking::String(text)),
                _ => None,
            };
            let case = backing.as_ref().and_then(|backing| {
                descriptor
                    .case_by_backing(backing)
                    .or_else(|| match backing {
                        EnumBacking::String(text) => text
                            .parse::<i64>()
                            .ok()
                            .and_then(|int| descriptor.case_by_backing(&EnumBacking::Int(int))),
                        EnumBacking::Int(_) => None,
                    })
            });
            return match case {
                Some(case) => Ok(FieldValue::Enum(EnumValue {
                    type_name: descriptor.name().to_owned(),
                    case: case.name.clone(),
                    backing: case.backing.clone(),
                })),
                None => Err(SerializerError::deserialization(format!(
                    "Cannot deserialize value \"{raw}\" into a BackedEnum. Possible options are: \"{}\".",
                    options(descriptor, backing_label)
                ))),
            };
        }

        match descriptor.case_by_name(value.as_str().unwrap_or_default()) {
            Some(case) => Ok(FieldValue::Enum(EnumValue::unit(
                descriptor.name(),
                case.name.as_str(),
            ))),
            None => Err(SerializerError::deserialization(format!(
                "Cannot deserialize value \"{raw}\" into a UnitEnum. Possible options are: \"{}\".",
                options(descriptor, |case| Some(case.name.clone()))
            ))),
        }
    }

    fn describe(
        &self,
        name: &str,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Description> {
        let descriptor = Self::descriptor(metadata, engine)?;
        let mut description = describe_field(name, metadata);
        let cases = descriptor
            .cases()
            .iter()
            .map(|case| match &case.backing {
                Some(backing) => backing.to_json(),
                None => Value::String(case.name.clone()),
            })
            .collect();
        description.insert("enum".into(), Value::Array(cases));
        description.insert("type".into(), Value::from("string"));
        Ok(description)
    }
}

fn backing_label(case: &EnumCase) -> Option<String> {
    case.backing.as_ref().map(ToString::to_string)
}

fn options(descriptor: &EnumDescriptor, label: impl Fn(&EnumCase) -> Option<String>) -> String {
    descriptor
        .cases()
        .iter()
        .filter_map(label)
        .collect::<Vec<_>>()
        .join("\", \"")
}
