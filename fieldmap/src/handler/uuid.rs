//! RFC 4122 UUIDs.

use serde_json::Value;
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::{Result, SerializerError};
use crate::handler::{describe_field, raw_text, Description, TypeHandler};
use crate::metadata::FieldMetadata;
use crate::reflect::TypeRef;
use crate::value::{FieldValue, Uid};

const NIL: &str = "00000000-0000-0000-0000-000000000000";
const MAX: &str = "ffffffff-ffff-ffff-ffff-ffffffffffff";

/// UUID fields, in hyphenated form. An empty string reads as the nil UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidHandler;

impl UuidHandler {
    pub const ID: &'static str = "uuid";
}

impl TypeHandler for UuidHandler {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supports_serialize(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Uid(Uid::Uuid(_)))
    }

    fn supports_deserialize(&self, _value: &Value, ty: &TypeRef) -> bool {
        *ty == TypeRef::Uuid
    }

    fn supports_describe(&self, _name: &str, metadata: &FieldMetadata) -> bool {
        metadata.runtime_type == TypeRef::Uuid
    }

    fn serialize(
        &self,
        value: &FieldValue,
        _metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<Value> {
        match value {
            FieldValue::Uid(Uid::Uuid(uuid)) => Ok(Value::String(uuid.hyphenated().to_string())),
            other => Err(SerializerError::serializer(format!(
                "Unsupported value for UuidHandler::serialize: {}",
                other.type_label()
            ))),
        }
    }

    fn deserialize(
        &self,
        value: Value,
        _metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<FieldValue> {
        let uuid = match value.as_str() {
            None if value.is_null() => return Ok(FieldValue::Null),
            Some("") | Some(NIL) => Uuid::nil(),
            Some(MAX) => Uuid::from_u128(u128::MAX),
            Some(text) => Uuid::parse_str(text).map_err(|e| {
                SerializerError::deserialization(format!("Invalid UUID \"{text}\"."))
                    .with_source(e)
            })?,
            None => {
                return Err(SerializerError::deserialization(format!(
                    "Invalid UUID \"{}\".",
                    raw_text(&value)
                )))
            }
        };
        Ok(FieldValue::Uid(Uid::Uuid(uuid)))
    }

    fn describe(
        &self,
        name: &str,
        metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<Description> {
        let mut description = describe_field(name, metadata);
        description.insert("type".into(), Value::from("string"));
        description.insert("title".into(), Value::from("UUID"));
        description.insert("format".into(), Value::from("uuid"));
        Ok(description)
    }
}
