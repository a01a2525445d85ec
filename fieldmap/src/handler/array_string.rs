//! Lists encoded as comma separated strings.

use serde_json::Value;

use crate::engine::Engine;
use crate::error::{Result, SerializerError};
use crate::handler::basic::cast;
use crate::handler::{describe_field, Description, TypeHandler};
use crate::metadata::FieldMetadata;
use crate::reflect::TypeRef;
use crate::value::FieldValue;

/// `["1", "2", "3"]` ⇄ `"1,2,3"`.
///
/// Only used when a field names it with `#[serialize(handler = "array_string")]`.
/// Items are cast to the element type when it is `int` or `float` and
/// trimmed otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayStringHandler;

impl ArrayStringHandler {
    pub const ID: &'static str = "array_string";
}

impl TypeHandler for ArrayStringHandler {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supports_describe(&self, _name: &str, metadata: &FieldMetadata) -> bool {
        metadata.custom_handler.as_deref() == Some(Self::ID)
    }

    fn serialize(
        &self,
        value: &FieldValue,
        _metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<Value> {
        let items: Vec<&FieldValue> = match value {
            FieldValue::Null => return Ok(Value::Null),
            FieldValue::List(items) | FieldValue::Collection(items) => items.iter().collect(),
            FieldValue::Map(entries) => entries.values().collect(),
            _ => return Err(unsupported("serialize")),
        };

        let parts = items
            .into_iter()
            .map(|item| match item {
                FieldValue::String(text) => Ok(text.clone()),
                FieldValue::Int(int) => Ok(int.to_string()),
                FieldValue::Float(float) => Ok(float.to_string()),
                FieldValue::Bool(flag) => Ok(if *flag { "1" } else { "" }.to_owned()),
                FieldValue::Null => Ok(String::new()),
                _ => Err(unsupported("serialize")),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Value::String(parts.join(",")))
    }

    fn deserialize(
        &self,
        value: Value,
        metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<FieldValue> {
        let items = match value {
            Value::Null | Value::Bool(false) => Vec::new(),
            Value::String(text) if text.is_empty() => Vec::new(),
            Value::Array(items) if items.is_empty() => Vec::new(),
            Value::String(text) => {
                let element = metadata
                    .custom_type
                    .as_deref()
                    .and_then(TypeRef::builtin)
                    .filter(|ty| matches!(ty, TypeRef::Int | TypeRef::Float));
                text.split(',')
                    .map(|item| match &element {
                        Some(ty) => cast(Value::String(item.to_owned()), ty),
                        None => Ok(FieldValue::String(item.trim().to_owned())),
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            _ => return Err(unsupported("deserialize")),
        };

        Ok(match metadata.runtime_type {
            TypeRef::Collection => FieldValue::Collection(items),
            _ => FieldValue::List(items),
        })
    }

    fn describe(
        &self,
        name: &str,
        metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<Description> {
        let mut description = describe_field(name, metadata);
        description.insert("type".into(), Value::from("string"));
        description.insert(
            "format".into(),
            Value::from("string, values separated by comma"),
        );
        description.remove("items");
        Ok(description)
    }
}

fn unsupported(operation: &str) -> SerializerError {
    SerializerError::serializer(format!("Unsupported value for ArrayStringHandler::{operation}"))
}
