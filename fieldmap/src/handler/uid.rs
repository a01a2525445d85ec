//! UUIDs and ULIDs behind the common [`Uid`] type.

use serde_json::Value;
use ulid::Ulid;
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::{Result, SerializerError};
use crate::handler::{describe_field, Description, TypeHandler};
use crate::metadata::FieldMetadata;
use crate::reflect::TypeRef;
use crate::value::{FieldValue, Uid};

/// Any unique identifier. Incoming strings are tried as a ULID first, then as
/// a UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct UidHandler;

impl UidHandler {
    pub const ID: &'static str = "uid";
}

impl TypeHandler for UidHandler {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supports_serialize(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Uid(_))
    }

    fn supports_deserialize(&self, _value: &Value, ty: &TypeRef) -> bool {
        ty.is_uid()
    }

    fn supports_describe(&self, _name: &str, metadata: &FieldMetadata) -> bool {
        metadata.runtime_type.is_uid()
    }

    fn serialize(
        &self,
        value: &FieldValue,
        _metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<Value> {
        match value {
            FieldValue::Uid(uid) => Ok(Value::String(uid.to_string())),
            other => Err(SerializerError::serializer(format!(
                "Unsupported value for UidHandler::serialize: {}",
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
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        let text = value.as_str().unwrap_or_default();
        if let Ok(ulid) = Ulid::from_string(text) {
            return Ok(FieldValue::Uid(Uid::Ulid(ulid)));
        }
        if let Ok(uuid) = Uuid::parse_str(text) {
            return Ok(FieldValue::Uid(Uid::Uuid(uuid)));
        }
        Err(SerializerError::serializer("Unsupported value for UidHandler::deserialize"))
    }

    fn describe(
        &self,
        name: &str,
        metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<Description> {
        let mut description = describe_field(name, metadata);
        description.insert("type".into(), Value::from("string"));
        description.insert("title".into(), Value::from("UID"));
        description.insert("format".into(), Value::from("uid"));
        Ok(description)
    }
}
