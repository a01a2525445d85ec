//! Type handlers.
//!
//! A [`TypeHandler`] converts one family of values between their runtime
//! form ([`FieldValue`]) and JSON. Handlers are tried in priority order by the
//! [`HandlerResolver`]; the first whose support predicate matches wins unless
//! the field names a handler explicitly with `#[serialize(handler = "...")]`.
//!
//! | Handler | Id | Priority |
//! |---------|----|----------|
//! | [`BasicHandler`] | `basic` | 10 |
//! | [`DateTimeHandler`] | `date_time` | 0 |
//! | [`EnumHandler`] | `enum` | 0 |
//! | [`UuidHandler`] | `uuid` | 0 |
//! | [`UidHandler`] | `uid` | 0 |
//! | [`ObjectHandler`] | `object` | -1 |
//! | [`ArrayStringHandler`] | `array_string` | explicit only |
//! | [`EntityIdHandler`] | `entity_id` | explicit only |

use serde_json::{Map, Value};

use crate::engine::Engine;
use crate::error::Result;
use crate::metadata::FieldMetadata;
use crate::reflect::TypeRef;
use crate::value::FieldValue;

pub mod array_string;
pub mod basic;
pub mod date_time;
pub mod entity_id;
pub mod enums;
pub mod object;
pub mod resolver;
pub mod uid;
pub mod uuid;

pub use array_string::ArrayStringHandler;
pub use basic::BasicHandler;
pub use date_time::DateTimeHandler;
pub use entity_id::{EntityIdHandler, EntityRepository};
pub use enums::EnumHandler;
pub use object::ObjectHandler;
pub use resolver::HandlerResolver;
pub use uid::UidHandler;
pub use self::uuid::UuidHandler;

/// A schema fragment describing one field.
pub type Description = Map<String, Value>;

/// Converts a family of values to and from JSON.
pub trait TypeHandler: Send + Sync {
    /// Identifier used by `#[serialize(handler = "...")]`.
    fn id(&self) -> &str;

    /// Handlers with a higher priority are consulted first.
    fn priority(&self) -> i32 {
        0
    }

    fn supports_serialize(&self, _value: &FieldValue) -> bool {
        false
    }

    fn supports_deserialize(&self, _value: &Value, _ty: &TypeRef) -> bool {
        false
    }

    fn supports_describe(&self, _name: &str, _metadata: &FieldMetadata) -> bool {
        false
    }

    fn serialize(
        &self,
        value: &FieldValue,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Value>;

    fn deserialize(
        &self,
        value: Value,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<FieldValue>;

    fn describe(
        &self,
        name: &str,
        metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<Description> {
        Ok(describe_field(name, metadata))
    }
}

/// The description every handler starts from.
///
/// Contains the field name, its OpenAPI-friendly type, `readOnly` for fields
/// without a mutator, `nullable` for nullable fields and `items` for arrays.
pub fn describe_field(name: &str, metadata: &FieldMetadata) -> Description {
    let mut description = Description::new();
    description.insert("property".into(), Value::from(name));
    description.insert(
        "type".into(),
        Value::from(oa_friendly_type(metadata.runtime_type.name())),
    );
    if metadata.is_read_only() {
        description.insert("readOnly".into(), Value::Bool(true));
    }
    if metadata.is_nullable {
        description.insert("nullable".into(), Value::Bool(true));
    }
    if metadata.runtime_type == TypeRef::Array {
        let mut items = Description::new();
        if let Some(item_type) = &metadata.custom_type {
            items.insert("type".into(), Value::from(item_type.as_str()));
        }
        description.insert("items".into(), Value::Object(items));
    }
    description
}

/// `int` → `integer`, `bool` → `boolean`, anything else unchanged.
pub fn oa_friendly_type(type_name: &str) -> &str {
    match type_name {
        "int" => "integer",
        "bool" => "boolean",
        other => other,
    }
}

/// The last path segment of a class name: `app::model::Tag` → `Tag`.
pub fn class_base_name(class_name: &str) -> &str {
    class_name.rsplit("::").next().unwrap_or(class_name)
}

/// Text of a scalar JSON value as it appears in error messages.
pub(crate) fn raw_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_field_base_payload() {
        let metadata = FieldMetadata::new(TypeRef::Int, "get_count").nullable(true);
        assert_eq!(
            Value::Object(describe_field("count", &metadata)),
            json!({"property": "count", "type": "integer", "readOnly": true, "nullable": true})
        );
    }

    #[test]
    fn test_describe_field_array_items() {
        let writable = FieldMetadata::new(TypeRef::Array, "get_ids").with_mutator("set_ids");
        assert_eq!(
            Value::Object(describe_field("ids", &writable)),
            json!({"property": "ids", "type": "array", "items": {}})
        );

        let typed = writable.with_custom_type("int");
        assert_eq!(
            describe_field("ids", &typed)["items"],
            json!({"type": "int"})
        );
    }

    #[test]
    fn test_class_base_name() {
        assert_eq!(class_base_name("app::model::Tag"), "Tag");
        assert_eq!(class_base_name("Tag"), "Tag");
    }

    #[test]
    fn test_oa_friendly_type() {
        assert_eq!(oa_friendly_type("bool"), "boolean");
        assert_eq!(oa_friendly_type("string"), "string");
    }
}
