//! Nested objects, arrays and collections.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::annotation::{Direction, OrderBy, DISCRIMINATOR_COLUMN};
use crate::describe::NESTED_OBJECT;
use crate::engine::Engine;
use crate::error::{Result, SerializerError};
use crate::handler::{
    class_base_name, describe_field, oa_friendly_type, raw_text, Description, TypeHandler,
};
use crate::metadata::FieldMetadata;
use crate::reflect::TypeRef;
use crate::value::FieldValue;

/// Recurses into nested objects and iterables through the [`Engine`].
///
/// This is the fallback handler: it has the lowest priority and describes
/// any field no other handler claims.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectHandler;

impl ObjectHandler {
    pub const ID: &'static str = "object";

    /// Class to deserialize `item` into.
    ///
    /// The discriminator map is consulted when the item carries a
    /// `discriminator` key. An unmapped tag skips the custom type and falls
    /// back to the declared type, which must be a registered class.
    fn item_type(
        item: &Value,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Option<String>> {
        let tag = metadata
            .discriminator_map
            .as_ref()
            .zip(item.get(DISCRIMINATOR_COLUMN));
        let Some((map, tag)) = tag else {
            return Ok(metadata.custom_type.clone());
        };

        if let Some(class) = map.get(&raw_text(tag)) {
            return Ok(Some(class.clone()));
        }
        let declared = metadata.runtime_type.name();
        if engine.types().contains_class(declared) {
            Ok(Some(declared.to_owned()))
        } else {
            Err(SerializerError::resolution(format!("Unable to resolve class \"{declared}\"")))
        }
    }

    fn items(
        value: Value,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Vec<(Option<String>, FieldValue)>> {
        let read = |item: Value| -> Result<FieldValue> {
            let item_type = Self::item_type(&item, metadata, engine)?;
            engine.from_value(item, item_type.as_deref())
        };
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| Ok((None, read(item)?)))
                .collect(),
            Value::Object(entries) => entries
                .into_iter()
                .map(|(key, item)| Ok((Some(key), read(item)?)))
                .collect(),
            other => Ok(vec![(None, read(other)?)]),
        }
    }
}

impl TypeHandler for ObjectHandler {
    fn id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        -1
    }

    fn supports_serialize(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::Object(_)) || value.is_iterable()
    }

    fn supports_deserialize(&self, value: &Value, _ty: &TypeRef) -> bool {
        value.is_array() || value.is_object()
    }

    fn supports_describe(&self, _name: &str, _metadata: &FieldMetadata) -> bool {
        true
    }

    fn serialize(
        &self,
        value: &FieldValue,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Value> {
        match (value, &metadata.order_by) {
            (FieldValue::Collection(items), Some(order_by)) => {
                let sorted = sort_items(items, order_by, engine)?;
                engine.to_array(&FieldValue::Collection(sorted), Some(metadata))
            }
            _ => engine.to_array(value, Some(metadata)),
        }
    }

    fn deserialize(
        &self,
        value: Value,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<FieldValue> {
        match metadata.runtime_type {
            TypeRef::Collection => Ok(FieldValue::Collection(
                Self::items(value, metadata, engine)?
                    .into_iter()
                    .map(|(_, item)| item)
                    .collect(),
            )),
            TypeRef::Array => {
                if metadata.custom_type.is_none() && metadata.discriminator_map.is_none() {
                    return Ok(FieldValue::from_json(value));
                }
                let keyed = value.is_object();
                let items = Self::items(value, metadata, engine)?;
                Ok(if keyed {
                    FieldValue::Map(
                        items
                            .into_iter()
                            .map(|(key, item)| (key.unwrap_or_default(), item))
                            .collect(),
                    )
                } else {
                    FieldValue::List(items.into_iter().map(|(_, item)| item).collect())
                })
            }
            _ => {
                let item_type = Self::item_type(&value, metadata, engine)?
                    .unwrap_or_else(|| metadata.runtime_type.name().to_owned());
                engine.from_value(value, Some(&item_type))
            }
        }
    }

    fn describe(
        &self,
        name: &str,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Description> {
        let mut description = describe_field(name, metadata);
        if !metadata.runtime_type.is_iterable() {
            description.insert(
                NESTED_OBJECT.into(),
                Value::from(metadata.runtime_type.name()),
            );
            return Ok(description);
        }

        description.insert("type".into(), Value::from("array"));
        if metadata.is_keys_values() {
            description.insert("type".into(), Value::from("object"));
            description.insert("title".into(), Value::from("Custom key-value data."));
            description.remove("items");
            return Ok(description);
        }

        let mut items = Map::new();
        match metadata.custom_type.as_deref() {
            Some(class) if engine.types().contains_class(class) => {
                description.insert(
                    "title".into(),
                    Value::from(format!("Array of {}", class_base_name(class))),
                );
                items.insert("type".into(), Value::from("object"));
                items.insert(NESTED_OBJECT.into(), Value::from(class));
            }
            Some(element) => {
                items.insert("type".into(), Value::from(oa_friendly_type(element)));
            }
            None => {}
        }
        description.insert("items".into(), Value::Object(items));
        Ok(description)
    }
}

/// Sort collection items by the given fields, like an ordered query would.
fn sort_items(
    items: &[FieldValue],
    order_by: &OrderBy,
    engine: &Engine,
) -> Result<Vec<FieldValue>> {
    let mut keyed = items
        .iter()
        .map(|item| {
            let keys = order_by
                .keys()
                .map(|field| match item.as_object() {
                    Some(object) => engine.read_field(object, field),
                    None => Ok(FieldValue::Null),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((keys, item.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by(|(a, _), (b, _)| {
        order_by
            .values()
            .zip(a.iter().zip(b.iter()))
            .map(|(direction, (a, b))| match direction {
                Direction::Asc => compare_values(a, b),
                Direction::Desc => compare_values(b, a),
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}

/// Order of two field values. Nulls sort first; values of unrelated shapes
/// compare equal.
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    use FieldValue as V;

    match (a, b) {
        (V::Null, V::Null) => Ordering::Equal,
        (V::Null, _) => Ordering::Less,
        (_, V::Null) => Ordering::Greater,
        (V::Int(a), V::Int(b)) => a.cmp(b),
        (V::Int(a), V::Float(b)) => (*a as f64).total_cmp(b),
        (V::Float(a), V::Int(b)) => a.total_cmp(&(*b as f64)),
        (V::Float(a), V::Float(b)) => a.total_cmp(b),
        (V::String(a), V::String(b)) => a.cmp(b),
        (V::Bool(a), V::Bool(b)) => a.cmp(b),
        (V::DateTime(a), V::DateTime(b)) => a.cmp(b),
        (V::Uid(a), V::Uid(b)) => a.to_string().cmp(&b.to_string()),
        (V::Enum(a), V::Enum(b)) => match (&a.backing, &b.backing) {
            (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
            _ => a.case.cmp(&b.case),
        },
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_values() {
        let int = FieldValue::Int;
        assert_eq!(compare_values(&int(1), &int(2)), Ordering::Less);
        assert_eq!(compare_values(&2.5.into(), &int(2)), Ordering::Greater);
        assert_eq!(compare_values(&FieldValue::Null, &int(0)), Ordering::Less);
        assert_eq!(compare_values(&"b".into(), &"a".into()), Ordering::Greater);
        assert_eq!(compare_values(&true.into(), &"a".into()), Ordering::Equal);
    }

    #[test]
    fn test_supports() {
        assert!(ObjectHandler.supports_serialize(&FieldValue::List(vec![])));
        assert!(!ObjectHandler.supports_serialize(&FieldValue::Int(1)));
        assert!(ObjectHandler.supports_deserialize(&serde_json::json!({}), &TypeRef::Mixed));
        assert!(!ObjectHandler.supports_deserialize(&serde_json::json!("x"), &TypeRef::Array));
    }
}
