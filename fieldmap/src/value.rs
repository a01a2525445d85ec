//! Dynamic values read from and written into reflected objects.

use std::fmt;
use std::ops::Deref;

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use ulid::Ulid;
use uuid::Uuid;

use crate::error::{Result, SerializerError};
use crate::reflect::Object;

/// Underlying scalar of a backed enum case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumBacking {
    Int(i64),
    String(String),
}

impl EnumBacking {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(value) => Value::from(*value),
            Self::String(value) => Value::String(value.clone()),
        }
    }
}

impl fmt::Display for EnumBacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<i64> for EnumBacking {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for EnumBacking {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for EnumBacking {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// A single enum case as a dynamic value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: String,
    pub case: String,
    pub backing: Option<EnumBacking>,
}

impl EnumValue {
    pub fn unit(type_name: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            case: case.into(),
            backing: None,
        }
    }

    pub fn backed(
        type_name: impl Into<String>,
        case: impl Into<String>,
        backing: impl Into<EnumBacking>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            case: case.into(),
            backing: Some(backing.into()),
        }
    }
}

/// A unique identifier, either a UUID or a ULID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uid {
    Uuid(Uuid),
    Ulid(Ulid),
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(uuid) => write!(f, "{}", uuid.hyphenated()),
            Self::Ulid(ulid) => write!(f, "{ulid}"),
        }
    }
}

impl From<Uuid> for Uid {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<Ulid> for Uid {
    fn from(value: Ulid) -> Self {
        Self::Ulid(value)
    }
}

/// An ordered collection of items that can be re-ordered by field values
/// before it is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Replace the item at `index`, appending when `index` is one past the end.
    pub fn set(&mut self, index: usize, item: T) -> bool {
        if index < self.items.len() {
            self.items[index] = item;
            true
        } else if index == self.items.len() {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Deref for Collection<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A value read from, or about to be written into, a reflected object.
#[derive(Debug, Clone, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Enum(EnumValue),
    Uid(Uid),
    Object(Box<dyn Object>),
    List(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
    Collection(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_)
        )
    }

    pub fn is_iterable(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_) | Self::Collection(_))
    }

    pub fn as_object(&self) -> Option<&dyn Object> {
        match self {
            Self::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    /// Short label of the value's shape, used in error messages.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::Enum(_) => "enum",
            Self::Uid(_) => "uid",
            Self::Object(_) => "object",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Collection(_) => "collection",
        }
    }

    /// Convert plain JSON data without consulting any metadata.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(value) => Self::Bool(value),
            Value::Number(number) => match number.as_i64() {
                Some(value) => Self::Int(value),
                None => Self::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(value) => Self::String(value),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Convert plain data to JSON.
    ///
    /// Objects cannot be converted without metadata and are rejected; use the
    /// engine for those.
    pub fn to_json(&self) -> Result<Value> {
        Ok(match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Int(value) => Value::from(*value),
            Self::Float(value) => Number::from_f64(*value)
                .map(Value::Number)
                .ok_or_else(|| SerializerError::serializer("Cannot encode json data."))?,
            Self::String(value) => Value::String(value.clone()),
            Self::DateTime(value) => Value::String(value.to_rfc3339()),
            Self::Enum(value) => match &value.backing {
                Some(backing) => backing.to_json(),
                None => Value::String(value.case.clone()),
            },
            Self::Uid(uid) => Value::String(uid.to_string()),
            Self::Object(object) => {
                return Err(SerializerError::serializer(format!(
                    "Unsupported value for plain conversion: {}",
                    object.class_name()
                )))
            }
            Self::List(items) | Self::Collection(items) => {
                Value::Array(items.iter().map(Self::to_json).collect::<Result<_>>()?)
            }
            Self::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json()?);
                }
                Value::Object(map)
            }
        })
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Uid> for FieldValue {
    fn from(value: Uid) -> Self {
        Self::Uid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_shape() {
        let value = FieldValue::from_json(json!({"a": [1, 2.5, "x", null], "b": true}));
        let FieldValue::Map(entries) = value else {
            panic!("expected map");
        };
        assert!(matches!(entries.get("b"), Some(FieldValue::Bool(true))));
        let Some(FieldValue::List(items)) = entries.get("a") else {
            panic!("expected list");
        };
        assert!(matches!(items[0], FieldValue::Int(1)));
        assert!(matches!(items[1], FieldValue::Float(f) if f == 2.5));
        assert!(matches!(items[3], FieldValue::Null));
    }

    #[test]
    fn test_to_json_rejects_non_finite_floats() {
        let error = FieldValue::Float(f64::INFINITY).to_json().unwrap_err();
        assert_eq!(error.to_string(), "Cannot encode json data.");
    }

    #[test]
    fn test_enum_to_json_uses_backing_or_case() {
        let backed = FieldValue::Enum(EnumValue::backed("app::Place", "First", "first"));
        let unit = FieldValue::Enum(EnumValue::unit("app::Color", "Red"));
        assert_eq!(backed.to_json().unwrap(), json!("first"));
        assert_eq!(unit.to_json().unwrap(), json!("Red"));
    }

    #[test]
    fn test_uid_display() {
        let uuid = Uuid::nil();
        assert_eq!(
            Uid::from(uuid).to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
        let ulid = Uid::from(Ulid::nil());
        assert_eq!(ulid.to_string(), "00000000000000000000000000");
    }

    #[test]
    fn test_collection_set_replaces_or_appends() {
        let mut collection: Collection<i32> = vec![1, 2].into();
        assert!(collection.set(0, 10));
        assert!(collection.set(2, 3));
        assert!(!collection.set(5, 9));
        assert_eq!(collection.into_vec(), vec![10, 2, 3]);
    }
}
