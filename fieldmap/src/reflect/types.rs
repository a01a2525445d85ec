//! Type references as seen by the reflection layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The runtime type of a field: a primitive name or a class/enum identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TypeRef {
    Int,
    Float,
    String,
    Bool,
    /// A list or string-keyed map of values.
    Array,
    /// A [`Collection`](crate::Collection), which supports ordering.
    Collection,
    DateTime,
    /// Either a UUID or a ULID.
    Uid,
    Uuid,
    Ulid,
    Enum(String),
    Object(String),
    /// No declared type.
    Mixed,
    /// Only meaningful as a member of a union.
    Null,
}

impl TypeRef {
    /// The type name used in metadata, descriptions and error messages.
    pub fn name(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Array => "array",
            Self::Collection => "collection",
            Self::DateTime => "datetime",
            Self::Uid => "uid",
            Self::Uuid => "uuid",
            Self::Ulid => "ulid",
            Self::Enum(name) | Self::Object(name) => name,
            Self::Mixed => "mixed",
            Self::Null => "null",
        }
    }

    /// The built-in type with the given name. Class and enum names are not
    /// known here and yield `None`.
    pub fn builtin(name: &str) -> Option<Self> {
        Some(match name {
            "int" => Self::Int,
            "float" => Self::Float,
            "string" => Self::String,
            "bool" => Self::Bool,
            "array" => Self::Array,
            "collection" => Self::Collection,
            "datetime" => Self::DateTime,
            "uid" => Self::Uid,
            "uuid" => Self::Uuid,
            "ulid" => Self::Ulid,
            "mixed" => Self::Mixed,
            "null" => Self::Null,
            _ => return None,
        })
    }

    /// `int`, `string`, `float` or `bool`.
    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Int | Self::String | Self::Float | Self::Bool)
    }

    pub fn is_iterable(&self) -> bool {
        matches!(self, Self::Array | Self::Collection)
    }

    pub fn is_uid(&self) -> bool {
        matches!(self, Self::Uid | Self::Uuid | Self::Ulid)
    }

    /// The class name when this refers to a class.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Object(name) => Some(name),
            _ => None,
        }
    }

    pub fn enum_name(&self) -> Option<&str> {
        match self {
            Self::Enum(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declared type of a property or method return value.
///
/// Members are kept in declaration order; `Option<T>` declares `[T, null]`.
/// Arrays and collections additionally carry their element type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeclaredType {
    members: Vec<TypeRef>,
    element: Option<TypeRef>,
}

impl DeclaredType {
    /// A single, non-nullable type.
    pub fn of(ty: TypeRef) -> Self {
        Self {
            members: vec![ty],
            element: None,
        }
    }

    /// A union of types in declaration order.
    pub fn union(members: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            members: members.into_iter().collect(),
            element: None,
        }
    }

    /// An undeclared type, which accepts anything including null.
    pub fn mixed() -> Self {
        Self::default()
    }

    /// Add `null` to the union.
    pub fn nullable(mut self) -> Self {
        if !self.members.contains(&TypeRef::Null) {
            self.members.push(TypeRef::Null);
        }
        self
    }

    pub fn with_element(mut self, element: TypeRef) -> Self {
        self.element = Some(element);
        self
    }

    pub fn members(&self) -> &[TypeRef] {
        &self.members
    }

    pub fn element(&self) -> Option<&TypeRef> {
        self.element.as_ref()
    }

    pub fn allows_null(&self) -> bool {
        self.members.is_empty() || self.members.contains(&TypeRef::Null)
    }

    /// The first non-null member, or [`TypeRef::Mixed`].
    pub fn resolved(&self) -> TypeRef {
        self.members
            .iter()
            .find(|member| **member != TypeRef::Null)
            .cloned()
            .unwrap_or(TypeRef::Mixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_resolves_to_first_non_null_member() {
        let declared = DeclaredType::union([TypeRef::Null, TypeRef::Int, TypeRef::String]);
        assert_eq!(declared.resolved(), TypeRef::Int);
        assert!(declared.allows_null());
    }

    #[test]
    fn test_nullable_is_idempotent() {
        let declared = DeclaredType::of(TypeRef::Bool).nullable().nullable();
        assert_eq!(declared.members(), &[TypeRef::Bool, TypeRef::Null]);
    }

    #[test]
    fn test_mixed_allows_null() {
        let declared = DeclaredType::mixed();
        assert!(declared.allows_null());
        assert_eq!(declared.resolved(), TypeRef::Mixed);
    }

    #[test]
    fn test_names() {
        assert_eq!(TypeRef::Int.name(), "int");
        assert_eq!(TypeRef::Object("app::User".into()).name(), "app::User");
        assert_eq!(TypeRef::Collection.to_string(), "collection");
    }

    #[test]
    fn test_builtin_names_round_trip() {
        for ty in [TypeRef::Int, TypeRef::DateTime, TypeRef::Ulid, TypeRef::Mixed] {
            assert_eq!(TypeRef::builtin(ty.name()), Some(ty));
        }
        assert_eq!(TypeRef::builtin("app::User"), None);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&TypeRef::Object("app::User".into())).unwrap();
        assert_eq!(json, r#"{"kind":"object","name":"app::User"}"#);
        let back: TypeRef = serde_json::from_str(r#"{"kind":"int"}"#).unwrap();
        assert_eq!(back, TypeRef::Int);
    }
}
