//! Reflection and value conversions for standard and third-party types.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use ulid::Ulid;
use uuid::Uuid;

use crate::error::{Result, SerializerError};
use crate::reflect::{
    unexpected_value, DeclaredType, FromFieldValue, Object, Reflect, ToFieldValue, TypeRef,
    TypeRegistry,
};
use crate::value::{Collection, FieldValue, Uid};

// =============================================================================
// Primitive types
// =============================================================================

impl Reflect for bool {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::Bool)
    }
}

impl ToFieldValue for bool {
    fn to_field_value(&self) -> Result<FieldValue> {
        Ok(FieldValue::Bool(*self))
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Bool(value) => Ok(value),
            other => Err(unexpected_value("bool", &other)),
        }
    }
}

impl Reflect for String {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::String)
    }
}

impl Reflect for str {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::String)
    }
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> Result<FieldValue> {
        Ok(FieldValue::String(self.clone()))
    }
}

impl ToFieldValue for str {
    fn to_field_value(&self) -> Result<FieldValue> {
        Ok(FieldValue::String(self.to_owned()))
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::String(value) => Ok(value),
            other => Err(unexpected_value("string", &other)),
        }
    }
}

// =============================================================================
// Integer implementations
// =============================================================================

macro_rules! impl_reflect_for_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn declared_type() -> DeclaredType {
                    DeclaredType::of(TypeRef::Int)
                }
            }

            impl ToFieldValue for $ty {
                fn to_field_value(&self) -> Result<FieldValue> {
                    i64::try_from(*self).map(FieldValue::Int).map_err(|_| {
                        let message = format!("Integer {} out of range for int", self);
                        SerializerError::serializer(message)
                    })
                }
            }

            impl FromFieldValue for $ty {
                fn from_field_value(value: FieldValue) -> Result<Self> {
                    match value {
                        FieldValue::Int(value) => <$ty>::try_from(value).map_err(|_| {
                            SerializerError::serializer(format!(
                                "Integer {} out of range for {}",
                                value,
                                stringify!($ty)
                            ))
                        }),
                        other => Err(unexpected_value("int", &other)),
                    }
                }
            }
        )*
    };
}

impl_reflect_for_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// =============================================================================
// Float implementations
// =============================================================================

macro_rules! impl_reflect_for_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn declared_type() -> DeclaredType {
                    DeclaredType::of(TypeRef::Float)
                }
            }

            impl ToFieldValue for $ty {
                fn to_field_value(&self) -> Result<FieldValue> {
                    Ok(FieldValue::Float(f64::from(*self)))
                }
            }

            impl FromFieldValue for $ty {
                fn from_field_value(value: FieldValue) -> Result<Self> {
                    match value {
                        FieldValue::Float(value) => Ok(value as $ty),
                        FieldValue::Int(value) => Ok(value as $ty),
                        other => Err(unexpected_value("float", &other)),
                    }
                }
            }
        )*
    };
}

impl_reflect_for_float!(f32, f64);

// =============================================================================
// Wrapper implementations
// =============================================================================

impl<T: Reflect> Reflect for Option<T> {
    fn declared_type() -> DeclaredType {
        T::declared_type().nullable()
    }

    fn register_type(types: &mut TypeRegistry) {
        T::register_type(types);
    }
}

impl<T: ToFieldValue> ToFieldValue for Option<T> {
    fn to_field_value(&self) -> Result<FieldValue> {
        match self {
            Some(value) => value.to_field_value(),
            None => Ok(FieldValue::Null),
        }
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Null => Ok(None),
            value => T::from_field_value(value).map(Some),
        }
    }
}

impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn declared_type() -> DeclaredType {
        T::declared_type()
    }

    fn register_type(types: &mut TypeRegistry) {
        T::register_type(types);
    }
}

impl<T: ToFieldValue + ?Sized> ToFieldValue for Box<T> {
    fn to_field_value(&self) -> Result<FieldValue> {
        self.as_ref().to_field_value()
    }
}

impl<T: FromFieldValue> FromFieldValue for Box<T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        T::from_field_value(value).map(Box::new)
    }
}

impl<T: Reflect + ?Sized> Reflect for &T {
    fn declared_type() -> DeclaredType {
        T::declared_type()
    }

    fn register_type(types: &mut TypeRegistry) {
        T::register_type(types);
    }
}

impl<T: ToFieldValue + ?Sized> ToFieldValue for &T {
    fn to_field_value(&self) -> Result<FieldValue> {
        (**self).to_field_value()
    }
}

// =============================================================================
// Polymorphic objects
// =============================================================================

// Any registered class; the concrete class is picked when deserializing.
impl Reflect for dyn Object {
    fn declared_type() -> DeclaredType {
        DeclaredType::mixed()
    }
}

impl ToFieldValue for dyn Object {
    fn to_field_value(&self) -> Result<FieldValue> {
        Ok(FieldValue::Object(self.clone_object()))
    }
}

impl FromFieldValue for Box<dyn Object> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Object(object) => Ok(object),
            other => Err(unexpected_value("object", &other)),
        }
    }
}

// =============================================================================
// Collection implementations
// =============================================================================

fn items_of(value: FieldValue, expected: &str) -> Result<Vec<FieldValue>> {
    match value {
        FieldValue::List(items) | FieldValue::Collection(items) => Ok(items),
        FieldValue::Map(entries) => Ok(entries.into_values().collect()),
        other => Err(unexpected_value(expected, &other)),
    }
}

fn entries_of(value: FieldValue, expected: &str) -> Result<Vec<(String, FieldValue)>> {
    match value {
        FieldValue::Map(entries) => Ok(entries.into_iter().collect()),
        FieldValue::List(items) | FieldValue::Collection(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect()),
        other => Err(unexpected_value(expected, &other)),
    }
}

fn map_entries<'a, T: ToFieldValue + 'a>(
    entries: impl Iterator<Item = (&'a String, &'a T)>,
) -> Result<FieldValue> {
    entries
        .map(|(key, value)| Ok((key.clone(), value.to_field_value()?)))
        .collect::<Result<_>>()
        .map(FieldValue::Map)
}

impl<T: Reflect> Reflect for Vec<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::Array).with_element(T::declared_type().resolved())
    }

    fn register_type(types: &mut TypeRegistry) {
        T::register_type(types);
    }
}

impl<T: ToFieldValue> ToFieldValue for Vec<T> {
    fn to_field_value(&self) -> Result<FieldValue> {
        self.iter()
            .map(ToFieldValue::to_field_value)
            .collect::<Result<_>>()
            .map(FieldValue::List)
    }
}

impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        items_of(value, "list")?
            .into_iter()
            .map(T::from_field_value)
            .collect()
    }
}

impl<T: Reflect> Reflect for Collection<T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::Collection).with_element(T::declared_type().resolved())
    }

    fn register_type(types: &mut TypeRegistry) {
        T::register_type(types);
    }
}

impl<T: ToFieldValue> ToFieldValue for Collection<T> {
    fn to_field_value(&self) -> Result<FieldValue> {
        self.iter()
            .map(ToFieldValue::to_field_value)
            .collect::<Result<_>>()
            .map(FieldValue::Collection)
    }
}

impl<T: FromFieldValue> FromFieldValue for Collection<T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        items_of(value, "collection")?
            .into_iter()
            .map(T::from_field_value)
            .collect()
    }
}

impl<T: Reflect> Reflect for IndexMap<String, T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::Array).with_element(T::declared_type().resolved())
    }

    fn register_type(types: &mut TypeRegistry) {
        T::register_type(types);
    }
}

impl<T: ToFieldValue> ToFieldValue for IndexMap<String, T> {
    fn to_field_value(&self) -> Result<FieldValue> {
        map_entries(self.iter())
    }
}

impl<T: FromFieldValue> FromFieldValue for IndexMap<String, T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        entries_of(value, "map")?
            .into_iter()
            .map(|(key, value)| Ok((key, T::from_field_value(value)?)))
            .collect()
    }
}

impl<T: Reflect> Reflect for BTreeMap<String, T> {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::Array).with_element(T::declared_type().resolved())
    }

    fn register_type(types: &mut TypeRegistry) {
        T::register_type(types);
    }
}

impl<T: ToFieldValue> ToFieldValue for BTreeMap<String, T> {
    fn to_field_value(&self) -> Result<FieldValue> {
        map_entries(self.iter())
    }
}

impl<T: FromFieldValue> FromFieldValue for BTreeMap<String, T> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        entries_of(value, "map")?
            .into_iter()
            .map(|(key, value)| Ok((key, T::from_field_value(value)?)))
            .collect()
    }
}

impl<T: Reflect, S> Reflect for HashMap<String, T, S> {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::Array).with_element(T::declared_type().resolved())
    }

    fn register_type(types: &mut TypeRegistry) {
        T::register_type(types);
    }
}

impl<T: ToFieldValue, S> ToFieldValue for HashMap<String, T, S> {
    fn to_field_value(&self) -> Result<FieldValue> {
        map_entries(self.iter())
    }
}

impl<T: FromFieldValue, S: BuildHasher + Default> FromFieldValue for HashMap<String, T, S> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        entries_of(value, "map")?
            .into_iter()
            .map(|(key, value)| Ok((key, T::from_field_value(value)?)))
            .collect()
    }
}

// =============================================================================
// Date/time implementations
// =============================================================================

impl Reflect for DateTime<Utc> {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::DateTime)
    }
}

impl ToFieldValue for DateTime<Utc> {
    fn to_field_value(&self) -> Result<FieldValue> {
        Ok(FieldValue::DateTime((*self).into()))
    }
}

impl FromFieldValue for DateTime<Utc> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::DateTime(value) => Ok(value.with_timezone(&Utc)),
            other => Err(unexpected_value("datetime", &other)),
        }
    }
}

impl Reflect for DateTime<FixedOffset> {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::DateTime)
    }
}

impl ToFieldValue for DateTime<FixedOffset> {
    fn to_field_value(&self) -> Result<FieldValue> {
        Ok(FieldValue::DateTime(*self))
    }
}

impl FromFieldValue for DateTime<FixedOffset> {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::DateTime(value) => Ok(value),
            other => Err(unexpected_value("datetime", &other)),
        }
    }
}

// =============================================================================
// Identifier implementations
// =============================================================================

impl Reflect for Uuid {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::Uuid)
    }
}

impl ToFieldValue for Uuid {
    fn to_field_value(&self) -> Result<FieldValue> {
        Ok(FieldValue::Uid(Uid::Uuid(*self)))
    }
}

impl FromFieldValue for Uuid {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Uid(Uid::Uuid(uuid)) => Ok(uuid),
            FieldValue::Uid(Uid::Ulid(ulid)) => Ok(Uuid::from_u128(u128::from(ulid))),
            other => Err(unexpected_value("uuid", &other)),
        }
    }
}

impl Reflect for Ulid {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::Ulid)
    }
}

impl ToFieldValue for Ulid {
    fn to_field_value(&self) -> Result<FieldValue> {
        Ok(FieldValue::Uid(Uid::Ulid(*self)))
    }
}

impl FromFieldValue for Ulid {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Uid(Uid::Ulid(ulid)) => Ok(ulid),
            FieldValue::Uid(Uid::Uuid(uuid)) => Ok(Ulid::from(uuid.as_u128())),
            other => Err(unexpected_value("ulid", &other)),
        }
    }
}

impl Reflect for Uid {
    fn declared_type() -> DeclaredType {
        DeclaredType::of(TypeRef::Uid)
    }
}

impl ToFieldValue for Uid {
    fn to_field_value(&self) -> Result<FieldValue> {
        Ok(FieldValue::Uid(*self))
    }
}

impl FromFieldValue for Uid {
    fn from_field_value(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Uid(uid) => Ok(uid),
            other => Err(unexpected_value("uid", &other)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
