//! Reflection layer.
//!
//! Rust has no runtime reflection, so every mappable type describes itself
//! through the traits in this module. `#[derive(Serializable)]` implements
//! them; manual implementations are possible for types the derive cannot
//! handle.
//!
//! ## Traits
//!
//! | Trait | Level | Purpose |
//! |-------|-------|---------|
//! | [`Object`] | instance | dyn-safe access to a live value (class name, downcasting, cloning) |
//! | [`Reflect`] | type | declared type of a field and registration of dependencies |
//! | [`Serializable`] | type | class name and [`ClassDescriptor`] of a struct |
//! | [`SerializableEnum`] | type | enum name and [`EnumDescriptor`] |
//! | [`ToFieldValue`] / [`FromFieldValue`] | value | conversion to and from [`FieldValue`] |

use std::any::{type_name, Any};
use std::fmt;

use crate::error::{Result, SerializerError};
use crate::value::FieldValue;

pub mod descriptor;
mod impls;
pub mod registry;
pub mod types;

pub use descriptor::{
    ClassDescriptor, Constructor, EnumCase, EnumDescriptor, Getter, MethodDescriptor, MethodKind,
    PropertyDescriptor, PropertyHooks, Setter, Visibility,
};
pub use registry::TypeRegistry;
pub use types::{DeclaredType, TypeRef};

/// A live instance of a reflected class.
pub trait Object: Any + Send + Sync + fmt::Debug {
    /// Fully qualified class name, matching the registered descriptor.
    fn class_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn clone_object(&self) -> Box<dyn Object>;
}

impl Clone for Box<dyn Object> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}

/// Static type information used to build descriptors.
pub trait Reflect {
    /// The declared type of a field holding `Self`.
    fn declared_type() -> DeclaredType;

    /// Register `Self` and every type it depends on.
    fn register_type(_types: &mut TypeRegistry) {}
}

/// A struct bound to the reflection layer.
pub trait Serializable: Object + Reflect + Sized {
    /// Fully qualified class name.
    const CLASS: &'static str;

    fn descriptor() -> ClassDescriptor;
}

/// An enum bound to the reflection layer.
pub trait SerializableEnum: Reflect + Sized {
    const ENUM: &'static str;

    fn enum_descriptor() -> EnumDescriptor;
}

/// Accessor methods of a type, generated by `#[reflect_methods]`.
pub trait ReflectMethods {
    fn reflect_methods() -> Vec<MethodDescriptor>;

    /// Register the types returned by the reflected getters.
    fn register_method_types(_types: &mut TypeRegistry) {}
}

/// Conversion of a field's value into a [`FieldValue`].
///
/// Fails when the value has no exact [`FieldValue`] form, such as an
/// unsigned integer above `i64::MAX`.
pub trait ToFieldValue {
    fn to_field_value(&self) -> Result<FieldValue>;
}

/// Conversion of a [`FieldValue`] back into a field's value.
pub trait FromFieldValue: Sized {
    fn from_field_value(value: FieldValue) -> Result<Self>;
}

/// Downcast an object to its concrete type.
pub fn downcast_ref<T: Object>(object: &dyn Object) -> Result<&T> {
    object
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| mismatch::<T>(object.class_name()))
}

/// Downcast an object to its concrete type, mutably.
pub fn downcast_mut<T: Object>(object: &mut dyn Object) -> Result<&mut T> {
    if !object.as_any().is::<T>() {
        return Err(mismatch::<T>(object.class_name()));
    }
    object
        .as_any_mut()
        .downcast_mut::<T>()
        .ok_or_else(|| mismatch::<T>(type_name::<T>()))
}

/// Take ownership of a boxed object as its concrete type.
pub fn downcast_box<T: Object>(object: Box<dyn Object>) -> Result<T> {
    if !object.as_any().is::<T>() {
        return Err(mismatch::<T>(object.class_name()));
    }
    object
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| mismatch::<T>(type_name::<T>()))
}

fn mismatch<T>(found: &str) -> SerializerError {
    SerializerError::serializer(format!(
        "Expected an instance of {}, found {}",
        type_name::<T>(),
        found
    ))
}

/// Error for a [`FieldValue`] of the wrong shape.
pub fn unexpected_value(expected: &str, found: &FieldValue) -> SerializerError {
    SerializerError::serializer(format!("Expected {expected}, found {}", found.type_label()))
}
