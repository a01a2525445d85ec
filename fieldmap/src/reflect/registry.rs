//! Type registry for collecting class and enum descriptors.

use std::collections::{BTreeSet, HashMap};

use crate::reflect::descriptor::{ClassDescriptor, EnumDescriptor};
use crate::reflect::types::TypeRef;
use crate::reflect::Reflect;

/// A registry of every class and enum the engine can map.
///
/// Registering a type also registers the types its serialized fields refer
/// to, so registering the root of an object graph is enough.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    classes: HashMap<String, ClassDescriptor>,
    enums: HashMap<String, EnumDescriptor>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type and its dependencies.
    pub fn register<T: Reflect + ?Sized>(&mut self) -> &mut Self {
        T::register_type(self);
        self
    }

    /// Register a class descriptor.
    ///
    /// Returns `false` if a class with the same name was already registered,
    /// in which case the existing descriptor is kept.
    pub fn register_class(&mut self, descriptor: ClassDescriptor) -> bool {
        if self.classes.contains_key(descriptor.name()) {
            return false;
        }
        let name = descriptor.name().to_owned();
        self.classes.insert(name, descriptor);
        true
    }

    /// Register an enum descriptor. Same semantics as [`Self::register_class`].
    pub fn register_enum(&mut self, descriptor: EnumDescriptor) -> bool {
        if self.enums.contains_key(descriptor.name()) {
            return false;
        }
        self.enums.insert(descriptor.name().to_owned(), descriptor);
        true
    }

    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(name)
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Resolve a proxy class name to the class it stands in for.
    pub fn real_class<'a>(&'a self, name: &'a str) -> &'a str {
        self.classes
            .get(name)
            .map(ClassDescriptor::real_class)
            .unwrap_or(name)
    }

    /// Get all registered classes.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    /// Get the number of registered classes and enums.
    pub fn len(&self) -> usize {
        self.classes.len() + self.enums.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.enums.is_empty()
    }

    /// Class and enum names referenced by registered descriptors but not
    /// registered themselves, sorted.
    pub fn missing_references(&self) -> Vec<String> {
        let mut missing = BTreeSet::new();

        for descriptor in self.classes.values() {
            if descriptor.is_proxy() && !self.classes.contains_key(descriptor.real_class()) {
                missing.insert(descriptor.real_class().to_owned());
            }

            let declared = descriptor
                .properties()
                .iter()
                .filter(|property| property.annotation.is_some())
                .map(|property| &property.declared)
                .chain(
                    descriptor
                        .methods()
                        .iter()
                        .filter(|method| method.annotation.is_some())
                        .map(|method| &method.returns),
                );

            for declared in declared {
                for ty in declared.members().iter().chain(declared.element()) {
                    if let Some(name) = self.unresolved(ty) {
                        missing.insert(name.to_owned());
                    }
                }
            }

            for property in descriptor.properties() {
                let targets = property
                    .annotation
                    .as_ref()
                    .and_then(|annotation| annotation.discriminator_map.as_ref());
                for class in targets.into_iter().flat_map(|map| map.values()) {
                    if !self.classes.contains_key(class) {
                        missing.insert(class.clone());
                    }
                }
            }
        }

        missing.into_iter().collect()
    }

    fn unresolved<'a>(&self, ty: &'a TypeRef) -> Option<&'a str> {
        match ty {
            TypeRef::Object(name) if !self.classes.contains_key(name) => Some(name),
            TypeRef::Enum(name) if !self.enums.contains_key(name) => Some(name),
            _ => None,
        }
    }
}
