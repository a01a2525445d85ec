//! Class, property, method and enum descriptors.
//!
//! Descriptors are the reflected shape of a type. They are generated by
//! `#[derive(Serializable)]` and can also be assembled by hand with the
//! `with_*` builders:
//!
//! ```rust,ignore
//! let descriptor = ClassDescriptor::new("app::Tag")
//!     .with_constructor(|| Box::new(Tag::default()))
//!     .with_property(
//!         PropertyDescriptor::new("label", DeclaredType::of(TypeRef::String))
//!             .with_annotation(Annotation::new())
//!             .with_get_hook(|object| downcast_ref::<Tag>(object)?.label.to_field_value())
//!             .with_set_hook(|object, value| {
//!                 downcast_mut::<Tag>(object)?.label = String::from_field_value(value)?;
//!                 Ok(())
//!             }),
//!     );
//! ```

use std::fmt;

use crate::annotation::Annotation;
use crate::error::Result;
use crate::reflect::types::DeclaredType;
use crate::reflect::Object;
use crate::value::{EnumBacking, FieldValue};

/// Reads a value from an object.
pub type Getter = fn(&dyn Object) -> Result<FieldValue>;

/// Writes a value into an object.
pub type Setter = fn(&mut dyn Object, FieldValue) -> Result<()>;

/// Allocates a default instance.
pub type Constructor = fn() -> Box<dyn Object>;

/// Direct get/set functions attached to a property.
#[derive(Clone, Copy, Default)]
pub struct PropertyHooks {
    pub get: Option<Getter>,
    pub set: Option<Setter>,
}

impl fmt::Debug for PropertyHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyHooks")
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .finish()
    }
}

/// A declared field.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub declared: DeclaredType,
    pub annotation: Option<Annotation>,
    pub hooks: Option<PropertyHooks>,
    pub description: Option<String>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared,
            annotation: None,
            hooks: None,
            description: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_get_hook(mut self, get: Getter) -> Self {
        self.hooks.get_or_insert_with(PropertyHooks::default).get = Some(get);
        self
    }

    pub fn with_set_hook(mut self, set: Setter) -> Self {
        self.hooks.get_or_insert_with(PropertyHooks::default).set = Some(set);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// What calling a method does.
#[derive(Clone, Copy)]
pub enum MethodKind {
    Getter(Getter),
    Setter(Setter),
}

impl fmt::Debug for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Getter(_) => f.write_str("Getter"),
            Self::Setter(_) => f.write_str("Setter"),
        }
    }
}

/// A declared method.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub visibility: Visibility,
    /// Return type for getters, parameter type for setters.
    pub returns: DeclaredType,
    pub annotation: Option<Annotation>,
    pub description: Option<String>,
    pub kind: MethodKind,
}

impl MethodDescriptor {
    /// A public, argument-free method returning a value.
    pub fn getter(name: impl Into<String>, returns: DeclaredType, get: Getter) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            returns,
            annotation: None,
            description: None,
            kind: MethodKind::Getter(get),
        }
    }

    /// A public method taking one value.
    pub fn setter(name: impl Into<String>, accepts: DeclaredType, set: Setter) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            returns: accepts,
            annotation: None,
            description: None,
            kind: MethodKind::Setter(set),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn as_getter(&self) -> Option<Getter> {
        match self.kind {
            MethodKind::Getter(get) => Some(get),
            MethodKind::Setter(_) => None,
        }
    }

    pub fn as_setter(&self) -> Option<Setter> {
        match self.kind {
            MethodKind::Setter(set) => Some(set),
            MethodKind::Getter(_) => None,
        }
    }
}

/// The reflected shape of a class.
#[derive(Clone)]
pub struct ClassDescriptor {
    name: String,
    real_class: Option<String>,
    constructor: Option<Constructor>,
    properties: Vec<PropertyDescriptor>,
    methods: Vec<MethodDescriptor>,
    description: Option<String>,
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("real_class", &self.real_class)
            .field("constructible", &self.constructor.is_some())
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .finish()
    }
}

impl ClassDescriptor {
    /// A class without an argument-free constructor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            real_class: None,
            constructor: None,
            properties: Vec::new(),
            methods: Vec::new(),
            description: None,
        }
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Mark this class as a stand-in for `real_class`. Metadata lookups for
    /// the proxy resolve to the real class.
    pub fn proxy_for(mut self, real_class: impl Into<String>) -> Self {
        self.real_class = Some(real_class.into());
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = MethodDescriptor>) -> Self {
        self.methods.extend(methods);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The real class name: the proxied class for proxies, else this class.
    pub fn real_class(&self) -> &str {
        self.real_class.as_deref().unwrap_or(&self.name)
    }

    pub fn is_proxy(&self) -> bool {
        self.real_class.is_some()
    }

    pub fn constructor(&self) -> Option<Constructor> {
        self.constructor
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.method(name).is_some()
    }
}

/// One case of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumCase {
    pub name: String,
    pub backing: Option<EnumBacking>,
}

/// The reflected shape of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    name: String,
    cases: Vec<EnumCase>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub fn with_case(mut self, name: impl Into<String>) -> Self {
        self.cases.push(EnumCase {
            name: name.into(),
            backing: None,
        });
        self
    }

    pub fn with_backed_case(
        mut self,
        name: impl Into<String>,
        backing: impl Into<EnumBacking>,
    ) -> Self {
        self.cases.push(EnumCase {
            name: name.into(),
            backing: Some(backing.into()),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cases(&self) -> &[EnumCase] {
        &self.cases
    }

    /// Every case carries a scalar value.
    pub fn is_backed(&self) -> bool {
        !self.cases.is_empty() && self.cases.iter().all(|case| case.backing.is_some())
    }

    pub fn case_by_name(&self, name: &str) -> Option<&EnumCase> {
        self.cases.iter().find(|case| case.name == name)
    }

    pub fn case_by_backing(&self, backing: &EnumBacking) -> Option<&EnumCase> {
        self.cases
            .iter()
            .find(|case| case.backing.as_ref() == Some(backing))
    }
}
