//! Building [`ClassMetadata`] from class descriptors.

use convert_case::{Case, Casing};

use crate::annotation::{Annotation, TypeOverride};
use crate::config::ParameterBag;
use crate::error::{Result, SerializerError};
use crate::metadata::{ClassMetadata, FieldMetadata};
use crate::reflect::{
    ClassDescriptor, DeclaredType, MethodDescriptor, PropertyDescriptor, TypeRef,
};

/// Derives field metadata from a [`ClassDescriptor`].
///
/// The factory is a pure function of the descriptor and the parameter bag, so
/// building the same class twice yields equal metadata.
#[derive(Debug, Clone, Default)]
pub struct MetadataFactory {
    parameters: ParameterBag,
}

impl MetadataFactory {
    pub fn new(parameters: ParameterBag) -> Self {
        Self { parameters }
    }

    /// Build the metadata of every annotated property and public method.
    ///
    /// Properties come first, then methods, each in declaration order. A
    /// method whose output name matches a property replaces that entry in
    /// place.
    pub fn build_metadata(&self, class: &ClassDescriptor) -> Result<ClassMetadata> {
        if class.constructor().is_none() {
            return Err(SerializerError::configuration(format!(
                "Required constructor parameters found in {}",
                class.name()
            )));
        }

        let mut metadata = ClassMetadata::new();

        for property in class.properties() {
            let Some(annotation) = &property.annotation else {
                continue;
            };
            let name = annotation
                .serialized_name
                .clone()
                .unwrap_or_else(|| property.name.clone());
            metadata.insert(name, self.property_metadata(class, property, annotation)?);
        }

        for method in class.methods() {
            let Some(annotation) = &method.annotation else {
                continue;
            };
            if !method.is_public() || method.as_getter().is_none() {
                continue;
            }
            let name = annotation
                .serialized_name
                .clone()
                .unwrap_or_else(|| field_name_from_method(&method.name));
            metadata.insert(name, self.method_metadata(method, annotation)?);
        }

        tracing::debug!(
            class = class.name(),
            fields = metadata.len(),
            "built serializer metadata"
        );
        Ok(metadata)
    }

    fn property_metadata(
        &self,
        class: &ClassDescriptor,
        property: &PropertyDescriptor,
        annotation: &Annotation,
    ) -> Result<FieldMetadata> {
        let runtime_type = property.declared.resolved();

        let (accessor, mutator, uses_accessor_pair) = match property.hooks {
            Some(hooks) => (
                property.name.clone(),
                hooks.set.map(|_| property.name.clone()),
                false,
            ),
            None => {
                let prefix = if runtime_type == TypeRef::Bool {
                    "is"
                } else {
                    "get"
                };
                let getter = format!("{prefix}_{}", property.name);
                let getter_method = class.method(&getter).and_then(MethodDescriptor::as_getter);
                if getter_method.is_none() {
                    return Err(SerializerError::configuration(format!(
                        "Getter method {getter} not found in {}.",
                        class.name()
                    )));
                }
                let setter = format!("set_{}", property.name);
                let setter_method = class.method(&setter).and_then(MethodDescriptor::as_setter);
                if setter_method.is_none() {
                    return Err(SerializerError::configuration(format!(
                        "Setter method {setter} not found in {}.",
                        class.name()
                    )));
                }
                (getter, Some(setter), true)
            }
        };

        Ok(FieldMetadata {
            is_nullable: property.declared.allows_null(),
            accessor,
            property: Some(property.name.clone()),
            mutator,
            custom_handler: annotation.handler.clone(),
            custom_type: self.custom_type(annotation, &property.declared)?,
            strategy: annotation.strategy,
            persisted_name: annotation.persisted_name.clone(),
            discriminator_map: annotation.discriminator_map.clone(),
            order_by: annotation.order_by.clone(),
            uses_accessor_pair,
            runtime_type,
        })
    }

    fn method_metadata(
        &self,
        method: &MethodDescriptor,
        annotation: &Annotation,
    ) -> Result<FieldMetadata> {
        Ok(FieldMetadata {
            runtime_type: method.returns.resolved(),
            is_nullable: method.returns.allows_null(),
            accessor: method.name.clone(),
            property: None,
            mutator: None,
            custom_handler: annotation.handler.clone(),
            custom_type: self.custom_type(annotation, &method.returns)?,
            strategy: annotation.strategy,
            persisted_name: None,
            discriminator_map: None,
            order_by: annotation.order_by.clone(),
            uses_accessor_pair: true,
        })
    }

    /// The declared type override, resolved through the parameter bag when
    /// indirect, falling back to the element type of arrays/collections.
    fn custom_type(
        &self,
        annotation: &Annotation,
        declared: &DeclaredType,
    ) -> Result<Option<String>> {
        match &annotation.type_override {
            Some(TypeOverride::Literal(type_name)) => Ok(Some(type_name.clone())),
            Some(TypeOverride::Param(name)) => {
                let value = self.parameters.get_str(name).ok_or_else(|| {
                    SerializerError::configuration(format!(
                        "The parameter `{name}` not found in `fieldmap.parameter_bag` configuration."
                    ))
                })?;
                Ok(Some(value))
            }
            None => {
                let element = declared.element().filter(|ty| **ty != TypeRef::Mixed);
                Ok(element.map(|element| element.name().to_string()))
            }
        }
    }
}

/// Output field name for an accessor method without an explicit name.
///
/// A leading `get_`/`is_` (or camel-case `get`/`is`) is removed and the rest
/// converted to lower camel case: `get_full_name` → `fullName`,
/// `isActive` → `active`, `label` → `label`.
pub fn field_name_from_method(method: &str) -> String {
    strip_accessor_prefix(method).to_case(Case::Camel)
}

fn strip_accessor_prefix(method: &str) -> &str {
    for prefix in ["get_", "is_"] {
        if let Some(rest) = method.strip_prefix(prefix) {
            if !rest.is_empty() {
                return rest;
            }
        }
    }
    for prefix in ["get", "is"] {
        if let Some(rest) = method.strip_prefix(prefix) {
            if rest.starts_with(|c: char| c.is_ascii_uppercase()) {
                return rest;
            }
        }
    }
    method
}
