//! Recursive conversion between objects and JSON.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::SerializerConfig;
use crate::error::{Result, SerializerError};
use crate::handler::HandlerResolver;
use crate::metadata::registry::MetadataRegistry;
use crate::metadata::{ClassMetadata, FieldMetadata};
use crate::reflect::{ClassDescriptor, Getter, Object, Setter, TypeRef, TypeRegistry};
use crate::value::FieldValue;

/// Walks objects field by field, dispatching every value to a type handler.
///
/// Handlers receive the engine so they can recurse into nested objects and
/// iterables.
#[derive(Debug)]
pub struct Engine {
    types: TypeRegistry,
    metadata: MetadataRegistry,
    handlers: HandlerResolver,
    config: SerializerConfig,
}

impl Engine {
    pub fn new(
        types: TypeRegistry,
        metadata: MetadataRegistry,
        handlers: HandlerResolver,
        config: SerializerConfig,
    ) -> Self {
        Self {
            types,
            metadata,
            handlers,
            config,
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    pub fn handlers(&self) -> &HandlerResolver {
        &self.handlers
    }

    pub fn metadata_registry(&self) -> &MetadataRegistry {
        &self.metadata
    }

    /// Field metadata of `class`.
    pub fn metadata(&self, class: &str) -> Result<Arc<ClassMetadata>> {
        self.metadata.get(&self.types, class)
    }

    /// Convert an object or iterable to JSON.
    ///
    /// Items of iterables pass through when scalar or null, recurse when they
    /// are objects or iterables and are dispatched to a handler otherwise.
    /// With the `kv` strategy maps keep their keys and an empty iterable
    /// becomes `{}`; without it only the values are kept.
    pub fn to_array(&self, value: &FieldValue, metadata: Option<&FieldMetadata>) -> Result<Value> {
        let keyed = metadata.is_some_and(FieldMetadata::is_keys_values);
        match value {
            FieldValue::Object(object) => self.object_to_array(object.as_ref()),
            FieldValue::List(items) | FieldValue::Collection(items) => {
                if keyed && items.is_empty() {
                    return Ok(Value::Object(Map::new()));
                }
                items
                    .iter()
                    .map(|item| self.item_to_array(item, metadata))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            FieldValue::Map(entries) if keyed => {
                let mut output = Map::with_capacity(entries.len());
                for (key, item) in entries {
                    output.insert(key.clone(), self.item_to_array(item, metadata)?);
                }
                Ok(Value::Object(output))
            }
            FieldValue::Map(entries) => entries
                .values()
                .map(|item| self.item_to_array(item, metadata))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => self.item_to_array(other, metadata),
        }
    }

    fn item_to_array(&self, item: &FieldValue, metadata: Option<&FieldMetadata>) -> Result<Value> {
        match item {
            FieldValue::Null => Ok(Value::Null),
            _ if item.is_scalar() => item.to_json(),
            FieldValue::Object(_)
            | FieldValue::List(_)
            | FieldValue::Map(_)
            | FieldValue::Collection(_) => self.to_array(item, metadata),
            other => {
                let fallback;
                let metadata = match metadata {
                    Some(metadata) => metadata,
                    None => {
                        fallback = FieldMetadata::new(TypeRef::Mixed, "").nullable(true);
                        &fallback
                    }
                };
                self.handlers
                    .resolve_for_serialize(other, None)?
                    .serialize(other, metadata, self)
            }
        }
    }

    /// Convert one object to a JSON object keyed by field name.
    pub fn object_to_array(&self, object: &dyn Object) -> Result<Value> {
        let metadata = self.metadata(object.class_name())?;
        let mut output = Map::with_capacity(metadata.len());
        for (name, field) in metadata.iter() {
            let value = self.read(object, field)?;
            let handler = self
                .handlers
                .resolve_for_serialize(&value, field.custom_handler.as_deref())?;
            output.insert(name.clone(), handler.serialize(&value, field, self)?);
        }
        Ok(Value::Object(output))
    }

    /// Build an instance of `class` from a JSON object.
    ///
    /// Fields without a mutator or missing from `data` are left at their
    /// defaults, as are non-nullable fields whose handler returned null. An
    /// empty JSON array counts as an empty object.
    pub fn from_array(&self, data: Value, class: &str) -> Result<Box<dyn Object>> {
        let mut entries = match data {
            Value::Object(entries) => entries,
            Value::Array(items) if items.is_empty() => Map::new(),
            _ => {
                return Err(SerializerError::serializer(format!("Unsupported value for {class}")))
            }
        };

        let metadata = self.metadata(class)?;
        let constructor = self
            .descriptors(class)
            .find_map(ClassDescriptor::constructor)
            .ok_or_else(|| {
                SerializerError::configuration(format!(
                    "Required constructor parameters found in {class}"
                ))
            })?;
        let mut object = constructor();

        for (name, field) in metadata.iter() {
            if field.mutator.is_none() {
                continue;
            }
            let Some(data) = entries.remove(name) else {
                continue;
            };

            let handler = self.handlers.resolve_for_deserialize(
                &data,
                &field.runtime_type,
                field.custom_handler.as_deref(),
            )?;
            let value = handler.deserialize(data, field, self)?;
            if value.is_null() && !field.is_nullable {
                continue;
            }

            self.write(object.as_mut(), field, value).map_err(|e| {
                let message = format!("Unable to deserialize \"{name}\". Check type.");
                SerializerError::serializer(message).with_source(e)
            })?;
        }

        Ok(object)
    }

    /// Convert JSON data to the type named `type_name`.
    ///
    /// Registered classes are built with [`Self::from_array`]; enums, dates,
    /// identifiers and basic types go through their handler. Untyped, array
    /// and collection data is converted as plain data.
    pub fn from_value(&self, data: Value, type_name: Option<&str>) -> Result<FieldValue> {
        let Some(type_name) = type_name else {
            return Ok(FieldValue::from_json(data));
        };

        let ty = if self.types.enum_type(type_name).is_some() {
            TypeRef::Enum(type_name.to_owned())
        } else {
            match TypeRef::builtin(type_name) {
                Some(ty) => ty,
                None if data.is_null() => return Ok(FieldValue::Null),
                None => return self.from_array(data, type_name).map(FieldValue::Object),
            }
        };

        match ty {
            TypeRef::Mixed
            | TypeRef::Array
            | TypeRef::Collection
            | TypeRef::Null
            | TypeRef::Object(_) => Ok(FieldValue::from_json(data)),
            ty => {
                let metadata = FieldMetadata::new(ty.clone(), "").nullable(true);
                self.handlers
                    .resolve_for_deserialize(&data, &ty, None)?
                    .deserialize(data, &metadata, self)
            }
        }
    }

    /// Read the field `name` of an object by property hook or getter
    /// (`get_{name}`, `is_{name}` or `{name}`).
    pub fn read_field(&self, object: &dyn Object, name: &str) -> Result<FieldValue> {
        let class = object.class_name();
        let getter = self
            .descriptors(class)
            .find_map(|descriptor| property_getter(descriptor, name))
            .or_else(|| {
                [format!("get_{name}"), format!("is_{name}"), name.to_owned()]
                    .iter()
                    .find_map(|method| {
                        self.descriptors(class)
                            .find_map(|descriptor| method_getter(descriptor, method))
                    })
            })
            .ok_or_else(|| unreadable(name, class))?;
        getter(object)
    }

    fn read(&self, object: &dyn Object, field: &FieldMetadata) -> Result<FieldValue> {
        let class = object.class_name();
        let getter = self
            .descriptors(class)
            .find_map(|descriptor| {
                if field.uses_accessor_pair {
                    method_getter(descriptor, &field.accessor)
                } else {
                    property_getter(descriptor, &field.accessor)
                }
            })
            .ok_or_else(|| unreadable(&field.accessor, class))?;
        getter(object)
    }

    fn write(
        &self,
        object: &mut dyn Object,
        field: &FieldMetadata,
        value: FieldValue,
    ) -> Result<()> {
        let class = object.class_name().to_owned();
        let mutator = field.mutator.as_deref().unwrap_or_default();
        let setter: Option<Setter> = self.descriptors(&class).find_map(|descriptor| {
            if field.uses_accessor_pair {
                descriptor.method(mutator)?.as_setter()
            } else {
                descriptor.property(mutator)?.hooks?.set
            }
        });
        let setter = setter.ok_or_else(|| {
            SerializerError::serializer(format!("Unable to write \"{mutator}\" of {class}."))
        })?;
        setter(object, value)
    }

    /// The descriptor of `class`, then the real class descriptor for proxies.
    fn descriptors<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a ClassDescriptor> + 'a {
        let own = self.types.class(class);
        let real = own
            .filter(|descriptor| descriptor.is_proxy())
            .and_then(|descriptor| self.types.class(descriptor.real_class()));
        own.into_iter().chain(real)
    }
}

fn property_getter(descriptor: &ClassDescriptor, name: &str) -> Option<Getter> {
    descriptor.property(name)?.hooks?.get
}

fn method_getter(descriptor: &ClassDescriptor, name: &str) -> Option<Getter> {
    descriptor.method(name)?.as_getter()
}

fn unreadable(name: &str, class: &str) -> SerializerError {
    SerializerError::serializer(format!("Unable to read \"{name}\" of {class}."))
}
