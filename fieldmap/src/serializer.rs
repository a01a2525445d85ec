//! The public façade.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::cache::{MetadataCache, NoopMetadataCache};
use crate::config::SerializerConfig;
use crate::describe::{DescriptionSink, ModelDescriber};
use crate::engine::Engine;
use crate::error::{Result, SerializerError};
use crate::handler::{
    ArrayStringHandler, BasicHandler, DateTimeHandler, EntityIdHandler, EntityRepository,
    EnumHandler, HandlerResolver, ObjectHandler, TypeHandler, UidHandler, UuidHandler,
};
use crate::metadata::factory::MetadataFactory;
use crate::metadata::registry::MetadataRegistry;
use crate::reflect::{
    downcast_box, ClassDescriptor, EnumDescriptor, Object, Reflect, Serializable, TypeRegistry,
};
use crate::value::Collection;

/// Converts registered objects to and from JSON.
///
/// A `Serializer` is immutable once built and can be shared between threads.
///
/// ```rust,ignore
/// let serializer = Serializer::builder().register::<Example>().build();
///
/// let json = serializer.serialize(&example)?;
/// let back: Example = serializer.deserialize(&json)?;
/// ```
#[derive(Debug)]
pub struct Serializer {
    engine: Engine,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Serializer {
    pub fn builder() -> SerializerBuilder {
        SerializerBuilder::default()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn config(&self) -> &SerializerConfig {
        self.engine.config()
    }

    /// Serialize an object to a JSON string.
    pub fn serialize(&self, object: &dyn Object) -> Result<String> {
        encode(&self.to_array(object)?)
    }

    /// Serialize a sequence of objects to a JSON array string.
    pub fn serialize_iter<'a, I>(&self, objects: I) -> Result<String>
    where
        I: IntoIterator<Item = &'a dyn Object>,
    {
        encode(&self.to_array_iter(objects)?)
    }

    /// Convert an object to a JSON value.
    pub fn to_array(&self, object: &dyn Object) -> Result<Value> {
        self.engine.object_to_array(object)
    }

    /// Convert a sequence of objects to a JSON array.
    pub fn to_array_iter<'a, I>(&self, objects: I) -> Result<Value>
    where
        I: IntoIterator<Item = &'a dyn Object>,
    {
        objects
            .into_iter()
            .map(|object| self.engine.object_to_array(object))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    /// Deserialize a JSON string into a new `T`.
    pub fn deserialize<T: Serializable>(&self, json: &str) -> Result<T> {
        self.from_array(decode(json)?)
    }

    /// Deserialize a JSON array or object into `existing`, one `T` per entry.
    pub fn deserialize_iterable<T, C>(&self, json: &str, existing: C) -> Result<C>
    where
        T: Serializable,
        C: KeyedCollection<T>,
    {
        self.from_array_into(decode(json)?, existing)
    }

    /// Build a new `T` from a JSON value.
    pub fn from_array<T: Serializable>(&self, data: Value) -> Result<T> {
        downcast_box(self.engine.from_array(data, T::CLASS)?)
    }

    /// Fill `existing` from a JSON array or object, one `T` per entry.
    ///
    /// Array entries are keyed by index, object entries by key; existing
    /// entries with the same key are replaced.
    pub fn from_array_into<T, C>(&self, data: Value, mut existing: C) -> Result<C>
    where
        T: Serializable,
        C: KeyedCollection<T>,
    {
        let entries: Vec<(String, Value)> = match data {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            Value::Object(entries) => entries.into_iter().collect(),
            _ => {
                return Err(SerializerError::serializer(format!(
                    "Unsupported iterable for {}",
                    T::CLASS
                )))
            }
        };

        for (key, item) in entries {
            existing.set_entry(key, self.from_array(item)?);
        }
        Ok(existing)
    }

    /// Feed the field descriptions of `class` to `sink`.
    pub fn describe(&self, class: &str, sink: &mut dyn DescriptionSink) -> Result<()> {
        ModelDescriber::new(&self.engine).describe(class, sink)
    }

    /// A JSON schema object describing `class`.
    pub fn schema(&self, class: &str) -> Result<Value> {
        ModelDescriber::new(&self.engine).schema(class)
    }
}

fn encode(value: &Value) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| SerializerError::serializer("Cannot encode json data.").with_source(e))
}

fn decode(json: &str) -> Result<Value> {
    serde_json::from_str(json).map_err(|e| {
        SerializerError::deserialization("Cannot decode JSON string provided.").with_source(e)
    })
}

/// A container [`Serializer::from_array_into`] can fill by key.
pub trait KeyedCollection<T> {
    /// Store `item` under `key`, replacing any previous entry.
    fn set_entry(&mut self, key: String, item: T);
}

impl<T> KeyedCollection<T> for Vec<T> {
    fn set_entry(&mut self, key: String, item: T) {
        match key.parse::<usize>() {
            Ok(index) if index < self.len() => self[index] = item,
            _ => self.push(item),
        }
    }
}

impl<T> KeyedCollection<T> for IndexMap<String, T> {
    fn set_entry(&mut self, key: String, item: T) {
        self.insert(key, item);
    }
}

impl<T> KeyedCollection<T> for Collection<T> {
    fn set_entry(&mut self, key: String, item: T) {
        match key.parse::<usize>() {
            Ok(index) if index < self.len() => {
                self.set(index, item);
            }
            _ => self.push(item),
        }
    }
}

/// Builder for [`Serializer`].
///
/// Built-in handlers are always registered; an [`EntityIdHandler`] is added
/// when a repository is supplied.
#[derive(Default)]
pub struct SerializerBuilder {
    config: SerializerConfig,
    types: TypeRegistry,
    cache: Option<Arc<dyn MetadataCache>>,
    repository: Option<Arc<dyn EntityRepository>>,
    handlers: Vec<Arc<dyn TypeHandler>>,
}

impl fmt::Debug for SerializerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerBuilder")
            .field("config", &self.config)
            .field("types", &self.types.len())
            .field("cache", &self.cache.is_some())
            .field("repository", &self.repository.is_some())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl SerializerBuilder {
    pub fn with_config(mut self, config: SerializerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the type registry.
    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Register `T` and every type it refers to.
    pub fn register<T: Reflect>(mut self) -> Self {
        self.types.register::<T>();
        self
    }

    pub fn register_class(mut self, descriptor: ClassDescriptor) -> Self {
        self.types.register_class(descriptor);
        self
    }

    pub fn register_enum(mut self, descriptor: EnumDescriptor) -> Self {
        self.types.register_enum(descriptor);
        self
    }

    /// External store for built metadata.
    pub fn with_metadata_cache(mut self, cache: Arc<dyn MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enable the `entity_id` handler.
    pub fn with_entity_repository(mut self, repository: Arc<dyn EntityRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Add a handler after the built-in ones.
    pub fn with_handler(mut self, handler: Arc<dyn TypeHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> Serializer {
        let mut handlers: Vec<Arc<dyn TypeHandler>> = vec![
            Arc::new(BasicHandler),
            Arc::new(DateTimeHandler::new()),
            Arc::new(EnumHandler),
            Arc::new(UuidHandler),
            Arc::new(UidHandler),
            Arc::new(ObjectHandler),
            Arc::new(ArrayStringHandler),
        ];
        if let Some(repository) = self.repository {
            handlers.push(Arc::new(EntityIdHandler::new(repository)));
        }
        handlers.extend(self.handlers);
        let handlers = HandlerResolver::new(handlers);

        let missing = self.types.missing_references();
        if !missing.is_empty() {
            tracing::debug!(?missing, "types referenced but not registered");
        }

        let factory = MetadataFactory::new(self.config.parameter_bag.clone());
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(NoopMetadataCache) as Arc<dyn MetadataCache>);
        let metadata = MetadataRegistry::new(factory, cache);

        tracing::debug!(
            handlers = handlers.len(),
            types = self.types.len(),
            "serializer built"
        );

        Serializer {
            engine: Engine::new(self.types, metadata, handlers, self.config),
        }
    }
}
