//! Entity references serialized as their identifiers.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::annotation::OrderBy;
use crate::engine::Engine;
use crate::error::{Result, SerializerError};
use crate::handler::{class_base_name, describe_field, oa_friendly_type, Description, TypeHandler};
use crate::metadata::FieldMetadata;
use crate::reflect::{Object, TypeRef};
use crate::value::FieldValue;

/// Looks up entities by identifier.
///
/// This is the persistence boundary of [`EntityIdHandler`]: it never loads
/// anything itself.
pub trait EntityRepository: Send + Sync {
    /// The entity of class `class` with identifier `id`, if it exists.
    fn find(&self, class: &str, id: &Value) -> Result<Option<Box<dyn Object>>>;

    /// The identifiers among `ids` that exist, ordered by `order_by`.
    fn ordered_ids(&self, class: &str, ids: &[Value], order_by: &OrderBy) -> Result<Vec<Value>>;
}

/// Writes referenced entities as their `id` and loads them back through an
/// [`EntityRepository`].
///
/// Only used when named explicitly:
///
/// ```rust,ignore
/// #[serialize(handler = "entity_id")]
/// author: Option<User>,
/// #[serialize(handler = "entity_id", type = "app::Tag", order_by(position = "desc"))]
/// tags: Collection<Tag>,
/// ```
#[derive(Clone)]
pub struct EntityIdHandler {
    repository: Arc<dyn EntityRepository>,
}

impl fmt::Debug for EntityIdHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityIdHandler").finish_non_exhaustive()
    }
}

impl EntityIdHandler {
    pub const ID: &'static str = "entity_id";

    pub fn new(repository: Arc<dyn EntityRepository>) -> Self {
        Self { repository }
    }

    fn to_id(item: &FieldValue, engine: &Engine) -> Result<Value> {
        match item.as_object() {
            Some(object) => engine.read_field(object, "id")?.to_json(),
            None => item.to_json(),
        }
    }

    fn ids(items: &[FieldValue], engine: &Engine) -> Result<Vec<Value>> {
        items.iter().map(|item| Self::to_id(item, engine)).collect()
    }

    fn target_class(metadata: &FieldMetadata) -> Option<&str> {
        metadata
            .custom_type
            .as_deref()
            .or_else(|| metadata.runtime_type.class_name())
    }

    /// JSON schema type of the `id` of `class`.
    fn id_type(class: &str, engine: &Engine) -> String {
        let declared = engine.types().class(class).and_then(|descriptor| {
            let getter = descriptor.method("get_id").map(|m| m.returns.resolved());
            getter.or_else(|| descriptor.property("id").map(|p| p.declared.resolved()))
        });
        match declared {
            Some(ty) if ty.is_uid() => "string".to_owned(),
            Some(ty) => oa_friendly_type(ty.name()).to_owned(),
            None => oa_friendly_type(class).to_owned(),
        }
    }

    /// Class of the first object among `items`.
    fn item_class(items: &[FieldValue]) -> Option<String> {
        let object = items.iter().find_map(|item| item.as_object())?;
        Some(object.class_name().to_owned())
    }

    fn unsupported(operation: &str) -> SerializerError {
        SerializerError::serializer(format!("Unsupported value for EntityIdHandler::{operation}"))
    }
}

impl TypeHandler for EntityIdHandler {
    fn id(&self) -> &str {
        Self::ID
    }

    fn serialize(
        &self,
        value: &FieldValue,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Value> {
        let keyed = metadata.is_keys_values();
        let output = match value {
            FieldValue::Null => return Ok(Value::Null),
            FieldValue::Object(_) => return Self::to_id(value, engine),
            FieldValue::Map(entries) => {
                if keyed {
                    let mut map = Map::with_capacity(entries.len());
                    for (key, item) in entries {
                        map.insert(key.clone(), Self::to_id(item, engine)?);
                    }
                    return Ok(Value::Object(map));
                }
                entries
                    .values()
                    .map(|item| Self::to_id(item, engine))
                    .collect::<Result<Vec<_>>>()?
            }
            FieldValue::List(items) => Self::ids(items, engine)?,
            FieldValue::Collection(items) => {
                let ids = Self::ids(items, engine)?;
                let class = Self::target_class(metadata)
                    .map(str::to_owned)
                    .or_else(|| Self::item_class(items));
                match (&metadata.order_by, class) {
                    (Some(order_by), Some(class)) if !ids.is_empty() => {
                        self.repository.ordered_ids(&class, &ids, order_by)?
                    }
                    _ => ids,
                }
            }
            _ => return Err(Self::unsupported("serialize")),
        };

        if keyed && output.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        Ok(Value::Array(output))
    }

    fn deserialize(
        &self,
        value: Value,
        metadata: &FieldMetadata,
        _engine: &Engine,
    ) -> Result<FieldValue> {
        let class = Self::target_class(metadata);
        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Array(_) | Value::Object(_) => {
                let class = class.ok_or_else(|| Self::unsupported("deserialize"))?;
                let ids: Vec<Value> = match value {
                    Value::Array(ids) => ids,
                    Value::Object(ids) => ids.into_iter().map(|(_, id)| id).collect(),
                    _ => Vec::new(),
                };
                let mut entities = Vec::with_capacity(ids.len());
                for id in &ids {
                    if let Some(entity) = self.repository.find(class, id)? {
                        entities.push(FieldValue::Object(entity));
                    }
                }
                Ok(match metadata.runtime_type {
                    TypeRef::Collection => FieldValue::Collection(entities),
                    _ => FieldValue::List(entities),
                })
            }
            Value::Number(_) | Value::String(_) => {
                let class = class.ok_or_else(|| Self::unsupported("deserialize"))?;
                let entity = self.repository.find(class, &value)?;
                Ok(entity.map_or(FieldValue::Null, FieldValue::Object))
            }
            Value::Bool(_) => Err(Self::unsupported("deserialize")),
        }
    }

    fn describe(
        &self,
        name: &str,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Description> {
        let mut description = describe_field(name, metadata);
        let class = Self::target_class(metadata).unwrap_or_else(|| metadata.runtime_type.name());
        let base = class_base_name(class);

        if metadata.runtime_type.is_iterable() {
            let mut items = Map::new();
            items.insert("type".into(), Value::from(Self::id_type(class, engine)));
            description.insert("type".into(), Value::from("array"));
            description.insert("title".into(), Value::from(format!("{base} IDs")));
            description.insert("items".into(), Value::Object(items));
        } else {
            description.insert("type".into(), Value::from(Self::id_type(class, engine)));
            description.insert("title".into(), Value::from(format!("{base} ID")));
        }
        Ok(description)
    }
}
