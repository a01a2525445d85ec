//! API schema descriptions derived from serializer metadata.
//!
//! Every field is described by the handler that would serialize it. Handlers
//! mark nested classes with a [`NESTED_OBJECT`] key, either on the field
//! itself or inside its `items`; [`ModelDescriber::schema`] expands those
//! markers into nested object schemas.

use serde_json::{Map, Value};

use crate::engine::Engine;
use crate::error::Result;
use crate::handler::{class_base_name, Description};
use crate::metadata::FieldMetadata;

/// Marker key naming the class of a nested object.
pub const NESTED_OBJECT: &str = "nested_object";

/// Receives field descriptions in field order.
pub trait DescriptionSink {
    fn add_property(&mut self, name: &str, description: Description);
}

impl DescriptionSink for Map<String, Value> {
    fn add_property(&mut self, name: &str, description: Description) {
        self.insert(name.to_owned(), Value::Object(description));
    }
}

impl DescriptionSink for Vec<Description> {
    fn add_property(&mut self, _name: &str, description: Description) {
        self.push(description);
    }
}

/// Describes classes through the handler chain of an [`Engine`].
#[derive(Debug, Clone, Copy)]
pub struct ModelDescriber<'a> {
    engine: &'a Engine,
}

impl<'a> ModelDescriber<'a> {
    pub fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Whether `class` is registered and has at least one serialized field.
    pub fn supports(&self, class: &str) -> bool {
        self.engine.types().contains_class(class)
            && self
                .engine
                .metadata(class)
                .is_ok_and(|metadata| !metadata.is_empty())
    }

    /// Feed the description of every field of `class` to `sink`.
    ///
    /// Nested object markers are passed through unexpanded.
    pub fn describe(&self, class: &str, sink: &mut dyn DescriptionSink) -> Result<()> {
        let metadata = self.engine.metadata(class)?;
        for (name, field) in metadata.iter() {
            sink.add_property(name, self.describe_field(class, name, field)?);
        }
        Ok(())
    }

    /// A JSON schema object for `class` with nested classes expanded.
    pub fn schema(&self, class: &str) -> Result<Value> {
        let mut schema = Map::new();
        schema.insert("type".into(), Value::from("object"));
        schema.insert("title".into(), Value::from(class_base_name(class)));
        if let Some(description) = self
            .engine
            .types()
            .class(class)
            .and_then(|descriptor| descriptor.description())
        {
            schema.insert("description".into(), Value::from(description));
        }
        let mut expanding = vec![class.to_owned()];
        schema.insert(
            "properties".into(),
            Value::Object(self.properties(class, &mut expanding)?),
        );
        Ok(Value::Object(schema))
    }

    fn describe_field(
        &self,
        class: &str,
        name: &str,
        field: &FieldMetadata,
    ) -> Result<Description> {
        let mut description = self
            .engine
            .handlers()
            .resolve_for_describe(name, field)?
            .describe(name, field, self.engine)?;
        if let Some(text) = self.doc_description(class, field) {
            description.insert("description".into(), Value::from(text));
        }
        Ok(description)
    }

    /// Doc comment of the source property; read-only fields prefer the doc
    /// comment of their getter.
    fn doc_description(&self, class: &str, field: &FieldMetadata) -> Option<String> {
        let types = self.engine.types();
        let descriptor = types.class(types.real_class(class))?;
        let from_method = field
            .is_read_only()
            .then(|| descriptor.method(&field.accessor))
            .flatten()
            .and_then(|method| method.description.clone());
        from_method.or_else(|| {
            field
                .property
                .as_deref()
                .and_then(|property| descriptor.property(property))
                .and_then(|property| property.description.clone())
        })
    }

    fn properties(&self, class: &str, expanding: &mut Vec<String>) -> Result<Map<String, Value>> {
        let metadata = self.engine.metadata(class)?;
        let mut properties = Map::with_capacity(metadata.len());

        for (name, field) in metadata.iter() {
            let mut description = self.describe_field(class, name, field)?;

            let nested = description
                .get(NESTED_OBJECT)
                .and_then(Value::as_str)
                .filter(|nested| self.supports(nested))
                .map(str::to_owned);
            if let Some(nested) = nested {
                let mut schema = self.nested(&nested, expanding)?;
                let mut property = Map::new();
                property.insert("property".into(), Value::from(name.as_str()));
                property.append(&mut schema);
                properties.insert(name.clone(), Value::Object(property));
                continue;
            }

            let item_class = description
                .get("items")
                .and_then(|items| items.get(NESTED_OBJECT))
                .and_then(Value::as_str)
                .map(str::to_owned);
            if let Some(item_class) = item_class {
                let items = if self.supports(&item_class) {
                    self.nested(&item_class, expanding)?
                } else {
                    let mut items = Map::new();
                    items.insert("title".into(), Value::from(class_base_name(&item_class)));
                    items
                };
                description.insert("items".into(), Value::Object(items));
            }

            properties.insert(name.clone(), Value::Object(description));
        }

        Ok(properties)
    }

    /// `{title, type: object, properties}`, or `{title, type: object}` for a
    /// class that is already being expanded.
    fn nested(&self, class: &str, expanding: &mut Vec<String>) -> Result<Map<String, Value>> {
        let mut schema = Map::new();
        schema.insert("title".into(), Value::from(class_base_name(class)));
        schema.insert("type".into(), Value::from("object"));
        if expanding.iter().any(|open| open == class) {
            return Ok(schema);
        }

        expanding.push(class.to_owned());
        let properties = self.properties(class, expanding);
        expanding.pop();
        schema.insert("properties".into(), Value::Object(properties?));
        Ok(schema)
    }
}
