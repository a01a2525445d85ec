//! Date/time values.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::date_format::DateFormat;
use crate::engine::Engine;
use crate::error::{Result, SerializerError};
use crate::handler::{describe_field, raw_text, Description, TypeHandler};
use crate::metadata::FieldMetadata;
use crate::reflect::TypeRef;
use crate::value::FieldValue;

/// Formats and parses dates with the field's format or the configured default.
///
/// A field's custom type is its format, e.g.
/// `#[serialize(type = r"Y-m-d\TH:i:s\Z")]`. Parsed dates are normalized to
/// UTC. Each distinct format string is compiled once and kept for reuse.
#[derive(Debug, Default)]
pub struct DateTimeHandler {
    formats: DashMap<String, Arc<DateFormat>>,
}

impl DateTimeHandler {
    pub const ID: &'static str = "date_time";

    pub fn new() -> Self {
        Self::default()
    }

    fn compiled(&self, source: &str) -> Arc<DateFormat> {
        if let Some(format) = self.formats.get(source) {
            return Arc::clone(format.value());
        }
        let format = Arc::new(DateFormat::new(source));
        self.formats
            .entry(source.to_owned())
            .or_insert(format)
            .value()
            .clone()
    }

    fn format<'a>(metadata: &'a FieldMetadata, engine: &'a Engine) -> &'a str {
        metadata
            .custom_type
            .as_deref()
            .filter(|format| TypeRef::builtin(format) != Some(TypeRef::DateTime))
            .unwrap_or(&engine.config().date_format)
    }
}

impl TypeHandler for DateTimeHandler {
    fn id(&self) -> &str {
        Self::ID
    }

    fn supports_serialize(&self, value: &FieldValue) -> bool {
        matches!(value, FieldValue::DateTime(_))
    }

    fn supports_deserialize(&self, _value: &Value, ty: &TypeRef) -> bool {
        *ty == TypeRef::DateTime
    }

    fn supports_describe(&self, _name: &str, metadata: &FieldMetadata) -> bool {
        metadata.runtime_type == TypeRef::DateTime
    }

    fn serialize(
        &self,
        value: &FieldValue,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Value> {
        match value {
            FieldValue::DateTime(date) => {
                Ok(Value::String(self.compiled(Self::format(metadata, engine)).format(date)))
            }
            other => Err(SerializerError::serializer(format!(
                "Unsupported value for DateTimeHandler::serialize: {}",
                other.type_label()
            ))),
        }
    }

    fn deserialize(
        &self,
        value: Value,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<FieldValue> {
        if value.is_null() {
            return Ok(FieldValue::Null);
        }
        let format = Self::format(metadata, engine);
        let raw = raw_text(&value);
        self.compiled(format)
            .parse_utc(&raw)
            .map(FieldValue::DateTime)
            .ok_or_else(|| {
                SerializerError::deserialization(format!(
                    "Unable to create DateTime from format \"{format}\" with value \"{raw}\"."
                ))
            })
    }

    fn describe(
        &self,
        name: &str,
        metadata: &FieldMetadata,
        engine: &Engine,
    ) -> Result<Description> {
        let mut description = describe_field(name, metadata);
        description.insert("type".into(), Value::from("string"));
        description.insert(
            "format".into(),
            Value::from(format!("date-time, format: \"{}\"", Self::format(metadata, engine))),
        );
        Ok(description)
    }
}
