//! Serializer configuration.
//!
//! # Example
//! ```rust
//! use fieldmap::{ParameterBag, SerializerConfig};
//!
//! let config = SerializerConfig::new()
//!     .with_date_format(r"Y-m-d\TH:i:s\Z")
//!     .with_parameter("tag_class", "app::Tag");
//! assert!(config.parameter_bag.has("tag_class"));
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default format for date/time fields without a custom format.
pub const DEFAULT_DATE_FORMAT: &str = r"Y-m-d\TH:i:s.u\Z";

/// Named scalar values referenced by `#[serialize(type_param = "...")]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterBag(HashMap<String, Value>);

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The parameter as a type name: strings verbatim, other scalars as JSON
    /// text.
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.0.get(name).map(|value| match value {
            Value::String(value) => value.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Configuration for a [`Serializer`](crate::Serializer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Format used by the date/time handler when a field declares none.
    pub date_format: String,
    /// Values for indirect type overrides.
    pub parameter_bag: ParameterBag,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            parameter_bag: ParameterBag::default(),
        }
    }
}

impl SerializerConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default date format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Replace the parameter bag.
    pub fn with_parameter_bag(mut self, bag: ParameterBag) -> Self {
        self.parameter_bag = bag;
        self
    }

    /// Add one parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameter_bag.insert(name, value);
        self
    }
}
