//! Declarative field annotations.
//!
//! An [`Annotation`] is the data carried by a `#[serialize(...)]` attribute on
//! a field or accessor method. It is produced by the derive macro (or built by
//! hand for manual bindings) and consumed once by the metadata factory.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Item key that selects the concrete class of a polymorphic nested object.
pub const DISCRIMINATOR_COLUMN: &str = "discriminator";

/// How an iterable value is laid out in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Emit a JSON array of values.
    #[default]
    Default,
    /// Keep the keys and emit a JSON object; an empty value becomes `{}`.
    #[serde(rename = "kv")]
    KeysValues,
}

impl Strategy {
    /// Parse the attribute spelling (`"kv"`, `"keys_values"` or `"default"`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "kv" | "keys_values" | "keys-values" => Some(Self::KeysValues),
            "default" => Some(Self::Default),
            _ => None,
        }
    }
}

/// Sort direction of an order-by entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Ordered mapping of field name to sort direction.
pub type OrderBy = IndexMap<String, Direction>;

/// Type override declared on an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOverride {
    /// A literal type name (element class, scalar name or date format).
    Literal(String),
    /// A parameter bag key resolved when metadata is built.
    Param(String),
}

/// The `#[serialize(...)]` attribute payload.
///
/// # Example
///
/// ```rust
/// use fieldmap::{Annotation, Direction, Strategy};
///
/// let annotation = Annotation::new()
///     .with_name("tags")
///     .with_strategy(Strategy::KeysValues)
///     .with_order_by("position", Direction::Asc);
/// assert_eq!(annotation.serialized_name.as_deref(), Some("tags"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub serialized_name: Option<String>,
    pub handler: Option<String>,
    pub type_override: Option<TypeOverride>,
    pub strategy: Option<Strategy>,
    pub persisted_name: Option<String>,
    pub discriminator_map: Option<IndexMap<String, String>>,
    pub order_by: Option<OrderBy>,
}

impl Annotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the output field name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }

    /// Route the field through the handler with this id.
    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Declare a literal element type, nested class or date format.
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_override = Some(TypeOverride::Literal(type_name.into()));
        self
    }

    /// Declare the type through a parameter bag entry.
    pub fn with_type_param(mut self, param: impl Into<String>) -> Self {
        self.type_override = Some(TypeOverride::Param(param.into()));
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_persisted_name(mut self, name: impl Into<String>) -> Self {
        self.persisted_name = Some(name.into());
        self
    }

    /// Map a discriminator value to a class name.
    pub fn with_discriminator(mut self, tag: impl Into<String>, class: impl Into<String>) -> Self {
        self.discriminator_map
            .get_or_insert_with(IndexMap::new)
            .insert(tag.into(), class.into());
        self
    }

    /// Append an order-by entry.
    pub fn with_order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by
            .get_or_insert_with(IndexMap::new)
            .insert(field.into(), direction);
        self
    }
}
