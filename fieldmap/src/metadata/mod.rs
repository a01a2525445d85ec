//! Per-field mapping metadata.
//!
//! [`FieldMetadata`] is built once per class field by the
//! [`MetadataFactory`](factory::MetadataFactory) and cached by the
//! [`MetadataRegistry`](registry::MetadataRegistry). It is plain data, so it
//! can be stored in an external cache as JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::annotation::{OrderBy, Strategy};
use crate::reflect::TypeRef;

pub mod factory;
pub mod registry;

/// Metadata for every serializable field of a class, in declaration order.
pub type ClassMetadata = IndexMap<String, FieldMetadata>;

/// How one field is read, written and converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub runtime_type: TypeRef,
    pub is_nullable: bool,
    /// Getter method or property name.
    pub accessor: String,
    /// Source property; `None` for method-derived fields.
    pub property: Option<String>,
    /// Setter method or property name; `None` for read-only fields.
    pub mutator: Option<String>,
    pub custom_handler: Option<String>,
    /// Element or nested type, or a date format.
    pub custom_type: Option<String>,
    pub strategy: Option<Strategy>,
    pub persisted_name: Option<String>,
    pub discriminator_map: Option<IndexMap<String, String>>,
    pub order_by: Option<OrderBy>,
    /// `true` when access goes through getter/setter methods, `false` when
    /// the property hooks are used.
    pub uses_accessor_pair: bool,
}

impl FieldMetadata {
    /// Metadata for a non-nullable, read-only field read through `accessor`.
    pub fn new(runtime_type: TypeRef, accessor: impl Into<String>) -> Self {
        Self {
            runtime_type,
            is_nullable: false,
            accessor: accessor.into(),
            property: None,
            mutator: None,
            custom_handler: None,
            custom_type: None,
            strategy: None,
            persisted_name: None,
            discriminator_map: None,
            order_by: None,
            uses_accessor_pair: true,
        }
    }

    pub fn nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_mutator(mut self, mutator: impl Into<String>) -> Self {
        self.mutator = Some(mutator.into());
        self
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.custom_handler = Some(handler.into());
        self
    }

    pub fn with_custom_type(mut self, custom_type: impl Into<String>) -> Self {
        self.custom_type = Some(custom_type.into());
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_discriminator_map(mut self, map: IndexMap<String, String>) -> Self {
        self.discriminator_map = Some(map);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_accessor_pair(mut self, uses_accessor_pair: bool) -> Self {
        self.uses_accessor_pair = uses_accessor_pair;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.mutator.is_none()
    }

    pub fn is_keys_values(&self) -> bool {
        self.strategy == Some(Strategy::KeysValues)
    }
}
