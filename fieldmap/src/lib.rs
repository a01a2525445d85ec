//! # fieldmap
//!
//! Attribute-driven mapping between Rust objects and JSON.
//!
//! Types opt in with `#[derive(Serializable)]`; every field marked with
//! `#[serialize]` becomes part of the class metadata. A [`Serializer`] reads
//! that metadata and converts each field through a prioritized chain of
//! [`TypeHandler`](handler::TypeHandler)s.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chrono::{DateTime, Utc};
//! use fieldmap::{Serializable, Serializer};
//!
//! #[derive(Debug, Clone, Default, Serializable)]
//! #[fieldmap(class = "app::Article")]
//! struct Article {
//!     #[serialize]
//!     id: i64,
//!     #[serialize]
//!     name: String,
//!     #[serialize(name = "createdAt", type = "Y-m-d\\TH:i:s\\Z")]
//!     created_at: Option<DateTime<Utc>>,
//! }
//!
//! let serializer = Serializer::builder().register::<Article>().build();
//! let json = serializer.serialize(&article)?;
//! let article: Article = serializer.deserialize(&json)?;
//! ```
//!
//! ## Field Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[serialize]` | Include the field |
//! | `#[serialize(name = "x")]` | Output key |
//! | `#[serialize(handler = "entity_id")]` | Force a handler by id |
//! | `#[serialize(type = "app::Tag")]` | Element class, nested class or date format |
//! | `#[serialize(type_param = "key")]` | Like `type`, looked up in the parameter bag |
//! | `#[serialize(strategy = "kv")]` | Keep keys of iterables |
//! | `#[serialize(persisted_name = "x")]` | Storage column name |
//! | `#[serialize(discriminator_map(tag = "app::Class"))]` | Pick element classes by `discriminator` |
//! | `#[serialize(order_by(field = "desc"))]` | Order collections before output |
//!
//! ## Container Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `#[fieldmap(class = "app::Name")]` | Class name, defaults to the module path |
//! | `#[fieldmap(accessors)]` | Read and write through `get_x`/`set_x` methods |
//! | `#[fieldmap(methods)]` | Include `#[reflect_methods]` accessors |
//! | `#[fieldmap(no_default)]` | No constructor; the class can only be serialized |
//! | `#[fieldmap(value = "x")]` | Backing value of an enum variant |
//!
//! ## Handlers
//!
//! | Handler | Values |
//! |---------|--------|
//! | `basic` | `int`, `float`, `string`, `bool` |
//! | `date_time` | `DateTime<Utc>`, `DateTime<FixedOffset>` |
//! | `enum` | derived enums, by case name or backing value |
//! | `uuid` / `uid` | `Uuid`, `Ulid`, [`Uid`] |
//! | `object` | nested objects, arrays and [`Collection`]s |
//! | `array_string` | comma separated strings, explicit only |
//! | `entity_id` | objects by id through an [`EntityRepository`], explicit only |

// Lets the derive output refer to `::fieldmap` inside this crate's own tests.
extern crate self as fieldmap;

pub mod annotation;
pub mod cache;
pub mod config;
pub mod date_format;
pub mod describe;
pub mod engine;
pub mod error;
pub mod handler;
pub mod metadata;
pub mod reflect;
pub mod serializer;
pub mod value;

pub use annotation::{Annotation, Direction, OrderBy, Strategy, TypeOverride};
pub use cache::{LruMetadataCache, MetadataCache, NoopMetadataCache};
pub use config::{ParameterBag, SerializerConfig, DEFAULT_DATE_FORMAT};
pub use describe::{DescriptionSink, ModelDescriber};
pub use engine::Engine;
pub use error::{ErrorKind, Result, SerializerError};
pub use handler::{EntityRepository, TypeHandler};
pub use metadata::{ClassMetadata, FieldMetadata};
pub use reflect::{
    ClassDescriptor, DeclaredType, EnumDescriptor, FromFieldValue, MethodDescriptor, Object,
    PropertyDescriptor, Reflect, ReflectMethods, SerializableEnum, ToFieldValue, TypeRef,
    TypeRegistry,
};
pub use serializer::{KeyedCollection, Serializer, SerializerBuilder};
pub use value::{Collection, EnumBacking, EnumValue, FieldValue, Uid};

// Trait and derive macro share a name.
pub use reflect::Serializable;

#[cfg(feature = "derive")]
pub use fieldmap_macros::{reflect_methods, Serializable};

