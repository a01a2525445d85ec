//! Intermediate Representation (IR) module.
//!
//! The parsers turn `syn` input into these structures; the code generators
//! turn them into reflection impls. Attribute spellings are fully validated
//! by the time a value reaches the IR.

pub mod annotation;
pub mod member;
pub mod schema;

pub use annotation::{AnnotationIR, Direction, Strategy, TypeOverride};
pub use member::{FieldIR, MethodIR, MethodKind};
pub use schema::{Backing, CaseIR, ClassIR, EnumIR};
