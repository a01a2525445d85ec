//! Parsers extracting reflection information from the Rust AST.
//!
//! - Struct definitions → [`ClassIR`](crate::ir::ClassIR)
//! - Enum definitions → [`EnumIR`](crate::ir::EnumIR)
//! - `impl` blocks → [`MethodIR`](crate::ir::MethodIR)s

pub mod attributes;
pub mod enum_parser;
pub mod method_parser;
pub mod struct_parser;
