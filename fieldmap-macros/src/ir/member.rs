//! Field and method IR.

use syn::{Ident, Type};

use super::AnnotationIR;

/// An annotated struct field.
#[derive(Debug, Clone)]
pub struct FieldIR {
    pub ident: Ident,
    pub ty: Type,
    pub annotation: AnnotationIR,
    /// Doc comment
    pub description: Option<String>,
}

impl FieldIR {
    /// Property name as seen by the reflection layer.
    pub fn name(&self) -> String {
        let name = self.ident.to_string();
        name.strip_prefix("r#").map(str::to_owned).unwrap_or(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// `fn(&self) -> T`
    Getter,
    /// `fn(&mut self, T)`
    Setter,
}

/// An accessor method of an `impl` block.
#[derive(Debug, Clone)]
pub struct MethodIR {
    pub ident: Ident,
    pub kind: MethodKind,
    /// Return type of a getter with the outer reference removed, or the
    /// parameter type of a setter.
    pub ty: Type,
    pub is_public: bool,
    pub annotation: Option<AnnotationIR>,
    pub description: Option<String>,
}
