//! Root IR definitions for derived types.

use syn::Ident;

use super::FieldIR;

/// A struct bound as a class.
#[derive(Debug, Clone)]
pub struct ClassIR {
    pub ident: Ident,
    /// Explicit class name; `None` means `module_path!()::Ident`.
    pub class: Option<String>,
    pub description: Option<String>,
    /// Only annotated fields, in declaration order.
    pub fields: Vec<FieldIR>,
    pub has_constructor: bool,
    /// Properties are accessed through `get_x`/`set_x` methods.
    pub accessors: bool,
    /// The descriptor includes `ReflectMethods::reflect_methods()`.
    pub methods: bool,
}

/// Backing value of an enum case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backing {
    Int(i64),
    String(String),
}

#[derive(Debug, Clone)]
pub struct CaseIR {
    pub ident: Ident,
    pub backing: Option<Backing>,
}

/// A unit-only enum.
#[derive(Debug, Clone)]
pub struct EnumIR {
    pub ident: Ident,
    pub class: Option<String>,
    pub cases: Vec<CaseIR>,
}
