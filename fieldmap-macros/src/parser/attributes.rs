//! Attribute parsing using darling.
//!
//! Two attribute namespaces are recognized:
//! - `#[fieldmap(...)]` on the type definition and on enum variants
//! - `#[serialize(...)]` on fields and accessor methods

use darling::ast::NestedMeta;
use darling::{FromDeriveInput, FromMeta, FromVariant};
use syn::{Attribute, Generics, Ident, Lit, Meta};

/// Container-level attributes parsed from `#[fieldmap(...)]`.
#[derive(Debug, Clone, FromDeriveInput)]
#[darling(attributes(fieldmap), supports(struct_named, enum_unit))]
pub struct ContainerAttrs {
    pub ident: Ident,

    pub generics: Generics,

    /// Class or enum name; defaults to `module_path!()::Ident`
    #[darling(default)]
    pub class: Option<String>,

    /// Read and write properties through `get_x`/`set_x` methods
    #[darling(default)]
    pub accessors: bool,

    /// Include the methods generated by `#[reflect_methods]`
    #[darling(default)]
    pub methods: bool,

    /// Do not register a constructor
    #[darling(default)]
    pub no_default: bool,
}

impl ContainerAttrs {
    /// Whether the descriptor pulls in `ReflectMethods`.
    pub fn uses_methods(&self) -> bool {
        self.methods || self.accessors
    }
}

/// Variant-level attributes parsed from `#[fieldmap(...)]` on enum variants.
#[derive(Debug, Clone, FromVariant)]
#[darling(attributes(fieldmap))]
pub struct VariantAttrs {
    pub ident: Ident,

    /// Backing value, a string or integer literal
    #[darling(default)]
    pub value: Option<Lit>,
}

/// Layout of an iterable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromMeta)]
pub enum StrategyAttr {
    #[darling(rename = "default")]
    Default,

    #[darling(rename = "kv")]
    KeysValues,
}

/// Sort direction of an `order_by` entry, case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionAttr {
    Asc,
    Desc,
}

impl FromMeta for DirectionAttr {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(darling::Error::unknown_value(value)),
        }
    }
}

/// `key = "value"` pairs in source order.
///
/// Used for `discriminator_map(post = "app::Post")` and
/// `order_by(position = "asc")`, where order matters or keys are free-form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairs(pub Vec<(String, String)>);

impl FromMeta for Pairs {
    fn from_list(items: &[NestedMeta]) -> darling::Result<Self> {
        let mut errors = darling::Error::accumulator();
        let mut pairs = Vec::with_capacity(items.len());

        for item in items {
            let pair = match item {
                NestedMeta::Meta(Meta::NameValue(pair)) => pair,
                other => {
                    let error = darling::Error::custom("expected `key = \"value\"`");
                    errors.push(error.with_span(other));
                    continue;
                }
            };
            let Some(key) = pair.path.get_ident() else {
                let error = darling::Error::custom("expected an identifier key");
                errors.push(error.with_span(&pair.path));
                continue;
            };
            let Some(value) = errors.handle(String::from_expr(&pair.value)) else {
                continue;
            };
            pairs.push((unraw(key), value));
        }

        errors.finish_with(Self(pairs))
    }
}

/// Options of a `#[serialize(...)]` attribute.
///
/// A bare `#[serialize]` yields the default value.
#[derive(Debug, Clone, Default, FromMeta)]
pub struct SerializeAttrs {
    /// Output field name
    #[darling(default)]
    pub name: Option<String>,

    /// Handler id
    #[darling(default)]
    pub handler: Option<String>,

    /// Literal type override
    #[darling(default, rename = "type")]
    pub type_name: Option<String>,

    /// Parameter bag key holding the type override
    #[darling(default)]
    pub type_param: Option<String>,

    #[darling(default)]
    pub strategy: Option<StrategyAttr>,

    #[darling(default)]
    pub persisted_name: Option<String>,

    #[darling(default)]
    pub discriminator_map: Option<Pairs>,

    #[darling(default)]
    pub order_by: Option<Pairs>,
}

impl SerializeAttrs {
    /// Parse the `#[serialize]` attribute among `attrs`, if any.
    pub fn from_attributes(attrs: &[Attribute]) -> darling::Result<Option<Self>> {
        let Some(attr) = attrs.iter().find(|attr| is_serialize(attr)) else {
            return Ok(None);
        };

        let parsed = match &attr.meta {
            Meta::Path(_) => Self::default(),
            Meta::List(list) => {
                let items = NestedMeta::parse_meta_list(list.tokens.clone())?;
                Self::from_list(&items)?
            }
            Meta::NameValue(_) => {
                return Err(darling::Error::custom("expected `#[serialize]` or `#[serialize(...)]`")
                    .with_span(attr));
            }
        };

        if parsed.type_name.is_some() && parsed.type_param.is_some() {
            return Err(darling::Error::custom("`type` and `type_param` are mutually exclusive")
                .with_span(attr));
        }
        Ok(Some(parsed))
    }

    /// `order_by` entries with parsed directions.
    pub fn order_by(&self) -> darling::Result<Vec<(String, DirectionAttr)>> {
        let Some(Pairs(pairs)) = &self.order_by else {
            return Ok(Vec::new());
        };
        pairs
            .iter()
            .map(|(field, direction)| Ok((field.clone(), DirectionAttr::from_string(direction)?)))
            .collect()
    }
}

pub fn is_serialize(attr: &Attribute) -> bool {
    attr.path().is_ident("serialize")
}

/// Integer or string backing of an enum case.
pub fn backing_literal(lit: &Lit) -> darling::Result<BackingLit> {
    match lit {
        Lit::Str(value) => Ok(BackingLit::String(value.value())),
        Lit::Int(value) => Ok(BackingLit::Int(value.base10_parse()?)),
        other => Err(darling::Error::unexpected_lit_type(other)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackingLit {
    Int(i64),
    String(String),
}

fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_owned).unwrap_or(name)
}
