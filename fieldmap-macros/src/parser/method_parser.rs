//! `impl` block parsing for `#[reflect_methods]`.
//!
//! Recognized accessor shapes:
//! - getter: `fn name(&self) -> T`
//! - setter: `fn name(&mut self, value: T)`
//!
//! Unannotated methods are only picked up when named like accessors
//! (`get_*`, `is_*`, `set_*`). `#[serialize]` is only valid on getters and
//! includes a getter of any name.

use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl, ReturnType, Type, Visibility};

use crate::ir::{AnnotationIR, MethodIR, MethodKind};
use crate::parser::attributes::{is_serialize, SerializeAttrs};
use crate::parser::struct_parser::extract_doc_comments;

/// Error type for impl block parsing failures.
#[derive(Debug, thiserror::Error)]
pub enum MethodParseError {
    #[error("Invalid attributes: {0}")]
    Attrs(#[from] darling::Error),

    #[error("#[reflect_methods] cannot be applied to trait impls")]
    TraitImpl,

    #[error("#[reflect_methods] cannot be applied to generic impls")]
    Generic,

    #[error("Method '{0}' has #[serialize] but is not a getter `fn(&self) -> T`")]
    NotAGetter(String),
}

/// Parses accessor methods of an inherent impl block.
pub struct MethodParser;

impl MethodParser {
    pub fn parse(item: &ItemImpl) -> Result<Vec<MethodIR>, MethodParseError> {
        if item.trait_.is_some() {
            return Err(MethodParseError::TraitImpl);
        }
        if !item.generics.params.is_empty() {
            return Err(MethodParseError::Generic);
        }

        let mut methods = Vec::new();
        for impl_item in &item.items {
            let ImplItem::Fn(method) = impl_item else {
                continue;
            };
            let annotation = SerializeAttrs::from_attributes(&method.attrs)?
                .map(|attrs| AnnotationIR::from_attrs(&attrs))
                .transpose()?;

            let Some((kind, ty)) = accessor_shape(method) else {
                if annotation.is_some() {
                    return Err(MethodParseError::NotAGetter(method.sig.ident.to_string()));
                }
                continue;
            };
            if kind == MethodKind::Setter && annotation.is_some() {
                return Err(MethodParseError::NotAGetter(method.sig.ident.to_string()));
            }
            if annotation.is_none() && !is_accessor_name(&method.sig.ident.to_string()) {
                continue;
            }

            methods.push(MethodIR {
                ident: method.sig.ident.clone(),
                kind,
                ty,
                is_public: matches!(method.vis, Visibility::Public(_)),
                annotation,
                description: extract_doc_comments(&method.attrs),
            });
        }
        Ok(methods)
    }
}

/// Remove `#[serialize]` attributes so the impl block compiles as written.
pub fn strip_serialize_attrs(item: &mut ItemImpl) {
    for impl_item in &mut item.items {
        if let ImplItem::Fn(method) = impl_item {
            method.attrs.retain(|attr| !is_serialize(attr));
        }
    }
}

fn accessor_shape(method: &ImplItemFn) -> Option<(MethodKind, Type)> {
    let sig = &method.sig;
    if !sig.generics.params.is_empty() || sig.asyncness.is_some() || sig.unsafety.is_some() {
        return None;
    }

    let mut inputs = sig.inputs.iter();
    let Some(FnArg::Receiver(receiver)) = inputs.next() else {
        return None;
    };
    if receiver.reference.is_none() || receiver.colon_token.is_some() {
        return None;
    }

    match (receiver.mutability.is_some(), inputs.next(), inputs.next(), &sig.output) {
        (false, None, None, ReturnType::Type(_, ty)) if !is_unit(ty) => {
            let ty = match &**ty {
                Type::Reference(reference) => (*reference.elem).clone(),
                other => other.clone(),
            };
            Some((MethodKind::Getter, ty))
        }
        (true, Some(FnArg::Typed(arg)), None, _) => Some((MethodKind::Setter, (*arg.ty).clone())),
        _ => None,
    }
}

fn is_accessor_name(name: &str) -> bool {
    ["get_", "is_", "set_"]
        .iter()
        .filter_map(|prefix| name.strip_prefix(prefix))
        .any(|rest| !rest.is_empty())
}

fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}
