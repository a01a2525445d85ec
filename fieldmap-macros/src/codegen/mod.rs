//! Rust code generation.
//!
//! - [`impl_block`] emits the reflection impls of derived structs and enums
//! - [`methods`] emits `ReflectMethods` for `#[reflect_methods]` impl blocks

pub mod impl_block;
pub mod methods;

pub use impl_block::ImplBlockGenerator;
pub use methods::MethodsGenerator;

use proc_macro2::TokenStream;
use quote::quote;

use crate::ir::{AnnotationIR, Direction, Strategy, TypeOverride};

/// Builder chain constructing a runtime `Annotation`.
pub(crate) fn annotation_tokens(annotation: &AnnotationIR) -> TokenStream {
    let mut tokens = quote!(::fieldmap::annotation::Annotation::new());

    if let Some(name) = &annotation.name {
        tokens.extend(quote!(.with_name(#name)));
    }
    if let Some(handler) = &annotation.handler {
        tokens.extend(quote!(.with_handler(#handler)));
    }
    match &annotation.type_override {
        Some(TypeOverride::Literal(type_name)) => tokens.extend(quote!(.with_type(#type_name))),
        Some(TypeOverride::Param(param)) => tokens.extend(quote!(.with_type_param(#param))),
        None => {}
    }
    if let Some(strategy) = annotation.strategy {
        let variant = match strategy {
            Strategy::Default => quote!(Default),
            Strategy::KeysValues => quote!(KeysValues),
        };
        tokens.extend(quote!(.with_strategy(::fieldmap::annotation::Strategy::#variant)));
    }
    if let Some(persisted_name) = &annotation.persisted_name {
        tokens.extend(quote!(.with_persisted_name(#persisted_name)));
    }
    for (tag, class) in &annotation.discriminator_map {
        tokens.extend(quote!(.with_discriminator(#tag, #class)));
    }
    for (field, direction) in &annotation.order_by {
        let variant = match direction {
            Direction::Asc => quote!(Asc),
            Direction::Desc => quote!(Desc),
        };
        tokens.extend(quote!(.with_order_by(#field, ::fieldmap::annotation::Direction::#variant)));
    }

    tokens
}

/// `.with_description("...")` when a doc comment is present.
pub(crate) fn description_tokens(description: Option<&str>) -> TokenStream {
    match description {
        Some(text) => quote!(.with_description(#text)),
        None => TokenStream::new(),
    }
}
