//! Procedural macros for fieldmap.
//!
//! - `#[derive(Serializable)]` binds a struct with named fields (or a
//!   unit-only enum) to the reflection layer.
//! - `#[reflect_methods]` exposes the accessor methods of an inherent impl
//!   block, optionally as serialized fields.
//!
//! These macros are re-exported by the `fieldmap` crate and generate paths
//! rooted at `::fieldmap`.

use proc_macro::TokenStream;
use syn::{Data, DeriveInput, ItemImpl};

mod codegen;
mod ir;
mod parser;

use codegen::{ImplBlockGenerator, MethodsGenerator};
use parser::enum_parser::{EnumParseError, EnumParser};
use parser::method_parser::{strip_serialize_attrs, MethodParseError, MethodParser};
use parser::struct_parser::{StructParseError, StructParser};

/// Derive macro binding a type to the fieldmap reflection layer.
///
/// Structs must also implement `Debug` and `Clone`, and `Default` unless
/// `#[fieldmap(no_default)]` is set.
///
/// # Example
///
/// ```rust,ignore
/// use fieldmap::Serializable;
///
/// #[derive(Debug, Clone, Default, Serializable)]
/// #[fieldmap(class = "app::Tag")]
/// struct Tag {
///     #[serialize]
///     id: i64,
///     #[serialize(name = "title")]
///     label: String,
/// }
///
/// #[derive(Debug, Clone, Copy, Serializable)]
/// enum Place {
///     #[fieldmap(value = "first")]
///     First,
///     #[fieldmap(value = "second")]
///     Second,
/// }
/// ```
#[proc_macro_derive(Serializable, attributes(serialize, fieldmap))]
pub fn derive_serializable(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match derive_serializable_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Routes structs and enums to their parser and generator.
fn derive_serializable_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let generator = ImplBlockGenerator::new();
    match &input.data {
        Data::Struct(_) => {
            let class = StructParser::parse(input).map_err(|e| convert_struct_error(e, input))?;
            Ok(generator.generate_class(&class))
        }
        Data::Enum(_) => {
            let enum_ir = EnumParser::parse(input).map_err(|e| convert_enum_error(e, input))?;
            Ok(generator.generate_enum(&enum_ir))
        }
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Serializable cannot be derived for unions",
        )),
    }
}

/// Attribute macro generating `ReflectMethods` for an inherent impl block.
///
/// Getters (`fn(&self) -> T`) and setters (`fn(&mut self, T)`) named
/// `get_*`, `is_*` or `set_*` are reflected. A getter marked with
/// `#[serialize(...)]` is reflected whatever its name and becomes a read-only
/// serialized field named after the method without its `get_`/`is_` prefix.
///
/// # Example
///
/// ```rust,ignore
/// #[fieldmap::reflect_methods]
/// impl User {
///     /// Given and family name.
///     #[serialize]
///     pub fn get_full_name(&self) -> String {
///         format!("{} {}", self.first, self.last)
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn reflect_methods(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = proc_macro2::TokenStream::from(args);
    if !args.is_empty() {
        return syn::Error::new_spanned(args, "#[reflect_methods] takes no arguments")
            .into_compile_error()
            .into();
    }
    let mut item = syn::parse_macro_input!(input as ItemImpl);

    let methods = match MethodParser::parse(&item) {
        Ok(methods) => methods,
        Err(err) => return convert_method_error(err, &item).into_compile_error().into(),
    };
    strip_serialize_attrs(&mut item);
    let reflect_impl = MethodsGenerator::new().generate(&item.self_ty, &methods);

    quote::quote! {
        #item
        #reflect_impl
    }
    .into()
}

/// Convert a StructParseError to a syn::Error with proper span information.
fn convert_struct_error(error: StructParseError, input: &DeriveInput) -> syn::Error {
    match error {
        StructParseError::Attrs(err) => syn::Error::new(err.span(), err.to_string()),
        other => syn::Error::new_spanned(&input.ident, other.to_string()),
    }
}

/// Convert an EnumParseError to a syn::Error with proper span information.
fn convert_enum_error(error: EnumParseError, input: &DeriveInput) -> syn::Error {
    match error {
        EnumParseError::Attrs(err) => syn::Error::new(err.span(), err.to_string()),
        other => syn::Error::new_spanned(&input.ident, other.to_string()),
    }
}

fn convert_method_error(error: MethodParseError, item: &ItemImpl) -> syn::Error {
    match error {
        MethodParseError::Attrs(err) => syn::Error::new(err.span(), err.to_string()),
        other => syn::Error::new_spanned(&item.self_ty, other.to_string()),
    }
}
