//! `ReflectMethods` generation for `#[reflect_methods]` impl blocks.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

use super::{annotation_tokens, description_tokens};
use crate::ir::{MethodIR, MethodKind};

#[derive(Debug, Default)]
pub struct MethodsGenerator;

impl MethodsGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, self_ty: &Type, methods: &[MethodIR]) -> TokenStream {
        let descriptors = methods.iter().map(|method| self.generate_method(method));
        let getter_types = methods
            .iter()
            .filter(|method| method.kind == MethodKind::Getter && method.annotation.is_some())
            .map(|method| &method.ty);

        quote! {
            impl ::fieldmap::reflect::ReflectMethods for #self_ty {
                fn reflect_methods() -> ::std::vec::Vec<::fieldmap::reflect::MethodDescriptor> {
                    ::std::vec![#(#descriptors),*]
                }

                fn register_method_types(types: &mut ::fieldmap::reflect::TypeRegistry) {
                    #(<#getter_types as ::fieldmap::reflect::Reflect>::register_type(types);)*
                }
            }
        }
    }

    fn generate_method(&self, method: &MethodIR) -> TokenStream {
        let ident = &method.ident;
        let name = ident.to_string();
        let ty = &method.ty;

        let constructor = match method.kind {
            MethodKind::Getter => quote! {
                ::fieldmap::reflect::MethodDescriptor::getter(
                    #name,
                    <#ty as ::fieldmap::reflect::Reflect>::declared_type(),
                    |object: &dyn ::fieldmap::reflect::Object| -> ::fieldmap::error::Result<::fieldmap::value::FieldValue> {
                        let this = ::fieldmap::reflect::downcast_ref::<Self>(object)?;
                        ::fieldmap::reflect::ToFieldValue::to_field_value(&this.#ident())
                    },
                )
            },
            MethodKind::Setter => quote! {
                ::fieldmap::reflect::MethodDescriptor::setter(
                    #name,
                    <#ty as ::fieldmap::reflect::Reflect>::declared_type(),
                    |object: &mut dyn ::fieldmap::reflect::Object, value: ::fieldmap::value::FieldValue| -> ::fieldmap::error::Result<()> {
                        let this = ::fieldmap::reflect::downcast_mut::<Self>(object)?;
                        let _ = this.#ident(<#ty as ::fieldmap::reflect::FromFieldValue>::from_field_value(value)?);
                        ::std::result::Result::Ok(())
                    },
                )
            },
        };

        let visibility = if method.is_public {
            quote!(Public)
        } else {
            quote!(Private)
        };
        let annotation = method.annotation.as_ref().map(|annotation| {
            let annotation = annotation_tokens(annotation);
            quote!(.with_annotation(#annotation))
        });
        let description = description_tokens(method.description.as_deref());

        quote! {
            #constructor
                .with_visibility(::fieldmap::reflect::Visibility::#visibility)
                #annotation
                #description
        }
    }
}
