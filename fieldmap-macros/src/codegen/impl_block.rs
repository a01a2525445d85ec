//! Impl block generation for derived types.
//!
//! A struct gets `Object`, `Reflect`, `Serializable`, `ToFieldValue` and
//! `FromFieldValue`; a unit enum gets `Reflect`, `SerializableEnum`,
//! `ToFieldValue` and `FromFieldValue`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;

use super::{annotation_tokens, description_tokens};
use crate::ir::{Backing, ClassIR, EnumIR, FieldIR};

/// Generates the reflection impls of a derived type.
#[derive(Debug, Default)]
pub struct ImplBlockGenerator;

impl ImplBlockGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_class(&self, class: &ClassIR) -> TokenStream {
        let ident = &class.ident;
        let class_name = class_name_tokens(ident, class.class.as_deref());
        let object_impl = self.generate_object(ident);
        let reflect_impl = self.generate_class_reflect(class);
        let properties = class
            .fields
            .iter()
            .map(|field| self.generate_property(class, field));
        let description = description_tokens(class.description.as_deref());

        let constructor = class.has_constructor.then(|| {
            quote! {
                .with_constructor(|| -> ::std::boxed::Box<dyn ::fieldmap::reflect::Object> {
                    ::std::boxed::Box::new(<Self as ::std::default::Default>::default())
                })
            }
        });
        let methods = class.methods.then(|| {
            quote! {
                .with_methods(<Self as ::fieldmap::reflect::ReflectMethods>::reflect_methods())
            }
        });

        quote! {
            #object_impl

            #reflect_impl

            impl ::fieldmap::reflect::Serializable for #ident {
                const CLASS: &'static str = #class_name;

                fn descriptor() -> ::fieldmap::reflect::ClassDescriptor {
                    ::fieldmap::reflect::ClassDescriptor::new(<Self as ::fieldmap::reflect::Serializable>::CLASS)
                        #constructor
                        #description
                        #(#properties)*
                        #methods
                }
            }

            impl ::fieldmap::reflect::ToFieldValue for #ident {
                fn to_field_value(&self) -> ::fieldmap::error::Result<::fieldmap::value::FieldValue> {
                    ::std::result::Result::Ok(::fieldmap::value::FieldValue::Object(
                        ::std::boxed::Box::new(::std::clone::Clone::clone(self)),
                    ))
                }
            }

            impl ::fieldmap::reflect::FromFieldValue for #ident {
                fn from_field_value(value: ::fieldmap::value::FieldValue) -> ::fieldmap::error::Result<Self> {
                    match value {
                        ::fieldmap::value::FieldValue::Object(object) => ::fieldmap::reflect::downcast_box::<Self>(object),
                        other => ::std::result::Result::Err(::fieldmap::reflect::unexpected_value(
                            <Self as ::fieldmap::reflect::Serializable>::CLASS,
                            &other,
                        )),
                    }
                }
            }
        }
    }

    pub fn generate_enum(&self, enum_ir: &EnumIR) -> TokenStream {
        let ident = &enum_ir.ident;
        let enum_name = class_name_tokens(ident, enum_ir.class.as_deref());

        let cases = enum_ir.cases.iter().map(|case| {
            let name = case.ident.to_string();
            match &case.backing {
                Some(Backing::Int(value)) => quote!(.with_backed_case(#name, #value)),
                Some(Backing::String(value)) => quote!(.with_backed_case(#name, #value)),
                None => quote!(.with_case(#name)),
            }
        });

        let to_arms = enum_ir.cases.iter().map(|case| {
            let variant = &case.ident;
            let name = variant.to_string();
            let value = match &case.backing {
                Some(Backing::Int(value)) => quote! {
                    ::fieldmap::value::EnumValue::backed(Self::ENUM, #name, #value)
                },
                Some(Backing::String(value)) => quote! {
                    ::fieldmap::value::EnumValue::backed(Self::ENUM, #name, #value)
                },
                None => quote!(::fieldmap::value::EnumValue::unit(Self::ENUM, #name)),
            };
            let value = quote!(::fieldmap::value::FieldValue::Enum(#value));
            quote!(Self::#variant => ::std::result::Result::Ok(#value),)
        });

        let from_arms = enum_ir.cases.iter().map(|case| {
            let variant = &case.ident;
            let name = variant.to_string();
            quote!(#name => ::std::result::Result::Ok(Self::#variant),)
        });

        quote! {
            impl ::fieldmap::reflect::Reflect for #ident {
                fn declared_type() -> ::fieldmap::reflect::DeclaredType {
                    ::fieldmap::reflect::DeclaredType::of(::fieldmap::reflect::TypeRef::Enum(
                        <Self as ::fieldmap::reflect::SerializableEnum>::ENUM.into(),
                    ))
                }

                fn register_type(types: &mut ::fieldmap::reflect::TypeRegistry) {
                    types.register_enum(<Self as ::fieldmap::reflect::SerializableEnum>::enum_descriptor());
                }
            }

            impl ::fieldmap::reflect::SerializableEnum for #ident {
                const ENUM: &'static str = #enum_name;

                fn enum_descriptor() -> ::fieldmap::reflect::EnumDescriptor {
                    ::fieldmap::reflect::EnumDescriptor::new(<Self as ::fieldmap::reflect::SerializableEnum>::ENUM)
                        #(#cases)*
                }
            }

            impl ::fieldmap::reflect::ToFieldValue for #ident {
                fn to_field_value(&self) -> ::fieldmap::error::Result<::fieldmap::value::FieldValue> {
                    use ::fieldmap::reflect::SerializableEnum as _;
                    match self {
                        #(#to_arms)*
                    }
                }
            }

            impl ::fieldmap::reflect::FromFieldValue for #ident {
                fn from_field_value(value: ::fieldmap::value::FieldValue) -> ::fieldmap::error::Result<Self> {
                    use ::fieldmap::reflect::SerializableEnum as _;
                    match value {
                        ::fieldmap::value::FieldValue::Enum(value) => match value.case.as_str() {
                            #(#from_arms)*
                            other => ::std::result::Result::Err(::fieldmap::error::SerializerError::deserialization(
                                ::std::format!("Unknown case \"{}\" of {}", other, Self::ENUM),
                            )),
                        },
                        other => ::std::result::Result::Err(::fieldmap::reflect::unexpected_value(Self::ENUM, &other)),
                    }
                }
            }
        }
    }

    fn generate_object(&self, ident: &Ident) -> TokenStream {
        quote! {
            impl ::fieldmap::reflect::Object for #ident {
                fn class_name(&self) -> &str {
                    <Self as ::fieldmap::reflect::Serializable>::CLASS
                }

                fn as_any(&self) -> &dyn ::std::any::Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                    self
                }

                fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                    self
                }

                fn clone_object(&self) -> ::std::boxed::Box<dyn ::fieldmap::reflect::Object> {
                    ::std::boxed::Box::new(::std::clone::Clone::clone(self))
                }
            }
        }
    }

    /// `Reflect` for a class: registering the class registers its field
    /// types once, which stops at cycles.
    fn generate_class_reflect(&self, class: &ClassIR) -> TokenStream {
        let ident = &class.ident;
        let field_types = class.fields.iter().map(|field| &field.ty);
        let method_types = class.methods.then(|| {
            quote!(<Self as ::fieldmap::reflect::ReflectMethods>::register_method_types(types);)
        });

        quote! {
            impl ::fieldmap::reflect::Reflect for #ident {
                fn declared_type() -> ::fieldmap::reflect::DeclaredType {
                    ::fieldmap::reflect::DeclaredType::of(::fieldmap::reflect::TypeRef::Object(
                        <Self as ::fieldmap::reflect::Serializable>::CLASS.into(),
                    ))
                }

                fn register_type(types: &mut ::fieldmap::reflect::TypeRegistry) {
                    if types.register_class(<Self as ::fieldmap::reflect::Serializable>::descriptor()) {
                        #(<#field_types as ::fieldmap::reflect::Reflect>::register_type(types);)*
                        #method_types
                    }
                }
            }
        }
    }

    fn generate_property(&self, class: &ClassIR, field: &FieldIR) -> TokenStream {
        let name = field.name();
        let ident = &field.ident;
        let ty = &field.ty;
        let annotation = annotation_tokens(&field.annotation);
        let description = description_tokens(field.description.as_deref());

        let hooks = (!class.accessors).then(|| {
            quote! {
                .with_get_hook(|object: &dyn ::fieldmap::reflect::Object| -> ::fieldmap::error::Result<::fieldmap::value::FieldValue> {
                    let this = ::fieldmap::reflect::downcast_ref::<Self>(object)?;
                    ::fieldmap::reflect::ToFieldValue::to_field_value(&this.#ident)
                })
                .with_set_hook(|object: &mut dyn ::fieldmap::reflect::Object, value: ::fieldmap::value::FieldValue| -> ::fieldmap::error::Result<()> {
                    let this = ::fieldmap::reflect::downcast_mut::<Self>(object)?;
                    this.#ident = <#ty as ::fieldmap::reflect::FromFieldValue>::from_field_value(value)?;
                    ::std::result::Result::Ok(())
                })
            }
        });

        quote! {
            .with_property(
                ::fieldmap::reflect::PropertyDescriptor::new(#name, <#ty as ::fieldmap::reflect::Reflect>::declared_type())
                    .with_annotation(#annotation)
                    #description
                    #hooks
            )
        }
    }
}

/// The explicit name, or `module_path!()::Ident`.
fn class_name_tokens(ident: &Ident, explicit: Option<&str>) -> TokenStream {
    match explicit {
        Some(name) => quote!(#name),
        None => {
            let ident = ident.to_string();
            quote!(::std::concat!(::std::module_path!(), "::", #ident))
        }
    }
}
