//! Struct parsing logic.
//!
//! Only structs with named fields are supported. Fields without a
//! `#[serialize]` attribute are not part of the class and are skipped.

use darling::FromDeriveInput;
use syn::{Attribute, Data, DeriveInput, Fields, Lit, Meta};

use crate::ir::{AnnotationIR, ClassIR, FieldIR};
use crate::parser::attributes::{ContainerAttrs, SerializeAttrs};

/// Error type for struct parsing failures.
#[derive(Debug, thiserror::Error)]
pub enum StructParseError {
    #[error("Invalid attributes: {0}")]
    Attrs(#[from] darling::Error),

    #[error("Expected struct, found {0}")]
    NotAStruct(&'static str),

    #[error("Serializable cannot be derived for tuple or unit structs")]
    Unnamed,

    #[error("Serializable cannot be derived for generic structs")]
    Generic,
}

/// Parses struct definitions into ClassIR.
pub struct StructParser;

impl StructParser {
    pub fn parse(input: &DeriveInput) -> Result<ClassIR, StructParseError> {
        let data_struct = match &input.data {
            Data::Struct(data) => data,
            Data::Enum(_) => return Err(StructParseError::NotAStruct("enum")),
            Data::Union(_) => return Err(StructParseError::NotAStruct("union")),
        };
        let Fields::Named(named) = &data_struct.fields else {
            return Err(StructParseError::Unnamed);
        };

        let container = ContainerAttrs::from_derive_input(input)?;
        if !container.generics.params.is_empty() {
            return Err(StructParseError::Generic);
        }

        let mut errors = darling::Error::accumulator();
        let mut fields = Vec::new();
        for field in &named.named {
            let attrs = errors.handle(SerializeAttrs::from_attributes(&field.attrs));
            let Some(attrs) = attrs.flatten() else {
                continue;
            };
            let Some(annotation) = errors.handle(AnnotationIR::from_attrs(&attrs)) else {
                continue;
            };
            let Some(ident) = field.ident.clone() else {
                continue;
            };
            fields.push(FieldIR {
                ident,
                ty: field.ty.clone(),
                annotation,
                description: extract_doc_comments(&field.attrs),
            });
        }
        errors.finish()?;

        Ok(ClassIR {
            ident: container.ident.clone(),
            class: container.class.clone(),
            description: extract_doc_comments(&input.attrs),
            fields,
            has_constructor: !container.no_default,
            accessors: container.accessors,
            methods: container.uses_methods(),
        })
    }
}

/// Extract doc comments from attributes.
///
/// Lines are trimmed and joined with newlines; `None` when there is no
/// non-blank doc text.
pub fn extract_doc_comments(attrs: &[Attribute]) -> Option<String> {
    let doc_lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                syn::Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(lit_str) => Some(lit_str.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect();

    let description = doc_lines
        .iter()
        .map(|line| line.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    (!description.is_empty()).then_some(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Direction, Strategy, TypeOverride};
    use syn::parse_quote;

    #[test]
    fn test_parse_annotated_fields_only() {
        let input: DeriveInput = parse_quote! {
            /// A blog post.
            ///
            /// With details.
            #[fieldmap(class = "app::Post")]
            struct Post {
                /// Primary key.
                #[serialize]
                id: i64,
                cache: String,
                #[serialize(name = "createdAt", type = "Y-m-d")]
                created_at: Option<DateTime<Utc>>,
            }
        };

        let class = StructParser::parse(&input).unwrap();
        assert_eq!(class.ident, "Post");
        assert_eq!(class.class.as_deref(), Some("app::Post"));
        assert_eq!(
            class.description.as_deref(),
            Some("A blog post.\n\nWith details.")
        );
        assert!(class.has_constructor);
        assert!(!class.accessors);
        assert!(!class.methods);

        let names: Vec<_> = class.fields.iter().map(FieldIR::name).collect();
        assert_eq!(names, vec!["id", "created_at"]);
        assert_eq!(class.fields[0].description.as_deref(), Some("Primary key."));
        assert_eq!(
            class.fields[1].annotation.name.as_deref(),
            Some("createdAt")
        );
        assert_eq!(
            class.fields[1].annotation.type_override,
            Some(TypeOverride::Literal("Y-m-d".into()))
        );
    }

    #[test]
    fn test_container_flags() {
        let input: DeriveInput = parse_quote! {
            #[fieldmap(accessors, no_default)]
            struct Account {
                #[serialize(strategy = "kv", order_by(position = "desc"))]
                items: Collection<Item>,
            }
        };

        let class = StructParser::parse(&input).unwrap();
        assert!(class.accessors);
        assert!(class.methods);
        assert!(!class.has_constructor);
        assert!(class.class.is_none());
        assert_eq!(
            class.fields[0].annotation.strategy,
            Some(Strategy::KeysValues)
        );
        assert_eq!(
            class.fields[0].annotation.order_by,
            vec![("position".to_string(), Direction::Desc)]
        );
    }

    #[test]
    fn test_rejects_unsupported_shapes() {
        let tuple: DeriveInput = parse_quote! { struct Id(#[serialize] i64); };
        assert!(matches!(StructParser::parse(&tuple), Err(StructParseError::Unnamed)));

        let generic: DeriveInput = parse_quote! { struct Page<T> { #[serialize] items: Vec<T> } };
        assert!(matches!(
            StructParser::parse(&generic),
            Err(StructParseError::Generic)
        ));

        let union: DeriveInput = parse_quote! { union Bits { a: u32 } };
        assert!(matches!(
            StructParser::parse(&union),
            Err(StructParseError::NotAStruct("union"))
        ));
    }

    #[test]
    fn test_field_attribute_errors() {
        let input: DeriveInput = parse_quote! {
            struct Post {
                #[serialize(unknown = "x")]
                id: i64,
            }
        };
        assert!(matches!(StructParser::parse(&input), Err(StructParseError::Attrs(_))));
    }

    #[test]
    fn test_extract_doc_comments() {
        let first: Attribute = parse_quote!(#[doc = "  first  "]);
        let empty: Attribute = parse_quote!(#[doc = ""]);
        let doc = extract_doc_comments(&[first, empty]);
        assert_eq!(doc.as_deref(), Some("first"));
        let blank: Attribute = parse_quote!(#[doc = "  "]);
        assert_eq!(extract_doc_comments(&[blank]), None);
        assert_eq!(extract_doc_comments(&[]), None);
    }
}
