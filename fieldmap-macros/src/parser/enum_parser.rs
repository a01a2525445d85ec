//! Enum parsing logic.
//!
//! Only unit-only enums are supported. A variant becomes a backed case when
//! it carries `#[fieldmap(value = ...)]`; either every variant has a value of
//! the same kind or none does.

use darling::{FromDeriveInput, FromVariant};
use syn::{Data, DeriveInput, Fields};

use crate::ir::{Backing, CaseIR, EnumIR};
use crate::parser::attributes::{backing_literal, BackingLit, ContainerAttrs, VariantAttrs};

/// Error type for enum parsing failures.
#[derive(Debug, thiserror::Error)]
pub enum EnumParseError {
    #[error("Invalid attributes: {0}")]
    Attrs(#[from] darling::Error),

    #[error("Expected enum, found {0}")]
    NotAnEnum(&'static str),

    #[error("Variant '{0}' has fields; only unit variants are supported")]
    DataVariant(String),

    #[error("Serializable cannot be derived for generic enums")]
    Generic,

    #[error("Enum has no variants")]
    Empty,

    #[error("Variant '{0}' has no value; either every variant or none carries one")]
    MissingValue(String),

    #[error("Variant '{0}' mixes integer and string values")]
    MixedValues(String),

    #[error("Variants '{0}' and '{1}' share the same value")]
    DuplicateValue(String, String),
}

/// Parses enum definitions into EnumIR.
pub struct EnumParser;

impl EnumParser {
    pub fn parse(input: &DeriveInput) -> Result<EnumIR, EnumParseError> {
        let data_enum = match &input.data {
            Data::Enum(data) => data,
            Data::Struct(_) => return Err(EnumParseError::NotAnEnum("struct")),
            Data::Union(_) => return Err(EnumParseError::NotAnEnum("union")),
        };
        if let Some(variant) = data_enum
            .variants
            .iter()
            .find(|variant| !matches!(variant.fields, Fields::Unit))
        {
            return Err(EnumParseError::DataVariant(variant.ident.to_string()));
        }

        let container = ContainerAttrs::from_derive_input(input)?;
        if !container.generics.params.is_empty() {
            return Err(EnumParseError::Generic);
        }
        if data_enum.variants.is_empty() {
            return Err(EnumParseError::Empty);
        }

        let cases = data_enum
            .variants
            .iter()
            .map(|variant| -> Result<CaseIR, EnumParseError> {
                let attrs = VariantAttrs::from_variant(variant)?;
                let backing = attrs
                    .value
                    .as_ref()
                    .map(backing_literal)
                    .transpose()?
                    .map(|backing| match backing {
                        BackingLit::Int(value) => Backing::Int(value),
                        BackingLit::String(value) => Backing::String(value),
                    });
                Ok(CaseIR {
                    ident: attrs.ident,
                    backing,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::check_backing(&cases)?;

        Ok(EnumIR {
            ident: container.ident.clone(),
            class: container.class.clone(),
            cases,
        })
    }

    fn check_backing(cases: &[CaseIR]) -> Result<(), EnumParseError> {
        let Some(first) = cases.iter().find_map(|case| case.backing.as_ref()) else {
            return Ok(());
        };

        for (index, case) in cases.iter().enumerate() {
            let Some(backing) = &case.backing else {
                return Err(EnumParseError::MissingValue(case.ident.to_string()));
            };
            if std::mem::discriminant(backing) != std::mem::discriminant(first) {
                return Err(EnumParseError::MixedValues(case.ident.to_string()));
            }
            if let Some(other) = cases[..index]
                .iter()
                .find(|other| other.backing.as_ref() == Some(backing))
            {
                return Err(EnumParseError::DuplicateValue(
                    other.ident.to_string(),
                    case.ident.to_string(),
                ));
            }
        }
        Ok(())
    }
}
