//! Annotation IR: the validated content of a `#[serialize(...)]` attribute.

use crate::parser::attributes::{DirectionAttr, Pairs, SerializeAttrs, StrategyAttr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Default,
    KeysValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Type override of an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOverride {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationIR {
    pub name: Option<String>,
    pub handler: Option<String>,
    pub type_override: Option<TypeOverride>,
    pub strategy: Option<Strategy>,
    pub persisted_name: Option<String>,
    pub discriminator_map: Vec<(String, String)>,
    pub order_by: Vec<(String, Direction)>,
}

impl AnnotationIR {
    pub fn from_attrs(attrs: &SerializeAttrs) -> darling::Result<Self> {
        let type_override = match (&attrs.type_name, &attrs.type_param) {
            (Some(name), _) => Some(TypeOverride::Literal(name.clone())),
            (None, Some(param)) => Some(TypeOverride::Param(param.clone())),
            (None, None) => None,
        };

        Ok(Self {
            name: attrs.name.clone(),
            handler: attrs.handler.clone(),
            type_override,
            strategy: attrs.strategy.map(|strategy| match strategy {
                StrategyAttr::Default => Strategy::Default,
                StrategyAttr::KeysValues => Strategy::KeysValues,
            }),
            persisted_name: attrs.persisted_name.clone(),
            discriminator_map: attrs
                .discriminator_map
                .clone()
                .map(|Pairs(pairs)| pairs)
                .unwrap_or_default(),
            order_by: attrs
                .order_by()?
                .into_iter()
                .map(|(field, direction)| {
                    let direction = match direction {
                        DirectionAttr::Asc => Direction::Asc,
                        DirectionAttr::Desc => Direction::Desc,
                    };
                    (field, direction)
                })
                .collect(),
        })
    }
}
