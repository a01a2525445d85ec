//! Handler registration and resolution.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, SerializerError};
use crate::handler::TypeHandler;
use crate::metadata::FieldMetadata;
use crate::reflect::TypeRef;
use crate::value::FieldValue;

/// An immutable, priority-ordered list of handlers.
///
/// Handlers are sorted once on construction by descending priority; equal
/// priorities keep their registration order. An explicitly named handler
/// always wins over the support predicates.
#[derive(Clone, Default)]
pub struct HandlerResolver {
    handlers: Vec<Arc<dyn TypeHandler>>,
    by_id: HashMap<String, usize>,
}

impl fmt::Debug for HandlerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

impl HandlerResolver {
    pub fn new(handlers: impl IntoIterator<Item = Arc<dyn TypeHandler>>) -> Self {
        let mut handlers: Vec<_> = handlers.into_iter().collect();
        handlers.sort_by_key(|handler| Reverse(handler.priority()));

        let mut by_id = HashMap::with_capacity(handlers.len());
        for (index, handler) in handlers.iter().enumerate() {
            by_id.entry(handler.id().to_owned()).or_insert(index);
        }

        Self { handlers, by_id }
    }

    /// Handler ids in resolution order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|handler| handler.id())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The handler registered under `id`.
    pub fn get(&self, id: &str) -> Result<&dyn TypeHandler> {
        self.by_id
            .get(id)
            .map(|index| self.handlers[*index].as_ref())
            .ok_or_else(|| SerializerError::resolution(format!("Unable to get handler \"{id}\".")))
    }

    pub fn resolve_for_serialize(
        &self,
        value: &FieldValue,
        custom_handler: Option<&str>,
    ) -> Result<&dyn TypeHandler> {
        if let Some(id) = custom_handler {
            return self.get(id);
        }
        self.first(|handler| handler.supports_serialize(value))
            .ok_or_else(|| SerializerError::resolution("Unable to determine serialization handler"))
    }

    pub fn resolve_for_deserialize(
        &self,
        value: &Value,
        ty: &TypeRef,
        custom_handler: Option<&str>,
    ) -> Result<&dyn TypeHandler> {
        if let Some(id) = custom_handler {
            return self.get(id);
        }
        self.first(|handler| handler.supports_deserialize(value, ty))
            .ok_or_else(|| {
                SerializerError::resolution("Unable to determine deserialization handler")
            })
    }

    pub fn resolve_for_describe(
        &self,
        name: &str,
        metadata: &FieldMetadata,
    ) -> Result<&dyn TypeHandler> {
        if let Some(id) = metadata.custom_handler.as_deref() {
            return self.get(id);
        }
        self.first(|handler| handler.supports_describe(name, metadata))
            .ok_or_else(|| SerializerError::resolution("Unable to determine description handler"))
    }

    fn first(&self, supports: impl Fn(&dyn TypeHandler) -> bool) -> Option<&dyn TypeHandler> {
        let handler = self
            .handlers
            .iter()
            .map(|handler| handler.as_ref())
            .find(|handler| supports(*handler))?;
        tracing::trace!(handler = handler.id(), "resolved type handler");
        Some(handler)
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::engine::Engine;
    use proptest::prelude::*;

    struct Ranked(String, i32);

    impl TypeHandler for Ranked {
        fn id(&self) -> &str {
            &self.0
        }

        fn priority(&self) -> i32 {
            self.1
        }

        fn supports_serialize(&self, _value: &FieldValue) -> bool {
            true
        }

        fn serialize(&self, _: &FieldValue, _: &FieldMetadata, _: &Engine) -> Result<Value> {
            Ok(Value::Null)
        }

        fn deserialize(&self, _: Value, _: &FieldMetadata, _: &Engine) -> Result<FieldValue> {
            Ok(FieldValue::Null)
        }
    }

    proptest! {
        /// Property: resolution order is non-increasing in priority, and ties
        /// keep registration order.
        #[test]
        fn prop_order_is_stable_by_priority(priorities in proptest::collection::vec(-3i32..=3, 0..12)) {
            let resolver = HandlerResolver::new(
                priorities
                    .iter()
                    .enumerate()
                    .map(|(index, priority)| {
                        Arc::new(Ranked(index.to_string(), *priority)) as Arc<dyn TypeHandler>
                    }),
            );

            let order: Vec<(i32, usize)> = resolver
                .ids()
                .map(|id| {
                    let index: usize = id.parse().unwrap();
                    (priorities[index], index)
                })
                .collect();

            for pair in order.windows(2) {
                prop_assert!(pair[0].0 > pair[1].0 || (pair[0].0 == pair[1].0 && pair[0].1 < pair[1].1));
            }
        }

        /// Property: the resolved serializer is the highest-priority handler.
        #[test]
        fn prop_highest_priority_wins(priorities in proptest::collection::vec(-3i32..=3, 1..12)) {
            let resolver = HandlerResolver::new(
                priorities
                    .iter()
                    .enumerate()
                    .map(|(index, priority)| {
                        Arc::new(Ranked(index.to_string(), *priority)) as Arc<dyn TypeHandler>
                    }),
            );
            let max = *priorities.iter().max().unwrap();
            let first = priorities.iter().position(|priority| *priority == max).unwrap();

            let handler = resolver.resolve_for_serialize(&FieldValue::Null, None).unwrap();
            prop_assert_eq!(handler.id(), first.to_string());
        }
    }
}
