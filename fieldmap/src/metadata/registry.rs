//! Per-class metadata lookup with in-process and external caching.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::cache::{CacheItem, MetadataCache, NoopMetadataCache};
use crate::error::{Result, SerializerError};
use crate::metadata::factory::MetadataFactory;
use crate::metadata::ClassMetadata;
use crate::reflect::TypeRegistry;

/// Prefix of external cache keys; the class name follows.
pub const CACHE_PREFIX: &str = "fieldmap_ser_";

/// Builds class metadata once and serves it from memory afterwards.
///
/// Lookup order is the in-process map, then the external [`MetadataCache`],
/// then the [`MetadataFactory`]. Misses are written back to both levels.
/// External cache failures are logged and never fail a lookup.
pub struct MetadataRegistry {
    factory: MetadataFactory,
    cache: Arc<dyn MetadataCache>,
    metadata: DashMap<String, Arc<ClassMetadata>>,
}

impl fmt::Debug for MetadataRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataRegistry")
            .field("factory", &self.factory)
            .field("classes", &self.metadata.len())
            .finish()
    }
}

impl Default for MetadataRegistry {
    fn default() -> Self {
        Self::new(MetadataFactory::default(), Arc::new(NoopMetadataCache))
    }
}

impl MetadataRegistry {
    pub fn new(factory: MetadataFactory, cache: Arc<dyn MetadataCache>) -> Self {
        Self {
            factory,
            cache,
            metadata: DashMap::new(),
        }
    }

    /// Metadata of `class_name`, resolving proxies to their real class.
    #[tracing::instrument(level = "trace", skip(self, types))]
    pub fn get(&self, types: &TypeRegistry, class_name: &str) -> Result<Arc<ClassMetadata>> {
        let class_name = types.real_class(class_name);
        if let Some(metadata) = self.metadata.get(class_name) {
            return Ok(Arc::clone(metadata.value()));
        }

        let key = cache_key(class_name);
        let item = match self.cache.get_item(&key) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Unable to cache Serializer metadata: {e}");
                None
            }
        };

        let hit = item.as_ref().filter(|item| item.is_hit());
        if let Some(cached) = hit.and_then(CacheItem::get) {
            match serde_json::from_str::<ClassMetadata>(cached) {
                Ok(metadata) => {
                    tracing::trace!(class = class_name, "metadata loaded from cache");
                    return Ok(self.store(class_name, metadata));
                }
                Err(e) => tracing::warn!("Unable to cache Serializer metadata: {e}"),
            }
        }

        let descriptor = types.class(class_name).ok_or_else(|| {
            SerializerError::configuration(format!("Cannot create reflection for {class_name}"))
        })?;
        let metadata = self.store(class_name, self.factory.build_metadata(descriptor)?);

        match serde_json::to_string(metadata.as_ref()) {
            Ok(json) => {
                let mut item = item.unwrap_or_else(|| CacheItem::miss(key));
                item.set(json);
                if let Err(e) = self.cache.save(item) {
                    tracing::warn!("Unable to cache Serializer metadata: {e}");
                }
            }
            Err(e) => tracing::warn!("Unable to cache Serializer metadata: {e}"),
        }

        Ok(metadata)
    }

    /// Whether `class_name` has been built or loaded by this registry.
    pub fn is_loaded(&self, class_name: &str) -> bool {
        self.metadata.contains_key(class_name)
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn factory(&self) -> &MetadataFactory {
        &self.factory
    }

    // The first stored value wins so that concurrent builds converge.
    fn store(&self, class_name: &str, metadata: ClassMetadata) -> Arc<ClassMetadata> {
        let entry = self
            .metadata
            .entry(class_name.to_owned())
            .or_insert_with(|| Arc::new(metadata));
        Arc::clone(entry.value())
    }
}

/// External cache key of a class.
pub fn cache_key(class_name: &str) -> String {
    format!("{CACHE_PREFIX}{class_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::cache::{CacheError, CacheResult, LruMetadataCache};
    use crate::metadata::FieldMetadata;
    use crate::reflect::{
        ClassDescriptor, DeclaredType, Object, PropertyDescriptor, TypeRef,
    };
    use crate::value::FieldValue;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, Default)]
    struct Item;

    impl Object for Item {
        fn class_name(&self) -> &str {
            "test::Item"
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
        fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
            self
        }
        fn clone_object(&self) -> Box<dyn Object> {
            Box::new(self.clone())
        }
    }

    fn types() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register_class(
            ClassDescriptor::new("test::Item")
                .with_constructor(|| Box::new(Item))
                .with_property(
                    PropertyDescriptor::new("id", DeclaredType::of(TypeRef::Int))
                        .with_annotation(Annotation::new())
                        .with_get_hook(|_| Ok(FieldValue::Int(1)))
                        .with_set_hook(|_, _| Ok(())),
                ),
        );
        types.register_class(ClassDescriptor::new("test::ItemProxy").proxy_for("test::Item"));
        types
    }

    /// A cache whose every operation fails.
    struct BrokenCache;

    impl MetadataCache for BrokenCache {
        fn get_item(&self, _key: &str) -> CacheResult<CacheItem> {
            Err(CacheError::Backend("connection refused".into()))
        }

        fn save(&self, _item: CacheItem) -> CacheResult<()> {
            Err(CacheError::Backend("connection refused".into()))
        }
    }

    /// A cache recording saved keys.
    #[derive(Default)]
    struct RecordingCache {
        saved: Mutex<Vec<String>>,
    }

    impl MetadataCache for RecordingCache {
        fn get_item(&self, key: &str) -> CacheResult<CacheItem> {
            Ok(CacheItem::miss(key))
        }

        fn save(&self, item: CacheItem) -> CacheResult<()> {
            self.saved.lock().unwrap().push(item.key().to_string());
            Ok(())
        }
    }

    #[test]
    fn test_builds_once() {
        let registry = MetadataRegistry::default();
        let types = types();
        let first = registry.get(&types, "test::Item").unwrap();
        let second = registry.get(&types, "test::Item").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_proxy_resolves_to_real_class() {
        let cache = Arc::new(RecordingCache::default());
        let registry = MetadataRegistry::new(MetadataFactory::default(), cache.clone());
        let types = types();

        let metadata = registry.get(&types, "test::ItemProxy").unwrap();
        assert!(metadata.contains_key("id"));
        assert!(registry.is_loaded("test::Item"));
        assert!(!registry.is_loaded("test::ItemProxy"));
        let saved = cache.saved.lock().unwrap();
        assert_eq!(*saved, vec!["fieldmap_ser_test::Item"]);
    }

    #[test]
    fn test_unknown_class() {
        let error = MetadataRegistry::default()
            .get(&TypeRegistry::new(), "test::Missing")
            .unwrap_err();
        assert!(error.is_configuration());
        assert_eq!(
            error.to_string(),
            "Cannot create reflection for test::Missing"
        );
    }

    #[test]
    fn test_loads_from_external_cache() {
        let cache = Arc::new(LruMetadataCache::default());
        let mut cached = ClassMetadata::new();
        cached.insert(
            "fromCache".into(),
            FieldMetadata::new(TypeRef::String, "get_from_cache"),
        );
        let json = serde_json::to_string(&cached).unwrap();
        let item = CacheItem::hit(cache_key("test::Item"), json);
        cache.save(item).unwrap();

        let registry = MetadataRegistry::new(MetadataFactory::default(), cache);
        let metadata = registry.get(&types(), "test::Item").unwrap();
        assert_eq!(*metadata, cached);
    }

    #[test]
    fn test_shared_cache_between_registries() {
        let cache = Arc::new(LruMetadataCache::default());
        let types = types();

        let first = MetadataRegistry::new(MetadataFactory::default(), cache.clone());
        let built = first.get(&types, "test::Item").unwrap();
        assert_eq!(cache.len(), 1);

        let second = MetadataRegistry::new(MetadataFactory::default(), cache);
        assert_eq!(second.get(&types, "test::Item").unwrap(), built);
    }

    #[test]
    #[traced_test]
    fn test_cache_failures_are_logged() {
        let registry = MetadataRegistry::new(MetadataFactory::default(), Arc::new(BrokenCache));
        let metadata = registry.get(&types(), "test::Item").unwrap();
        assert_eq!(metadata.len(), 1);
        assert!(logs_contain(
            "Unable to cache Serializer metadata: Cache backend error: connection refused"
        ));
    }

    #[test]
    #[traced_test]
    fn test_undecodable_cache_entry_is_rebuilt() {
        let cache = Arc::new(LruMetadataCache::default());
        cache
            .save(CacheItem::hit(cache_key("test::Item"), "not json"))
            .unwrap();

        let registry = MetadataRegistry::new(MetadataFactory::default(), cache);
        let metadata = registry.get(&types(), "test::Item").unwrap();
        assert!(metadata.contains_key("id"));
        assert!(logs_contain("Unable to cache Serializer metadata"));
    }
}
