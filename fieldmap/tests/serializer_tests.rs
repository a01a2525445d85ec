//! End-to-end tests of the serializer with derived types.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use fieldmap::cache::{CacheError, CacheItem, CacheResult};
use fieldmap::handler::Description;
use fieldmap::{
    ClassDescriptor, EntityRepository, LruMetadataCache, MetadataCache, Object, OrderBy, Result,
    Serializable, Serializer, SerializerConfig,
};
use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing_test::traced_test;

// =============================================================================
// Fixtures
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, Default, PartialEq, Serializable)]
#[fieldmap(class = "app::User")]
struct User {
    /// Primary key.
    #[serialize]
    id: i64,
    #[serialize]
    name: String,
}

fn user(id: i64) -> User {
    User {
        id,
        name: format!("user-{id}"),
    }
}

#[derive(Debug, Clone, Default, Serializable)]
#[fieldmap(class = "app::Article")]
struct Article {
    #[serialize]
    id: i64,
    #[serialize(handler = "entity_id")]
    author: Option<User>,
    #[serialize(handler = "entity_id", type = "app::User")]
    reviewers: Vec<User>,
    #[serialize(handler = "array_string", type = "int")]
    ids: Vec<i64>,
    #[serialize]
    published: Option<DateTime<Utc>>,
    #[serialize(type_param = "stamp_format")]
    stamp: Option<DateTime<Utc>>,
    #[serialize(strategy = "kv")]
    labels: IndexMap<String, String>,
    #[serialize]
    aliases: IndexMap<String, String>,
}

/// Users 1 to 9 exist.
#[derive(Debug, Default)]
struct Users;

impl EntityRepository for Users {
    fn find(&self, class: &str, id: &Value) -> Result<Option<Box<dyn Object>>> {
        assert_eq!(class, "app::User");
        Ok(id
            .as_i64()
            .filter(|id| (1..10).contains(id))
            .map(|id| Box::new(user(id)) as Box<dyn Object>))
    }

    fn ordered_ids(&self, _class: &str, ids: &[Value], _order_by: &OrderBy) -> Result<Vec<Value>> {
        Ok(ids.to_vec())
    }
}

fn config() -> SerializerConfig {
    SerializerConfig::new()
        .with_date_format("Y-m-d")
        .with_parameter("stamp_format", "d.m.Y H:i")
}

fn serializer() -> Serializer {
    Serializer::builder()
        .with_config(config())
        .with_entity_repository(Arc::new(Users))
        .register::<Article>()
        .build()
}

fn article() -> Article {
    Article {
        id: 3,
        author: Some(user(7)),
        reviewers: vec![user(8), user(9)],
        ids: vec![1, 2, 3],
        published: Some(Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()),
        stamp: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()),
        labels: IndexMap::from([("lang".to_owned(), "en".to_owned())]),
        aliases: IndexMap::from([("short".to_owned(), "a".to_owned())]),
    }
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_serialize_article() {
    let value = serializer().to_array(&article()).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 3,
            "author": 7,
            "reviewers": [8, 9],
            "ids": "1,2,3",
            "published": "2024-02-29",
            "stamp": "01.03.2024 09:30",
            "labels": {"lang": "en"},
            "aliases": ["a"],
        })
    );
}

#[test]
fn test_empty_keyed_map_is_an_object() {
    let article = Article {
        labels: IndexMap::new(),
        ..Article::default()
    };
    let value = serializer().to_array(&article).unwrap();
    assert_eq!(value["labels"], json!({}));
    assert_eq!(value["aliases"], json!([]));
    assert_eq!(value["author"], Value::Null);
    assert_eq!(value["ids"], json!(""));
}

#[test]
fn test_deserialize_article() {
    let article: Article = serializer()
        .deserialize(
            r#"{
                "id": 4,
                "author": 2,
                "reviewers": [3, 404, 5],
                "ids": "10,20",
                "published": "2024-02-29",
                "stamp": "01.03.2024 09:30",
                "labels": {"lang": "de"}
            }"#,
        )
        .unwrap();

    assert_eq!(article.id, 4);
    assert_eq!(article.author, Some(user(2)));
    assert_eq!(article.reviewers, vec![user(3), user(5)]);
    assert_eq!(article.ids, vec![10, 20]);
    assert_eq!(
        article.published,
        Some(Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap())
    );
    assert_eq!(
        article.stamp,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())
    );
    assert_eq!(article.labels["lang"], "de");
}

#[test]
fn test_unknown_entity_becomes_none() {
    let article: Article = serializer().deserialize(r#"{"author":404}"#).unwrap();
    assert_eq!(article.author, None);
}

#[test]
fn test_entity_handler_requires_repository() {
    let serializer = Serializer::builder()
        .with_config(config())
        .register::<Article>()
        .build();
    let err = serializer.to_array(&article()).unwrap_err();
    assert!(err.is_resolution());
    assert_eq!(err.message(), r#"Unable to get handler "entity_id"."#);
}

#[test]
fn test_missing_type_param() {
    let serializer = Serializer::builder()
        .with_entity_repository(Arc::new(Users))
        .register::<Article>()
        .build();
    let err = serializer.to_array(&article()).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(
        err.message(),
        "The parameter `stamp_format` not found in `fieldmap.parameter_bag` configuration."
    );
}

#[test]
fn test_invalid_json() {
    let err = serializer()
        .deserialize::<Article>(r#"{id":1}"#)
        .unwrap_err();
    assert!(err.is_deserialization());
    assert_eq!(err.message(), "Cannot decode JSON string provided.");
}

// =============================================================================
// Iterables
// =============================================================================

#[test]
fn test_deserialize_iterable_into_vec() {
    let serializer = Serializer::builder().register::<User>().build();
    let users = serializer
        .deserialize_iterable::<User, _>(r#"[{"id":5,"name":"five"}]"#, vec![user(1), user(2)])
        .unwrap();
    let five = User {
        id: 5,
        name: "five".into(),
    };
    assert_eq!(users, vec![five, user(2)]);
}

#[test]
fn test_deserialize_iterable_into_map() {
    let serializer = Serializer::builder().register::<User>().build();
    let existing = IndexMap::from([("admin".to_owned(), user(1))]);
    let users = serializer
        .deserialize_iterable::<User, _>(r#"{"guest":{"id":2},"admin":{"id":3}}"#, existing)
        .unwrap();

    let ids: Vec<_> = users
        .iter()
        .map(|(key, user)| (key.as_str(), user.id))
        .collect();
    assert_eq!(ids, vec![("admin", 3), ("guest", 2)]);
}

#[test]
fn test_serialize_iter() {
    let serializer = Serializer::builder().register::<User>().build();
    let users = [user(1), user(2)];
    let json = serializer
        .serialize_iter(users.iter().map(|user| user as &dyn Object))
        .unwrap();
    assert_eq!(
        json,
        r#"[{"id":1,"name":"user-1"},{"id":2,"name":"user-2"}]"#
    );
}

// =============================================================================
// Proxies
// =============================================================================

#[test]
fn test_proxy_shares_metadata_with_real_class() {
    let serializer = Serializer::builder()
        .register::<User>()
        .register_class(ClassDescriptor::new("app::proxy::User").proxy_for(User::CLASS))
        .build();

    let real = serializer.engine().metadata("app::User").unwrap();
    let proxy = serializer.engine().metadata("app::proxy::User").unwrap();
    assert!(Arc::ptr_eq(&real, &proxy));
}

// =============================================================================
// Metadata Cache
// =============================================================================

#[test]
fn test_metadata_is_shared_through_cache() {
    let cache = Arc::new(LruMetadataCache::new(8));

    let first = Serializer::builder()
        .register::<User>()
        .with_metadata_cache(cache.clone())
        .build();
    first.serialize(&user(1)).unwrap();
    assert_eq!(cache.len(), 1);

    // No descriptor: metadata can only come from the cache.
    let second = Serializer::builder().with_metadata_cache(cache).build();
    let metadata = second.engine().metadata("app::User").unwrap();
    assert_eq!(metadata.keys().collect::<Vec<_>>(), vec!["id", "name"]);
}

#[derive(Debug, Default)]
struct BrokenCache {
    saved: Mutex<HashMap<String, String>>,
}

impl MetadataCache for BrokenCache {
    fn get_item(&self, key: &str) -> CacheResult<CacheItem> {
        let saved = self
            .saved
            .lock()
            .map_err(|e| CacheError::LockError(e.to_string()))?;
        match saved.get(key) {
            Some(_) => Ok(CacheItem::hit(key, "not json")),
            None => Err(CacheError::Backend("connection refused".into())),
        }
    }

    fn save(&self, item: CacheItem) -> CacheResult<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|e| CacheError::LockError(e.to_string()))?;
        saved.insert(item.key().to_owned(), String::new());
        Err(CacheError::Backend("read only".into()))
    }
}

#[test]
#[traced_test]
fn test_cache_failures_are_logged_not_raised() {
    let cache = Arc::new(BrokenCache::default());
    let serializer = Serializer::builder()
        .register::<User>()
        .with_metadata_cache(cache.clone())
        .build();
    assert_eq!(
        serializer.serialize(&user(1)).unwrap(),
        r#"{"id":1,"name":"user-1"}"#
    );
    assert!(logs_contain(
        "Unable to cache Serializer metadata: Cache backend error: connection refused"
    ));
    assert!(logs_contain("Unable to cache Serializer metadata: Cache backend error: read only"));

    // A corrupt entry is rebuilt from the descriptor.
    let again = Serializer::builder()
        .register::<User>()
        .with_metadata_cache(cache)
        .build();
    assert!(again.serialize(&user(2)).is_ok());
}

// =============================================================================
// Descriptions
// =============================================================================

#[test]
fn test_describe_article() {
    let serializer = serializer();
    let mut sink: Vec<Description> = Vec::new();
    serializer.describe("app::Article", &mut sink).unwrap();

    let by_name: IndexMap<_, _> = sink
        .into_iter()
        .map(|description| {
            let name = description["property"].as_str().unwrap_or_default();
            (name.to_owned(), description)
        })
        .collect();

    assert_eq!(by_name["author"]["type"], "integer");
    assert_eq!(by_name["author"]["title"], "User ID");
    assert_eq!(by_name["reviewers"]["title"], "User IDs");
    assert_eq!(
        by_name["ids"]["format"],
        "string, values separated by comma"
    );
    assert_eq!(
        by_name["published"]["format"],
        r#"date-time, format: "Y-m-d""#
    );
    assert_eq!(by_name["labels"]["type"], "object");
}

#[test]
fn test_user_schema() {
    let serializer = Serializer::builder().register::<User>().build();
    insta::assert_snapshot!(
        serde_json::to_string(&serializer.schema("app::User").unwrap()).unwrap(),
        @r#"{"type":"object","title":"User","description":"A registered user.","properties":{"id":{"property":"id","type":"integer","description":"Primary key."},"name":{"property":"name","type":"string"}}}"#
    );
}
