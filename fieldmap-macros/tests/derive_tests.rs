//! Integration tests for `#[derive(Serializable)]` and `#[reflect_methods]`.
//!
//! These tests run the generated impls through a real `Serializer`.

use chrono::{DateTime, TimeZone, Utc};
use fieldmap::{
    reflect_methods, Collection, FieldValue, Object, Reflect, Serializable, SerializableEnum,
    Serializer, ToFieldValue, TypeRef,
};
use proptest::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serializable)]
#[fieldmap(class = "app::Place")]
enum Place {
    #[default]
    #[fieldmap(value = "first")]
    First,
    #[fieldmap(value = "second")]
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serializable)]
#[fieldmap(class = "app::Color")]
enum Color {
    Red,
    Blue,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serializable)]
enum Level {
    #[fieldmap(value = 1)]
    Low,
    #[fieldmap(value = 10)]
    High,
}

/// An example entity.
#[derive(Debug, Clone, Default, PartialEq, Serializable)]
#[fieldmap(class = "app::Example")]
struct Example {
    /// Identifier.
    #[serialize]
    id: i64,
    #[serialize]
    name: String,
    #[serialize(name = "createdAt", type = r"Y-m-d\TH:i:s\Z")]
    created_at: Option<DateTime<Utc>>,
    #[serialize]
    place: Option<Place>,
    #[serialize]
    color: Option<Color>,
    cache: Vec<u8>,
}

fn example() -> Example {
    Example {
        id: 1,
        name: "Test name".into(),
        created_at: Some(Utc.with_ymd_and_hms(2023, 12, 31, 12, 34, 56).unwrap()),
        place: Some(Place::First),
        color: Some(Color::Red),
        cache: vec![1, 2, 3],
    }
}

fn serializer() -> Serializer {
    Serializer::builder().register::<Example>().build()
}

// =============================================================================
// Struct Derive Tests
// =============================================================================

#[test]
fn test_serialize_example() {
    let json = serializer().serialize(&example()).unwrap();
    assert_eq!(
        json,
        r#"{"id":1,"name":"Test name","createdAt":"2023-12-31T12:34:56Z","place":"first","color":"Red"}"#
    );
}

#[test]
fn test_deserialize_example() {
    let json = r#"{"id":1,"name":"Test name","createdAt":"2023-12-31T12:34:56Z","place":"first","color":"Red"}"#;
    let parsed: Example = serializer().deserialize(json).unwrap();
    let expected = Example {
        cache: Vec::new(),
        ..example()
    };
    assert_eq!(parsed, expected);
}

#[test]
fn test_missing_and_null_fields_keep_defaults() {
    let parsed: Example = serializer()
        .deserialize(r#"{"id":7,"createdAt":null,"unknown":true}"#)
        .unwrap();
    assert_eq!(parsed.id, 7);
    assert_eq!(parsed.name, "");
    assert_eq!(parsed.created_at, None);
    assert_eq!(parsed.place, None);
}

#[test]
fn test_invalid_date_message() {
    let err = serializer()
        .deserialize::<Example>(r#"{"createdAt":"31.12.2023"}"#)
        .unwrap_err();
    assert!(err.is_deserialization());
    assert_eq!(
        err.message(),
        r#"Unable to create DateTime from format "Y-m-d\TH:i:s\Z" with value "31.12.2023"."#
    );
}

#[test]
fn test_invalid_enum_message() {
    let err = serializer()
        .deserialize::<Example>(r#"{"color":"Purple"}"#)
        .unwrap_err();
    assert_eq!(
        err.message(),
        r#"Cannot deserialize value "Purple" into a UnitEnum. Possible options are: "Red", "Blue", "Green"."#
    );
}

#[test]
fn test_generated_descriptor() {
    let descriptor = Example::descriptor();
    assert_eq!(descriptor.name(), "app::Example");
    assert_eq!(descriptor.description(), Some("An example entity."));
    assert!(descriptor.constructor().is_some());

    let names: Vec<_> = descriptor
        .properties()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["id", "name", "created_at", "place", "color"]);

    let id = descriptor.property("id").unwrap();
    assert_eq!(id.description.as_deref(), Some("Identifier."));
    assert_eq!(id.declared.resolved(), TypeRef::Int);
    assert!(id.hooks.is_some());

    let created_at = descriptor.property("created_at").unwrap();
    assert!(created_at.declared.allows_null());
    let annotation = created_at.annotation.as_ref().unwrap();
    assert_eq!(annotation.serialized_name.as_deref(), Some("createdAt"));
}

#[test]
fn test_default_class_name_uses_module_path() {
    #[derive(Debug, Clone, Default, Serializable)]
    struct Untitled {
        #[serialize]
        id: i64,
    }

    assert_eq!(
        <Untitled as Serializable>::CLASS,
        concat!(module_path!(), "::Untitled")
    );
    assert_eq!(Untitled::default().class_name(), Untitled::CLASS);
}

#[test]
fn test_to_and_from_field_value() {
    let value = example().to_field_value().unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.class_name(), "app::Example");

    let back = <Example as fieldmap::FromFieldValue>::from_field_value(value).unwrap();
    assert_eq!(back, example());

    let err = <Example as fieldmap::FromFieldValue>::from_field_value(FieldValue::Int(1))
        .unwrap_err();
    assert_eq!(err.message(), "Expected app::Example, found int");
}

#[derive(Debug, Clone, Default, Serializable)]
#[fieldmap(class = "app::Counter")]
struct Counter {
    #[serialize]
    hits: u64,
}

#[test]
fn test_unsigned_overflow_fails_to_serialize() {
    let serializer = Serializer::builder().register::<Counter>().build();
    let fits = Counter {
        hits: i64::MAX as u64,
    };
    assert_eq!(
        serializer.serialize(&fits).unwrap(),
        format!(r#"{{"hits":{}}}"#, i64::MAX)
    );

    let err = serializer
        .serialize(&Counter { hits: u64::MAX })
        .unwrap_err();
    assert_eq!(err.kind(), fieldmap::ErrorKind::Serializer);
    assert_eq!(
        err.message(),
        format!("Integer {} out of range for int", u64::MAX)
    );
}

// =============================================================================
// Enum Derive Tests
// =============================================================================

#[test]
fn test_enum_descriptors() {
    let color = Color::enum_descriptor();
    assert_eq!(color.name(), "app::Color");
    assert!(!color.is_backed());
    assert_eq!(color.cases().len(), 3);

    let place = Place::enum_descriptor();
    assert!(place.is_backed());
    let second = place.case_by_name("Second").unwrap();
    assert_eq!(second.backing, Some("second".into()));

    let level = Level::enum_descriptor();
    let high = level.case_by_name("High").unwrap();
    assert_eq!(high.backing, Some(10_i64.into()));
    assert_eq!(Level::ENUM, concat!(module_path!(), "::Level"));
}

#[test]
fn test_enum_field_values() {
    let FieldValue::Enum(value) = Place::Second.to_field_value().unwrap() else {
        panic!("expected an enum value");
    };
    assert_eq!(value.case, "Second");
    assert_eq!(value.type_name, "app::Place");

    let blue = Color::Blue.to_field_value().unwrap();
    let back = <Color as fieldmap::FromFieldValue>::from_field_value(blue).unwrap();
    assert_eq!(back, Color::Blue);
    assert_eq!(
        <Color as Reflect>::declared_type().resolved(),
        TypeRef::Enum("app::Color".into())
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serializable)]
#[fieldmap(class = "app::Stage")]
enum Stage {
    #[fieldmap(value = "first")]
    First,
    #[fieldmap(value = "second")]
    Second,
    #[fieldmap(value = "third")]
    Third,
}

#[derive(Debug, Clone, Default, Serializable)]
#[fieldmap(class = "app::Step")]
struct Step {
    #[serialize]
    stage: Option<Stage>,
}

#[test]
fn test_invalid_backed_enum_lists_every_value() {
    let serializer = Serializer::builder().register::<Step>().build();
    let step: Step = serializer.deserialize(r#"{"stage":"third"}"#).unwrap();
    assert_eq!(step.stage, Some(Stage::Third));

    let err = serializer
        .deserialize::<Step>(r#"{"stage":"nonexistent"}"#)
        .unwrap_err();
    assert!(err.is_deserialization());
    assert_eq!(
        err.message(),
        r#"Cannot deserialize value "nonexistent" into a BackedEnum. Possible options are: "first", "second", "third"."#
    );
}

// =============================================================================
// Nested Objects
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serializable)]
#[fieldmap(class = "app::Tag")]
struct Tag {
    #[serialize]
    label: String,
    #[serialize]
    position: i64,
}

#[derive(Debug, Clone, Default, Serializable)]
#[fieldmap(class = "app::Book")]
struct Book {
    #[serialize]
    title: String,
}

#[derive(Debug, Clone, Default, Serializable)]
#[fieldmap(class = "app::Ebook")]
struct Ebook {
    #[serialize]
    title: String,
    #[serialize]
    url: String,
}

#[derive(Debug, Clone, Default, Serializable)]
#[fieldmap(class = "app::Shelf")]
struct Shelf {
    #[serialize]
    main: Option<Tag>,
    #[serialize]
    tags: Vec<Tag>,
    #[serialize(order_by(position = "desc"))]
    ordered: Collection<Tag>,
    #[serialize(type = "app::Book", discriminator_map(ebook = "app::Ebook"))]
    items: Vec<Box<dyn Object>>,
}

fn tag(label: &str, position: i64) -> Tag {
    Tag {
        label: label.to_owned(),
        position,
    }
}

fn shelf_serializer() -> Serializer {
    Serializer::builder()
        .register::<Shelf>()
        .register::<Book>()
        .register::<Ebook>()
        .build()
}

#[test]
fn test_nested_types_are_registered() {
    let serializer = shelf_serializer();
    let types = serializer.engine().types();
    assert!(types.contains_class("app::Shelf"));
    assert!(types.contains_class("app::Tag"));
    assert!(types.missing_references().is_empty());
}

#[test]
fn test_nested_round_trip() {
    let serializer = shelf_serializer();
    let json = r#"{"main":{"label":"a","position":1},"tags":[{"label":"b","position":2}],"ordered":[],"items":[]}"#;

    let shelf: Shelf = serializer.deserialize(json).unwrap();
    assert_eq!(shelf.main, Some(tag("a", 1)));
    assert_eq!(shelf.tags, vec![tag("b", 2)]);
    assert_eq!(serializer.serialize(&shelf).unwrap(), json);
}

#[test]
fn test_collection_is_ordered_on_output() {
    let shelf = Shelf {
        ordered: vec![tag("low", 1), tag("high", 3), tag("mid", 2)].into(),
        ..Shelf::default()
    };

    let value = shelf_serializer().to_array(&shelf).unwrap();
    let labels: Vec<_> = value["ordered"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["label"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(labels, vec!["high", "mid", "low"]);
}

#[test]
fn test_discriminator_picks_item_class() {
    let serializer = shelf_serializer();
    let shelf: Shelf = serializer
        .deserialize(
            r#"{"items":[{"title":"Paper"},{"discriminator":"ebook","title":"Pixels","url":"https://x"}]}"#,
        )
        .unwrap();

    let classes: Vec<_> = shelf.items.iter().map(|item| item.class_name()).collect();
    assert_eq!(classes, vec!["app::Book", "app::Ebook"]);
    insta::assert_snapshot!(
        serde_json::to_string(&serializer.to_array(&shelf).unwrap()["items"]).unwrap(),
        @r#"[{"title":"Paper"},{"title":"Pixels","url":"https://x"}]"#
    );
}

#[derive(Debug, Clone, Default, Serializable)]
#[fieldmap(class = "app::Crate")]
struct Crate {
    #[serialize(discriminator_map(ebook = "app::Ebook"))]
    items: Vec<Box<dyn Object>>,
    #[serialize(discriminator_map(ebook = "app::Ebook"))]
    featured: Option<Book>,
}

#[test]
fn test_unmapped_discriminator_skips_custom_type() {
    let err = shelf_serializer()
        .deserialize::<Shelf>(r#"{"items":[{"discriminator":"paper","title":"x"}]}"#)
        .unwrap_err();
    assert!(err.is_resolution());
    assert_eq!(err.message(), r#"Unable to resolve class "array""#);
}

#[test]
fn test_unmapped_discriminator_uses_declared_type() {
    let serializer = Serializer::builder().register::<Crate>().build();

    let err = serializer
        .deserialize::<Crate>(r#"{"items":[{"discriminator":"paper","title":"x"}]}"#)
        .unwrap_err();
    assert!(err.is_resolution());
    assert_eq!(err.message(), r#"Unable to resolve class "array""#);

    let parsed: Crate = serializer
        .deserialize(r#"{"featured":{"discriminator":"paper","title":"Paper"}}"#)
        .unwrap();
    assert_eq!(
        parsed.featured.map(|book| book.title),
        Some("Paper".to_owned())
    );
}

// =============================================================================
// Method Reflection
// =============================================================================

#[derive(Debug, Clone, Default, Serializable)]
#[fieldmap(class = "app::Person", methods)]
struct Person {
    #[serialize]
    first: String,
    #[serialize]
    last: String,
}

#[reflect_methods]
impl Person {
    /// Given and family name.
    #[serialize]
    pub fn get_full_name(&self) -> String {
        format!("{} {}", self.first, self.last)
    }

    #[serialize(name = "initial")]
    pub fn get_initial(&self) -> Option<String> {
        self.first.chars().next().map(String::from)
    }

    pub fn shout(&self) -> String {
        self.first.to_uppercase()
    }
}

#[test]
fn test_method_fields_are_read_only() {
    let serializer = Serializer::builder().register::<Person>().build();
    let person = Person {
        first: "Ada".into(),
        last: "Lovelace".into(),
    };

    assert_eq!(
        serializer.serialize(&person).unwrap(),
        r#"{"first":"Ada","last":"Lovelace","fullName":"Ada Lovelace","initial":"A"}"#
    );

    let back: Person = serializer
        .deserialize(r#"{"first":"Grace","last":"Hopper","fullName":"ignored"}"#)
        .unwrap();
    assert_eq!(back.get_full_name(), "Grace Hopper");
    assert_eq!(back.shout(), "GRACE");
}

#[test]
fn test_method_descriptors() {
    let descriptor = Person::descriptor();
    let full_name = descriptor.method("get_full_name").unwrap();
    assert!(full_name.is_public());
    assert!(full_name.annotation.is_some());
    assert_eq!(
        full_name.description.as_deref(),
        Some("Given and family name.")
    );

    assert!(descriptor.method("shout").is_none());
}

#[derive(Debug, Clone, Default, Serializable)]
#[fieldmap(class = "app::Account", accessors)]
struct Account {
    #[serialize]
    balance: i64,
    #[serialize]
    active: bool,
    writes: u32,
}

#[reflect_methods]
impl Account {
    fn get_balance(&self) -> i64 {
        self.balance
    }

    fn set_balance(&mut self, balance: i64) {
        self.writes += 1;
        self.balance = balance;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.writes += 1;
        self.active = active;
    }
}

#[test]
fn test_accessor_pair_mode() {
    let serializer = Serializer::builder().register::<Account>().build();
    let account: Account = serializer
        .deserialize(r#"{"balance":250,"active":true}"#)
        .unwrap();
    assert_eq!(account.balance, 250);
    assert!(account.active);
    assert_eq!(account.writes, 2);

    let metadata = serializer.engine().metadata("app::Account").unwrap();
    assert_eq!(metadata["active"].accessor, "is_active");
    assert!(metadata["balance"].uses_accessor_pair);
    assert_eq!(
        serializer.serialize(&account).unwrap(),
        r#"{"balance":250,"active":true}"#
    );
}

// =============================================================================
// Property Tests
// =============================================================================

fn arb_example() -> impl Strategy<Value = Example> {
    let place = prop_oneof![Just(Place::First), Just(Place::Second)];
    let color = prop_oneof![Just(Color::Red), Just(Color::Blue), Just(Color::Green)];
    (
        any::<i64>(),
        "[a-zA-Z0-9 ]{0,20}",
        proptest::option::of(0_i64..4_000_000_000),
        proptest::option::of(place),
        proptest::option::of(color),
    )
        .prop_map(|(id, name, seconds, place, color)| Example {
            id,
            name,
            created_at: seconds.and_then(|seconds| Utc.timestamp_opt(seconds, 0).single()),
            place,
            color,
            cache: Vec::new(),
        })
}

proptest! {
    /// Property: serializing then deserializing yields the same example.
    #[test]
    fn prop_example_round_trip(example in arb_example()) {
        let serializer = serializer();
        let json = serializer.serialize(&example).unwrap();
        let back: Example = serializer.deserialize(&json).unwrap();
        prop_assert_eq!(back, example);
    }
}
