//! Escaping Tests
//!
//! Maps and records whose keys collide with a reserved tag are wrapped in
//! `@object`; the wrapper is transparent on the way back in.

use crate::*;
use proptest::prelude::*;

const TAGS: &[&str] = &[
    "@int", "@long", "@double", "@date", "@time", "@mod", "@doc", "@ref", "@set", "@object",
    "@bytes", "@stream",
];

#[test]
fn test_reserved_key_is_escaped() {
    let serializer = Serializer::new();
    let mut map = HashMap::new();
    map.insert("@int".to_string(), "not a number".to_string());
    let wire = serializer.encode(&map).expect("encode should succeed");
    assert_eq!(wire, r#"{"@object":{"@int":"not a number"}}"#);

    let back: HashMap<String, String> = serializer
        .decode(wire.as_bytes())
        .expect("decode should succeed");
    assert_eq!(back, map);
}

#[test]
fn test_escaped_map_decodes_as_plain_value_map() {
    let serializer = Serializer::new();
    let value: Value = serializer
        .decode(br#"{"@object":{"@int":{"@int":"5"}}}"#)
        .expect("decode should succeed");
    let map = value.as_object().expect("expected an object, not a scalar");
    assert_eq!(map.get("@int"), Some(&Value::Int(5)));
}

#[test]
fn test_unreserved_at_key_is_not_escaped() {
    let serializer = Serializer::new();
    let mut map = HashMap::new();
    map.insert("@handle".to_string(), 1i32);
    assert_eq!(
        serializer.encode(&map).expect("encode should succeed"),
        r#"{"@handle":{"@int":"1"}}"#
    );
}

#[test]
fn test_escaping_is_per_object() {
    let serializer = Serializer::new();
    let mut inner = HashMap::new();
    inner.insert("@ref".to_string(), Value::Null);
    let mut outer = HashMap::new();
    outer.insert("plain".to_string(), Value::Object(inner));
    let wire = serializer
        .encode(&Value::Object(outer))
        .expect("encode should succeed");
    assert_eq!(wire, r#"{"plain":{"@object":{"@ref":null}}}"#);
}

#[test]
fn test_every_tag_escapes() {
    let serializer = Serializer::new();
    for tag in TAGS {
        let mut map = HashMap::new();
        map.insert(tag.to_string(), true);
        let wire = serializer.encode(&map).expect("encode should succeed");
        let parsed = json(&wire);
        assert_eq!(parsed["@object"][*tag], true, "tag {} not escaped", tag);
    }
}

proptest! {
    #[test]
    fn prop_escaping_is_idempotent(
        keys in proptest::collection::vec(
            prop_oneof![
                proptest::sample::select(TAGS).prop_map(str::to_string),
                "[a-z@]{1,6}",
            ],
            0..6,
        )
    ) {
        let serializer = Serializer::new();
        let map: HashMap<String, i64> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i as i64))
            .collect();
        let first = serializer.encode(&map).unwrap();
        let back: HashMap<String, i64> = serializer.decode(first.as_bytes()).unwrap();
        prop_assert_eq!(&back, &map);
        prop_assert_eq!(serializer.encode(&back).unwrap(), first);
    }
}
