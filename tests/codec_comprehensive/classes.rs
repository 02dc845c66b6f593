//! Class Codec Tests
//!
//! User records: declared field tables, forward compatibility with unknown
//! fields, declared wire-type hints and server-owned identity fields.

use crate::*;
use chrono::{DateTime, TimeZone, Utc};

/// A record whose id is client-assigned and therefore written back
#[derive(Debug, Default, PartialEq)]
struct Order {
    id: String,
    items: Vec<Product>,
    note: Option<String>,
    totals: HashMap<String, f64>,
}

impl Record for Order {
    fn descriptor() -> ClassDescriptor<Self> {
        ClassDescriptor::<Self>::new("Order")
            .id(|o| &o.id, |o, v| o.id = v)
            .field("items", |o| &o.items, |o, v| o.items = v)
            .field("note", |o| &o.note, |o, v| o.note = v)
            .field("totals", |o| &o.totals, |o, v| o.totals = v)
    }
}

record!(Order);

/// A record whose data fields reuse document protocol names
#[derive(Debug, Default, Clone, PartialEq)]
struct Reading {
    name: String,
    exists: bool,
    cause: Option<String>,
    ts: Option<DateTime<Utc>>,
    value: f64,
}

impl Record for Reading {
    fn descriptor() -> ClassDescriptor<Self> {
        ClassDescriptor::<Self>::new("Reading")
            .field("name", |r| &r.name, |r, v| r.name = v)
            .field("exists", |r| &r.exists, |r, v| r.exists = v)
            .field("cause", |r| &r.cause, |r, v| r.cause = v)
            .field("ts", |r| &r.ts, |r, v| r.ts = v)
            .field("value", |r| &r.value, |r, v| r.value = v)
    }
}

record!(Reading);

const READING_WIRE: &str = r#"{"name":"sensor-a","exists":false,"cause":"offline","ts":{"@time":"2023-12-03T14:52:10.0000000Z"},"value":{"@double":"2.5"}}"#;

fn lamp() -> Product {
    Product {
        id: Some("7".into()),
        coll: Some(Module::new("Product")),
        name: "lamp".into(),
        quantity: 3,
        price: 9.5,
        tags: vec!["home".into()],
    }
}

// =============================================================================
// ENCODE
// =============================================================================

#[test]
fn test_server_fields_are_not_written() {
    let serializer = Serializer::new();
    assert_eq!(
        serializer.encode(&lamp()).expect("encode should succeed"),
        r#"{"name":"lamp","quantity":{"@long":"3"},"price":{"@double":"9.5"},"tags":["home"]}"#
    );
}

#[test]
fn test_client_id_is_written() {
    let serializer = Serializer::new();
    let order = Order {
        id: "o-1".into(),
        ..Order::default()
    };
    assert_eq!(
        serializer.encode(&order).expect("encode should succeed"),
        r#"{"id":"o-1","items":[],"note":null,"totals":{}}"#
    );
}

// =============================================================================
// DECODE
// =============================================================================

#[test]
fn test_unknown_field_is_skipped() {
    init_tracing();
    let serializer = Serializer::new();
    let product: Product = serializer
        .decode(br#"{"name":"lamp","extra_field":1,"nested_extra":{"@doc":{"a":[1,{"b":2}]}},"quantity":{"@int":"3"}}"#)
        .expect("unknown fields should not fail decode");
    assert_eq!(product.name, "lamp");
    assert_eq!(product.quantity, 3);
    assert!(product.tags.is_empty());
}

#[test]
fn test_document_populates_identity() {
    let serializer = Serializer::new();
    let product: Product = serializer
        .decode(br#"{"@doc":{"id":"7","coll":{"@mod":"Product"},"ts":{"@time":"2023-12-03T14:52:10Z"},"name":"lamp","quantity":{"@long":"3"},"price":{"@double":"9.5"},"tags":["home"]}}"#)
        .expect("decode should succeed");
    assert_eq!(product, lamp());
}

#[test]
fn test_nested_records_and_containers() {
    let serializer = Serializer::new();
    let wire = br#"{"id":"o-2","items":[{"name":"a","price":{"@double":"1"}},{"name":"b"}],"note":"rush","totals":{"net":{"@double":"1"}}}"#;
    let order: Order = serializer.decode(wire).expect("decode should succeed");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].price, 1.0);
    assert_eq!(order.note.as_deref(), Some("rush"));
    assert_eq!(order.totals.get("net"), Some(&1.0));
}

#[test]
fn test_record_tombstone() {
    let serializer = Serializer::new();
    let wire = br#"{"@ref":{"id":"7","coll":{"@mod":"Product"},"exists":false,"cause":"not found"}}"#;
    let product: NullableDocument<Product> =
        serializer.decode(wire).expect("decode should succeed");
    assert_eq!(product.as_null().and_then(|n| n.id()), Some("7"));
    assert!(serializer.decode::<Product>(wire).unwrap_err().null_document().is_some());
}

#[test]
fn test_declared_hint_accepts_widening_only() {
    let serializer = Serializer::new();
    let err = serializer
        .decode::<Product>(br#"{"quantity":{"@long":"9223372036854775807"}}"#)
        .unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_records_through_dynamic_values() {
    let serializer = Serializer::new();
    let value = serializer.to_value(&lamp()).expect("to_value should succeed");
    let map = value.as_object().expect("records become objects");
    assert_eq!(map.get("quantity"), Some(&Value::Long(3)));
    let back: Product = serializer.from_value(&value).expect("from_value should succeed");
    assert_eq!(back.name, "lamp");
    assert_eq!(back.id, None);
}

// =============================================================================
// PROTOCOL NAMES AS DATA
// =============================================================================

#[test]
fn test_protocol_named_fields_in_plain_object() {
    init_tracing();
    let serializer = Serializer::new();
    let reading: Reading = serializer
        .decode(READING_WIRE.as_bytes())
        .expect("a plain object is never a tombstone");
    assert_eq!(reading.name, "sensor-a");
    assert!(!reading.exists);
    assert_eq!(reading.cause.as_deref(), Some("offline"));
    assert_eq!(
        reading.ts,
        Some(Utc.with_ymd_and_hms(2023, 12, 3, 14, 52, 10).unwrap())
    );
    assert_eq!(serializer.encode(&reading).expect("encode should succeed"), READING_WIRE);
}

#[test]
fn test_protocol_named_fields_in_document() {
    let serializer = Serializer::new();
    let wire = br#"{"@doc":{"id":"r1","coll":{"@mod":"Reading"},"ts":{"@time":"2023-12-03T14:52:10.0000000Z"},"name":"sensor-a","exists":true,"cause":"offline","value":{"@double":"2.5"}}}"#;
    let reading: Reading = serializer.decode(wire).expect("decode should succeed");
    assert!(reading.exists);
    let expected = Reading {
        exists: false,
        ..reading.clone()
    };
    assert_eq!(
        serializer.encode(&expected).expect("encode should succeed"),
        READING_WIRE
    );
}

#[test]
fn test_protocol_named_document_fields_keep_their_type() {
    #[derive(Debug, Default)]
    struct Holder {
        name: Option<Document>,
        other: Option<Document>,
    }
    impl Record for Holder {
        fn descriptor() -> ClassDescriptor<Self> {
            ClassDescriptor::<Self>::new("Holder")
                .field("name", |h| &h.name, |h, v| h.name = v)
                .field("other", |h| &h.other, |h, v| h.other = v)
        }
    }
    record!(Holder);

    let serializer = Serializer::new();
    let doc = r#"{"@doc":{"id":"1","coll":{"@mod":"Users"},"ts":{"@time":"2023-12-03T14:52:10.0000000Z"},"age":{"@int":"4"}}}"#;
    let wire = format!(r#"{{"name":{},"other":{}}}"#, doc, doc);
    let holder: Holder = serializer
        .decode(wire.as_bytes())
        .expect("document-typed field named like a protocol field should decode");
    let name = holder.name.expect("name should be set");
    assert_eq!(name.id, "1");
    assert_eq!(name.get("age"), Some(&Value::Int(4)));
    assert_eq!(Some(name), holder.other);
}
