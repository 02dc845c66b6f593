//! Document Tests
//!
//! Variant classification of `@doc`/`@ref` runs, tombstone handling for
//! nullable and non-nullable targets, and collection mappings.

use crate::*;
use tessera::{DocumentRef, Error, MappedDocument};

const TOMBSTONE: &[u8] =
    br#"{"@ref":{"id":"123","coll":{"@mod":"Foo"},"exists":false,"cause":"not found"}}"#;

const DOC: &[u8] = br#"{"@doc":{"id":"1","coll":{"@mod":"Foo"},"ts":{"@time":"2023-12-03T14:52:10.0000000Z"},"color":"red"}}"#;

// =============================================================================
// CLASSIFICATION
// =============================================================================

#[test]
fn test_document() {
    let serializer = Serializer::new();
    let doc: Document = serializer.decode(DOC).expect("decode should succeed");
    assert_eq!(doc.id, "1");
    assert_eq!(doc.coll, Module::new("Foo"));
    assert_eq!(doc.get("color"), Some(&Value::String("red".into())));
}

#[test]
fn test_named_document() {
    let serializer = Serializer::new();
    let value: Value = serializer
        .decode(br#"{"@doc":{"name":"Users","coll":{"@mod":"Collection"},"ts":{"@time":"2023-12-03T14:52:10Z"},"indexes":{}}}"#)
        .expect("decode should succeed");
    let Value::NamedDocument(doc) = value else {
        panic!("expected named document, got {:?}", value);
    };
    assert_eq!(doc.name, "Users");
    assert!(doc.data.contains_key("indexes"));
}

#[test]
fn test_refs() {
    let serializer = Serializer::new();
    let r: DocumentRef = serializer
        .decode(br#"{"@ref":{"id":"9","coll":{"@mod":"Foo"}}}"#)
        .expect("decode should succeed");
    assert_eq!(r.id, "9");

    let named: NamedDocumentRef = serializer
        .decode(br#"{"@ref":{"name":"byName","coll":{"@mod":"Function"}}}"#)
        .expect("decode should succeed");
    assert_eq!(named.coll.name(), "Function");
}

#[test]
fn test_documents_encode_as_refs() {
    let serializer = Serializer::new();
    let doc: Document = serializer.decode(DOC).expect("decode should succeed");
    assert_eq!(
        serializer.encode(&doc).expect("encode should succeed"),
        r#"{"@ref":{"id":"1","coll":{"@mod":"Foo"}}}"#
    );
}

#[test]
fn test_unclassifiable_run_is_raw_map() {
    init_tracing();
    let serializer = Serializer::new();
    let value: Value = serializer
        .decode(br#"{"@doc":{"coll":{"@mod":"Foo"},"extra":1}}"#)
        .expect("unknown shapes should not fail");
    let map = value.as_object().expect("expected raw map");
    assert_eq!(map.get("coll"), Some(&Value::Module(Module::new("Foo"))));
    assert_eq!(map.get("extra"), Some(&Value::Int(1)));
}

// =============================================================================
// TOMBSTONES
// =============================================================================

#[test]
fn test_tombstone_into_nullable_document() {
    let serializer = Serializer::new();
    let doc: NullableDocument<Document> =
        serializer.decode(TOMBSTONE).expect("decode should succeed");
    let null = doc.as_null().expect("expected tombstone");
    assert_eq!(null.id(), Some("123"));
    assert_eq!(null.coll.name(), "Foo");
    assert_eq!(null.cause, "not found");
}

#[test]
fn test_tombstone_into_document_is_null_document_error() {
    let serializer = Serializer::new();
    let err = serializer.decode::<Document>(TOMBSTONE).unwrap_err();
    let Error::NullDocument(null) = err else {
        panic!("expected null document error, got {:?}", err);
    };
    assert_eq!(null.identity, Identity::Id("123".into()));
}

#[test]
fn test_tombstone_into_option() {
    let serializer = Serializer::new();
    let doc: Option<DocumentRef> = serializer.decode(TOMBSTONE).expect("decode should succeed");
    assert!(doc.is_none());
}

#[test]
fn test_tombstone_field_order() {
    let serializer = Serializer::new();
    let doc: NullableDocument<DocumentRef> = serializer
        .decode(br#"{"@ref":{"exists":false,"cause":"deleted","coll":{"@mod":"Foo"},"id":"5"}}"#)
        .expect("decode should succeed");
    assert_eq!(doc.as_null().map(|n| n.cause.as_str()), Some("deleted"));
}

#[test]
fn test_tombstone_in_list() {
    let serializer = Serializer::new();
    let wire = format!(
        "[{},{}]",
        std::str::from_utf8(DOC).unwrap(),
        std::str::from_utf8(TOMBSTONE).unwrap()
    );
    let docs: Vec<NullableDocument<Document>> = serializer
        .decode(wire.as_bytes())
        .expect("decode should succeed");
    assert!(docs[0].is_present());
    assert!(!docs[1].is_present());
}

// =============================================================================
// COLLECTION MAPPINGS
// =============================================================================

#[test]
fn test_mapped_collection_decodes_as_record() {
    init_tracing();
    let serializer = Serializer::builder()
        .collection::<Product>()
        .build()
        .expect("build should succeed");
    let value: Value = serializer
        .decode(br#"{"@doc":{"id":"7","coll":{"@mod":"Product"},"ts":{"@time":"2023-12-03T14:52:10Z"},"name":"lamp","quantity":{"@long":"3"},"price":{"@double":"9.5"},"tags":["home"]}}"#)
        .expect("decode should succeed");
    let Value::Mapped(mapped) = value else {
        panic!("expected mapped document, got {:?}", value);
    };
    let product = mapped.downcast_ref::<Product>().expect("record type");
    assert_eq!(product.id.as_deref(), Some("7"));
    assert_eq!(product.coll, Some(Module::new("Product")));
    assert_eq!(product.quantity, 3);
    assert_eq!(product.tags, vec!["home".to_string()]);
}

#[test]
fn test_mapped_collection_encodes_as_ref() {
    let serializer = Serializer::builder()
        .collection::<Product>()
        .build()
        .expect("build should succeed");
    let value = Value::Mapped(MappedDocument::new(
        Module::new("Product"),
        Some(Identity::Id("7".into())),
        Product::default(),
    ));
    assert_eq!(
        serializer.encode(&value).expect("encode should succeed"),
        r#"{"@ref":{"id":"7","coll":{"@mod":"Product"}}}"#
    );
}

#[test]
fn test_other_collections_stay_generic() {
    let serializer = Serializer::builder()
        .collection::<Product>()
        .build()
        .expect("build should succeed");
    let value: Value = serializer.decode(DOC).expect("decode should succeed");
    assert!(matches!(value, Value::Document(_)));
}

#[test]
fn test_mapped_collection_tombstone() {
    let serializer = Serializer::builder()
        .collection::<Product>()
        .build()
        .expect("build should succeed");
    let value: Value = serializer
        .decode(br#"{"@ref":{"id":"7","coll":{"@mod":"Product"},"exists":false,"cause":"not found"}}"#)
        .expect("decode should succeed");
    assert!(matches!(value, Value::NullDocument(ref n) if n.id() == Some("7")));
}

#[test]
fn test_duplicate_collection_mapping_fails() {
    let err = Serializer::builder()
        .collection::<Product>()
        .collection::<Product>()
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Registration(_)));
}
