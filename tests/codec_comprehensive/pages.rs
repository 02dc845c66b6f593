//! Page Tests
//!
//! `@set` pages with and without cursors, unmaterialized sets, and pages of
//! documents and records.

use crate::*;

#[test]
fn test_page_with_cursor() {
    let serializer = Serializer::new();
    let page: Page<i32> = serializer
        .decode(br#"{"@set":{"data":[{"@int":"1"},{"@int":"2"}],"after":"cursor1"}}"#)
        .expect("decode should succeed");
    assert_eq!(page.data, vec![1, 2]);
    assert_eq!(page.after.as_deref(), Some("cursor1"));
    assert!(!page.is_last());
}

#[test]
fn test_last_page_omits_after() {
    let page: Page<i32> = assert_round_trip(r#"{"@set":{"data":[{"@int":"1"}]}}"#);
    assert_eq!(page.after, None);
    assert!(page.is_last());
}

#[test]
fn test_cursor_round_trip() {
    let page: Page<String> = assert_round_trip(r#"{"@set":{"data":["a","b"],"after":"next"}}"#);
    assert_eq!(page.data.len(), 2);
}

#[test]
fn test_unmaterialized_set() {
    let serializer = Serializer::new();
    let page: Page<Document> = serializer
        .decode(br#"{"@set":"hdW..."}"#)
        .expect("decode should succeed");
    assert!(page.data.is_empty());
    assert_eq!(page.after.as_deref(), Some("hdW..."));
}

#[test]
fn test_page_of_records() {
    let serializer = Serializer::new();
    let page: Page<NullableDocument<Product>> = serializer
        .decode(br#"{"@set":{"data":[{"@doc":{"id":"1","coll":{"@mod":"Product"},"ts":{"@time":"2023-12-03T14:52:10Z"},"name":"a"}},{"@ref":{"id":"2","coll":{"@mod":"Product"},"exists":false}}],"after":null}}"#)
        .expect("decode should succeed");
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].as_present().map(|p| p.name.as_str()), Some("a"));
    assert!(page.data[1].as_null().is_some());
    assert_eq!(page.after, None);
}

#[test]
fn test_dynamic_page() {
    let serializer = Serializer::new();
    let value: Value = serializer
        .decode(br#"{"@set":{"data":[{"@long":"1"}],"after":"c"}}"#)
        .expect("decode should succeed");
    assert_eq!(value, Value::Page(Page::new(vec![Value::Long(1)], Some("c".into()))));
}

#[test]
fn test_array_is_not_a_page() {
    let serializer = Serializer::new();
    assert!(serializer.decode::<Page<i32>>(b"[]").unwrap_err().is_malformed());
}
