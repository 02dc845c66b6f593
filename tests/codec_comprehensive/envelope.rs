//! Envelope Tests
//!
//! Request bodies and both response outcomes, as the transport sends and
//! receives them.

use crate::*;
use tessera::QueryStats;

#[test]
fn test_request_with_nested_query_and_arguments() {
    let serializer = Serializer::new();
    let inner = Query::literal("Product.byName(").arg("lamp").lit(")");
    let query = Query::literal("let p = ").sub(inner).lit("\np.quantity");
    let mut filter = HashMap::new();
    filter.insert("@int".to_string(), Value::Bool(true));
    let request = QueryRequest::new(query)
        .argument("limit", 10i64)
        .argument("filter", filter);

    let body = serializer.encode_request(&request).expect("encode should succeed");
    let parsed = json(&body);
    assert_eq!(parsed["query"]["fql"][0], "let p = ");
    assert_eq!(parsed["query"]["fql"][1]["fql"][1]["value"], "lamp");
    assert_eq!(parsed["arguments"]["limit"]["@long"], "10");
    assert_eq!(parsed["arguments"]["filter"]["@object"]["@int"], true);
}

#[test]
fn test_success_with_records() {
    let serializer = Serializer::new();
    let body = br#"{
        "data": {"@set": {"data": [{"@doc": {"id": "1", "coll": {"@mod": "Product"}, "ts": {"@time": "2023-12-03T14:52:10Z"}, "name": "a", "unknown": 1}}], "after": "next"}},
        "static_type": "Set<Product>",
        "summary": "",
        "txn_ts": 1702346199930000,
        "stats": {"compute_ops": 1, "read_ops": 1, "write_ops": 0, "query_time_ms": 12, "contention_retries": 0, "storage_bytes_read": 210, "storage_bytes_write": 0, "rate_limits_hit": []},
        "schema_version": 1702346199930000,
        "query_tags": "",
        "new_field_from_the_future": [1, 2, 3]
    }"#;
    let response: QueryResponse<Page<Product>> =
        serializer.decode_response(body).expect("decode should succeed");
    let QueryResponse::Success(success) = response else {
        panic!("expected success");
    };
    assert_eq!(success.data.data[0].id.as_deref(), Some("1"));
    assert_eq!(success.data.after.as_deref(), Some("next"));
    assert_eq!(success.static_type.as_deref(), Some("Set<Product>"));
    assert_eq!(success.stats.storage_bytes_read, 210);
    assert!(success.query_tags.is_empty());
}

#[test]
fn test_failure() {
    let serializer = Serializer::new();
    let body = br#"{"error":{"code":"invalid_query","message":"bad","constraint_failures":[]},"summary":"error: bad","txn_ts":5,"stats":{"compute_ops":0},"query_tags":{"env":"ci"}}"#;
    let response: QueryResponse<Value> =
        serializer.decode_response(body).expect("decode should succeed");
    assert_eq!(response.stats(), &QueryStats::default());
    let QueryResponse::Failure(failure) = response else {
        panic!("expected failure");
    };
    assert_eq!(failure.code, "invalid_query");
    assert_eq!(failure.abort, None);
    assert_eq!(failure.txn_ts, Some(5));
    assert_eq!(failure.query_tags.get("env").map(String::as_str), Some("ci"));
}

#[test]
fn test_tombstone_data_into_nullable_target() {
    let serializer = Serializer::new();
    let body = br#"{"data":{"@ref":{"id":"1","coll":{"@mod":"Product"},"exists":false,"cause":"not found"}}}"#;
    let response: QueryResponse<NullableDocument<Product>> =
        serializer.decode_response(body).expect("decode should succeed");
    let QueryResponse::Success(success) = response else {
        panic!("expected success");
    };
    assert!(!success.data.is_present());
}

#[test]
fn test_truncated_body_is_malformed() {
    let serializer = Serializer::new();
    let err = serializer
        .decode_response::<Value>(br#"{"data":{"@int":"1"}"#)
        .unwrap_err();
    assert!(err.is_malformed());
}
