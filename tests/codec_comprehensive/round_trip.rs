//! Round Trip Tests
//!
//! Every primitive's canonical wire form must survive decode then encode
//! unchanged, and numeric targets widen but never silently narrow.

use crate::*;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

// =============================================================================
// CANONICAL FORMS
// =============================================================================

#[test]
fn test_integer_family() {
    assert_eq!(assert_round_trip::<u8>(r#"{"@int":"7"}"#), 7);
    assert_eq!(assert_round_trip::<i8>(r#"{"@int":"-7"}"#), -7);
    assert_eq!(assert_round_trip::<i16>(r#"{"@int":"1234"}"#), 1234);
    assert_eq!(assert_round_trip::<u16>(r#"{"@int":"60000"}"#), 60000);
    assert_eq!(assert_round_trip::<i32>(r#"{"@int":"42"}"#), 42);
    assert_eq!(assert_round_trip::<u32>(r#"{"@long":"3000000000"}"#), 3_000_000_000);
    assert_eq!(
        assert_round_trip::<i64>(r#"{"@long":"9223372036854775807"}"#),
        i64::MAX
    );
}

#[test]
fn test_floats() {
    assert_eq!(assert_round_trip::<f64>(r#"{"@double":"3.25"}"#), 3.25);
    assert_eq!(assert_round_trip::<f32>(r#"{"@double":"2.5"}"#), 2.5);
    assert!(assert_round_trip::<f64>(r#"{"@double":"NaN"}"#).is_nan());
    assert_eq!(
        assert_round_trip::<f64>(r#"{"@double":"-Infinity"}"#),
        f64::NEG_INFINITY
    );
}

#[test]
fn test_bool_and_string() {
    assert!(!assert_round_trip::<bool>("false"));
    assert_eq!(
        assert_round_trip::<String>(r#""line\nbreak \"quoted\"""#),
        "line\nbreak \"quoted\""
    );
}

#[test]
fn test_date_time_module() {
    assert_eq!(
        assert_round_trip::<NaiveDate>(r#"{"@date":"2024-02-29"}"#),
        NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date")
    );
    let time: DateTime<Utc> =
        assert_round_trip(r#"{"@time":"2023-12-03T14:52:10.1234567Z"}"#);
    assert_eq!(time.timestamp_subsec_nanos(), 123_456_700);
    assert_eq!(
        assert_round_trip::<Module>(r#"{"@mod":"Collection"}"#),
        Module::new("Collection")
    );
}

#[test]
fn test_time_is_normalised_to_seven_digits() {
    let serializer = Serializer::new();
    let time: DateTime<Utc> = serializer
        .decode(br#"{"@time":"2023-12-03T14:52:10Z"}"#)
        .expect("decode should succeed");
    assert_eq!(time, Utc.with_ymd_and_hms(2023, 12, 3, 14, 52, 10).unwrap());
    assert_eq!(
        serializer.encode(&time).expect("encode should succeed"),
        r#"{"@time":"2023-12-03T14:52:10.0000000Z"}"#
    );
}

#[test]
fn test_dynamic_value_keeps_wire_types() {
    let wire = r#"[{"@int":"1"},{"@long":"1"},{"@double":"1.5"},{"@date":"2023-01-01"},{"@mod":"Foo"},null,true]"#;
    let value: Value = assert_round_trip(wire);
    let Value::Array(items) = value else {
        panic!("expected array");
    };
    assert_eq!(items[0], Value::Int(1));
    assert_eq!(items[1], Value::Long(1));
}

// =============================================================================
// NUMERIC WIDENING
// =============================================================================

#[test]
fn test_long_accepts_int() {
    let serializer = Serializer::new();
    let n: i64 = serializer
        .decode(br#"{"@int":"42"}"#)
        .expect("decode should succeed");
    assert_eq!(n, 42);
}

#[test]
fn test_int_rejects_out_of_range_long() {
    let serializer = Serializer::new();
    let err = serializer
        .decode::<i32>(br#"{"@long":"9223372036854775807"}"#)
        .unwrap_err();
    assert!(err.is_malformed(), "got {:?}", err);
}

#[test]
fn test_malformed_payload() {
    let serializer = Serializer::new();
    assert!(serializer.decode::<i32>(br#"{"@int":"forty"}"#).unwrap_err().is_malformed());
    assert!(serializer.decode::<i32>(br#"{"@int":"1""#).unwrap_err().is_malformed());
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_i32_round_trip(n in any::<i32>()) {
        let wire = format!(r#"{{"@int":"{}"}}"#, n);
        let serializer = Serializer::new();
        let decoded: i32 = serializer.decode(wire.as_bytes()).unwrap();
        prop_assert_eq!(decoded, n);
        prop_assert_eq!(serializer.encode(&decoded).unwrap(), wire);
    }

    #[test]
    fn prop_i64_round_trip(n in any::<i64>()) {
        let serializer = Serializer::new();
        let text = serializer.encode(&n).unwrap();
        prop_assert_eq!(serializer.decode::<i64>(text.as_bytes()).unwrap(), n);
    }

    #[test]
    fn prop_finite_double_round_trip(d in any::<f64>().prop_filter("finite", |d| d.is_finite())) {
        let serializer = Serializer::new();
        let text = serializer.encode(&d).unwrap();
        prop_assert_eq!(serializer.decode::<f64>(text.as_bytes()).unwrap(), d);
    }

    #[test]
    fn prop_string_round_trip(s in ".*") {
        let serializer = Serializer::new();
        let text = serializer.encode(&s).unwrap();
        prop_assert_eq!(json(&text), serde_json::Value::String(s.clone()));
        prop_assert_eq!(serializer.decode::<String>(text.as_bytes()).unwrap(), s);
    }
}
