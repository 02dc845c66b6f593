//! Registry Tests
//!
//! User codecs take precedence over generated ones, deregistration restores
//! the default, and resolution is safe under concurrent use.

use crate::*;
use std::sync::Arc;
use std::thread;
use tessera::{Codec, Error, Registry, TaggedReader, TaggedWriter};

/// Writes integers as plain decimal strings
struct DecimalString;

impl Codec<i32> for DecimalString {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> tessera_core::Result<i32> {
        let text = reader.get_str()?;
        text.parse()
            .map_err(|_| tessera_core::Error::unexpected("decimal string", text))
    }

    fn encode(
        &self,
        _ctx: &Registry,
        writer: &mut TaggedWriter,
        value: &i32,
    ) -> tessera_core::Result<()> {
        writer.write_string_value(&value.to_string())
    }
}

#[test]
fn test_registration_precedence() {
    let serializer = Serializer::new();
    let registry = serializer.registry();
    assert_eq!(serializer.encode(&42i32).unwrap(), r#"{"@int":"42"}"#);

    registry
        .register::<i32>(Arc::new(DecimalString))
        .expect("register should succeed");
    assert_eq!(serializer.encode(&42i32).unwrap(), r#""42""#);
    assert_eq!(serializer.decode::<i32>(br#""17""#).unwrap(), 17);

    assert!(registry.deregister::<i32>());
    assert_eq!(serializer.encode(&42i32).unwrap(), r#"{"@int":"42"}"#);
}

#[test]
fn test_override_reaches_composites() {
    let serializer = Serializer::new();
    let wire = serializer.encode(&vec![1i32, 2]).unwrap();
    assert_eq!(wire, r#"[{"@int":"1"},{"@int":"2"}]"#);

    serializer
        .registry()
        .register::<i32>(Arc::new(DecimalString))
        .expect("register should succeed");
    assert_eq!(serializer.encode(&vec![1i32, 2]).unwrap(), r#"["1","2"]"#);
}

#[test]
fn test_duplicate_registration_is_immediate() {
    let serializer = Serializer::new();
    let registry = serializer.registry();
    registry.register::<i32>(Arc::new(DecimalString)).unwrap();
    let err = registry.register::<i32>(Arc::new(DecimalString)).unwrap_err();
    assert!(matches!(Error::from(err), Error::Registration(_)));
}

#[test]
fn test_deregister_without_registration_is_noop() {
    let serializer = Serializer::new();
    assert!(!serializer.registry().deregister::<i32>());
    assert_eq!(serializer.encode(&1i32).unwrap(), r#"{"@int":"1"}"#);
}

#[test]
fn test_unsupported_shape_fails_before_reading() {
    let serializer = Serializer::new();
    // Not even valid JSON; resolution must fail first.
    let err = serializer.decode::<HashMap<i32, String>>(b"{{{").unwrap_err();
    assert!(err.is_incompatible(), "got {:?}", err);
}

#[test]
fn test_concurrent_resolution_and_registration() {
    let serializer = Serializer::new();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let serializer = serializer.clone();
            thread::spawn(move || {
                for n in 0..200i64 {
                    let list = vec![n, i];
                    let text = serializer.encode(&list).unwrap();
                    let back: Vec<i64> = serializer.decode(text.as_bytes()).unwrap();
                    assert_eq!(back, list);
                    if i == 0 && n % 50 == 0 {
                        let _ = serializer.registry().register::<String>(Arc::new(Shout));
                        serializer.registry().deregister::<String>();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker should not panic");
    }
}

struct Shout;

impl Codec<String> for Shout {
    fn decode(
        &self,
        _ctx: &Registry,
        reader: &mut TaggedReader<'_>,
    ) -> tessera_core::Result<String> {
        Ok(reader.get_string()?.to_uppercase())
    }

    fn encode(
        &self,
        _ctx: &Registry,
        writer: &mut TaggedWriter,
        value: &String,
    ) -> tessera_core::Result<()> {
        writer.write_string_value(&value.to_uppercase())
    }
}
