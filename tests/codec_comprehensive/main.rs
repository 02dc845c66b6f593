//! Codec Comprehensive Test Suite
//!
//! Exercises the public surface end to end through [`tessera::Serializer`]:
//!
//! - **round_trip**: canonical wire forms survive decode then encode
//! - **escaping**: `@object` wrapping of maps whose keys collide with tags
//! - **documents**: variant classification, tombstones, collection mappings
//! - **classes**: user records, unknown fields, declared hints
//! - **registry**: override precedence, deregistration, concurrent use
//! - **pages**: cursors and unmaterialized sets
//! - **envelope**: request and response bodies
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test codec_comprehensive
//! cargo test --test codec_comprehensive documents::
//! ```

pub use std::collections::HashMap;
pub use tessera::prelude::*;
pub use tessera::{Identity, NamedDocumentRef};

pub mod classes;
pub mod documents;
pub mod envelope;
pub mod escaping;
pub mod pages;
pub mod registry;
pub mod round_trip;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Decode `wire` into `T`, re-encode, and check the text is unchanged
pub fn assert_round_trip<T>(wire: &str) -> T
where
    T: WireType + std::fmt::Debug,
{
    let serializer = Serializer::new();
    let value: T = serializer
        .decode(wire.as_bytes())
        .expect("decode should succeed");
    let encoded = serializer.encode(&value).expect("encode should succeed");
    assert_eq!(encoded, wire, "round trip changed the wire form of {:?}", value);
    value
}

/// Route `tracing` output through the test harness; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Parse emitted text as plain JSON for structural comparison
pub fn json(text: &str) -> serde_json::Value {
    serde_json::from_str(text).expect("emitted text should be valid JSON")
}

/// A user record stored in the `Product` collection
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Product {
    pub id: Option<String>,
    pub coll: Option<Module>,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    pub tags: Vec<String>,
}

impl Record for Product {
    fn descriptor() -> ClassDescriptor<Self> {
        ClassDescriptor::<Self>::new("Product")
            .collection("Product")
            .generated_id(|p| &p.id, |p, v| p.id = v)
            .coll(|p| &p.coll, |p, v| p.coll = v)
            .field("name", |p| &p.name, |p, v| p.name = v)
            .field_as("quantity", WireHint::Long, |p| &p.quantity, |p, v| p.quantity = v)
            .field("price", |p| &p.price, |p, v| p.price = v)
            .field("tags", |p| &p.tags, |p, v| p.tags = v)
    }
}

record!(Product);
