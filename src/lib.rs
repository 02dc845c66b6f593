//! # Tessera
//!
//! Tagged-JSON wire codec for document database clients.
//!
//! The server speaks plain JSON in which values with no native JSON form
//! travel inside single-key wrappers (`{"@int":"1"}`, `{"@doc":{...}}`).
//! Tessera maps that format onto Rust types in both directions.
//!
//! ## Quick Start
//!
//! ```
//! use tessera::prelude::*;
//!
//! let serializer = Serializer::new();
//!
//! // Requests
//! let request = QueryRequest::new(Query::literal("Users.byId(id)")).argument("id", "123");
//! let body = serializer.encode_request(&request).unwrap();
//! assert_eq!(body, r#"{"query":{"fql":["Users.byId(id)"]},"arguments":{"id":"123"}}"#);
//!
//! // Responses
//! let response: QueryResponse<i32> = serializer
//!     .decode_response(br#"{"data":{"@int":"42"},"txn_ts":1}"#)
//!     .unwrap();
//! assert!(response.is_success());
//! ```
//!
//! ## Layers
//!
//! - `tessera-core`: [`Value`], documents, pages, the codec error taxonomy
//! - `tessera-wire`: the tagged reader and writer
//! - `tessera-codec`: the codec registry, class codecs, request/response envelopes
//!
//! User records implement [`Record`] and are declared with [`record!`].

#![warn(missing_docs)]

mod error;
mod serializer;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use serializer::{Serializer, SerializerBuilder};

// Re-export codec surface
pub use tessera_codec::{
    record, ClassDescriptor, Codec, Decoded, FieldRole, Fragment, Query, QueryFailure,
    QueryRequest, QueryResponse, QueryStats, QuerySuccess, Record, Registry, Shape, WireHint,
    WireType,
};

// Re-export types
pub use tessera_core::{
    Bytes, Document, DocumentRef, EventSource, Identity, MappedDocument, Module, NamedDocument,
    NamedDocumentRef, NullDocument, NullableDocument, Page, Value, WireConfig,
};
pub use tessera_wire::{TaggedReader, TaggedWriter, Token};
