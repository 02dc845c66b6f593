//! Core types for the Tessera wire codec
//!
//! This crate defines the in-memory side of the protocol:
//! - [`Value`]: dynamic wire value with full type fidelity
//! - [`Module`], [`Bytes`], [`EventSource`]: scalar wire types
//! - [`Document`] and its reference/tombstone variants
//! - [`Page`]: one page of a paginated set
//! - [`Error`]: the codec error taxonomy
//! - [`WireConfig`]: reader limits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod document;
pub mod error;
pub mod page;
pub mod types;
pub mod value;

pub use config::WireConfig;
pub use document::{
    Document, DocumentRef, Identity, MappedDocument, NamedDocument, NamedDocumentRef,
    NullDocument, NullableDocument,
};
pub use error::{Error, ErrorKind, Result};
pub use page::Page;
pub use types::{Bytes, EventSource, Module};
pub use value::Value;
