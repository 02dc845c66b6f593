//! Convenient imports for Tessera.
//!
//! ```
//! use tessera::prelude::*;
//!
//! let n: i32 = Serializer::new().decode(br#"{"@int":"5"}"#).unwrap();
//! assert_eq!(n, 5);
//! ```

// Main entry point
pub use crate::serializer::{Serializer, SerializerBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Queries
pub use tessera_codec::{Query, QueryRequest, QueryResponse};

// Records
pub use tessera_codec::{record, ClassDescriptor, Record, WireHint, WireType};

// Core types
pub use tessera_core::{Document, Module, NullableDocument, Page, Value};
