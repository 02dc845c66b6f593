//! Tagged JSON for Tessera
//!
//! The wire format is plain UTF-8 JSON in which values with no native JSON
//! form travel inside single-key wrapper objects keyed by a reserved tag:
//!
//! | Value | Wire |
//! |-------|------|
//! | 32-bit int | `{"@int":"42"}` |
//! | 64-bit int | `{"@long":"42"}` |
//! | double | `{"@double":"1.5"}` |
//! | date | `{"@date":"2023-12-03"}` |
//! | time | `{"@time":"2023-12-03T14:52:10.0000000Z"}` |
//! | module | `{"@mod":"Foo"}` |
//! | document | `{"@doc":{...}}` |
//! | reference | `{"@ref":{...}}` |
//! | page | `{"@set":{"data":[...],"after":"..."}}` |
//! | object with a reserved key | `{"@object":{...}}` |
//!
//! This crate provides the token layer only: [`TaggedReader`] turns bytes
//! into [`Token`]s and [`TaggedWriter`] does the reverse. Mapping tokens to
//! typed values lives in `tessera-codec`.
//!
//! ## Example
//!
//! ```
//! use tessera_wire::{TaggedReader, TaggedWriter, Token};
//!
//! let mut w = TaggedWriter::new();
//! w.write_int_value(42).unwrap();
//! let text = w.finish().unwrap();
//! assert_eq!(text, r#"{"@int":"42"}"#);
//!
//! let mut r = TaggedReader::new(text.as_bytes());
//! r.advance().unwrap();
//! assert_eq!(r.current_token(), Token::Int);
//! assert_eq!(r.get_int().unwrap(), 42);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod json;
pub mod reader;
pub mod tag;
pub mod writer;

pub use reader::{TaggedReader, Token};
pub use tag::{is_reserved, needs_escape, Tag};
pub use writer::TaggedWriter;
