//! Plain JSON layer beneath the tagged reader and writer
//!
//! - [`JsonTokenizer`]: pull-based tokenizer over UTF-8 bytes
//! - [`encode_string`] / [`write_string`]: string escaping
//! - [`format_double`] / [`format_float`]: canonical `@double` payloads

mod encode;
mod tokenizer;

pub use encode::{encode_string, format_double, format_float, write_string};
pub use tokenizer::{JsonToken, JsonTokenizer};
