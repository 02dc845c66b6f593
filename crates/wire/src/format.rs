//! Canonical payload grammar for tagged scalars
//!
//! Parsing is the only place tagged payload strings are interpreted, and
//! formatting is the only place they are produced, so reader and writer agree
//! on one grammar:
//!
//! | Tag | Parse | Format |
//! |-----|-------|--------|
//! | `@int` | decimal, must fit `i32` | decimal |
//! | `@long` | decimal, must fit `i64` | decimal |
//! | `@double` | decimal/exponential, `NaN`, `Infinity`, `-Infinity` | see [`format_double`](crate::json::format_double) |
//! | `@date` | `yyyy-MM-dd` | `yyyy-MM-dd` |
//! | `@time` | any RFC3339 offset | UTC, 7 fractional digits, `Z` |
//! | `@bytes` | standard base64 | standard base64 |

use crate::tag::Tag;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use tessera_core::{Error, Result};

fn invalid(tag: Tag, payload: &str) -> Error {
    Error::InvalidPayload {
        tag: tag.as_str(),
        payload: payload.to_string(),
    }
}

/// Parse an `@int` payload
///
/// A well-formed integer outside the 32-bit range is an overflow, not a
/// malformed payload.
pub fn parse_int(payload: &str) -> Result<i32> {
    match payload.parse::<i32>() {
        Ok(v) => Ok(v),
        Err(_) => match payload.parse::<i128>() {
            Ok(_) => Err(Error::overflow(payload, "i32")),
            Err(_) => Err(invalid(Tag::Int, payload)),
        },
    }
}

/// Parse an `@long` payload
pub fn parse_long(payload: &str) -> Result<i64> {
    match payload.parse::<i64>() {
        Ok(v) => Ok(v),
        Err(_) => match payload.parse::<i128>() {
            Ok(_) => Err(Error::overflow(payload, "i64")),
            Err(_) => Err(invalid(Tag::Long, payload)),
        },
    }
}

/// Parse an `@double` payload
pub fn parse_double(payload: &str) -> Result<f64> {
    match payload {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ => payload.parse::<f64>().map_err(|_| invalid(Tag::Double, payload)),
    }
}

/// Parse an `@date` payload
pub fn parse_date(payload: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(payload, "%Y-%m-%d").map_err(|_| invalid(Tag::Date, payload))
}

/// Format an `@date` payload
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse an `@time` payload, normalising to UTC
pub fn parse_time(payload: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(payload)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| invalid(Tag::Time, payload))
}

/// Format an `@time` payload: `yyyy-MM-ddTHH:mm:ss.fffffffZ`
pub fn format_time(time: &DateTime<Utc>) -> String {
    // Ticks of 100ns; a leap second's nanos can exceed one second.
    let ticks = (time.timestamp_subsec_nanos() / 100).min(9_999_999);
    format!("{}.{:07}Z", time.format("%Y-%m-%dT%H:%M:%S"), ticks)
}

/// Parse an `@bytes` payload
pub fn parse_bytes(payload: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| invalid(Tag::Bytes, payload))
}

/// Format an `@bytes` payload
pub fn format_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
