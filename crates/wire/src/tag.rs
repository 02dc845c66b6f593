//! Reserved tag table
//!
//! Fixed bidirectional mapping between the reserved object keys and the wire
//! types they introduce.
//!
//! | Tag | Kind | Payload |
//! |-----|------|---------|
//! | `@int` | scalar | decimal string, signed 32-bit |
//! | `@long` | scalar | decimal string, signed 64-bit |
//! | `@double` | scalar | invariant decimal/exponential string, `NaN`, `Infinity`, `-Infinity` |
//! | `@date` | scalar | `yyyy-MM-dd` |
//! | `@time` | scalar | RFC3339 UTC, 7 fractional digits, `Z` |
//! | `@mod` | scalar | module name |
//! | `@bytes` | scalar | base64 |
//! | `@stream` | scalar | opaque token |
//! | `@doc` | structural | object of document fields |
//! | `@ref` | structural | object of reference fields |
//! | `@set` | structural | object with `data`/`after`, or a bare cursor string |
//! | `@object` | escape | plain object whose keys collide with tags |

use std::fmt;

/// A reserved tag key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `@int`
    Int,
    /// `@long`
    Long,
    /// `@double`
    Double,
    /// `@date`
    Date,
    /// `@time`
    Time,
    /// `@mod`
    Module,
    /// `@bytes`
    Bytes,
    /// `@stream`
    Stream,
    /// `@doc`
    Document,
    /// `@ref`
    Ref,
    /// `@set`
    Set,
    /// `@object`
    Object,
}

impl Tag {
    /// All tags (for iteration)
    pub const ALL: [Tag; 12] = [
        Tag::Int,
        Tag::Long,
        Tag::Double,
        Tag::Date,
        Tag::Time,
        Tag::Module,
        Tag::Bytes,
        Tag::Stream,
        Tag::Document,
        Tag::Ref,
        Tag::Set,
        Tag::Object,
    ];

    /// The reserved key as it appears on the wire
    pub const fn as_str(&self) -> &'static str {
        match self {
            Tag::Int => "@int",
            Tag::Long => "@long",
            Tag::Double => "@double",
            Tag::Date => "@date",
            Tag::Time => "@time",
            Tag::Module => "@mod",
            Tag::Bytes => "@bytes",
            Tag::Stream => "@stream",
            Tag::Document => "@doc",
            Tag::Ref => "@ref",
            Tag::Set => "@set",
            Tag::Object => "@object",
        }
    }

    /// Parse a key; `None` for anything that is not reserved
    pub fn from_key(key: &str) -> Option<Tag> {
        // Every tag starts with '@'; reject the common case without a scan.
        if !key.starts_with('@') {
            return None;
        }
        Tag::ALL.iter().copied().find(|t| t.as_str() == key)
    }

    /// True for tags whose payload is a single string
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Tag::Int
                | Tag::Long
                | Tag::Double
                | Tag::Date
                | Tag::Time
                | Tag::Module
                | Tag::Bytes
                | Tag::Stream
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether an object key collides with a reserved tag
pub fn is_reserved(key: &str) -> bool {
    Tag::from_key(key).is_some()
}

/// Check whether a set of object keys requires the `@object` escape
///
/// Decided once per object: a single colliding key escapes the whole object.
pub fn needs_escape<'a, I>(keys: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter().any(is_reserved)
}
