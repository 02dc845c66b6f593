//! Scalar wire types without a native Rust counterpart
//!
//! This module defines the small value types carried by tagged scalars:
//! - [`Module`]: a namespace reference (`@mod`), e.g. a collection name
//! - [`Bytes`]: binary payload (`@bytes`), distinct from a list of bytes
//! - [`EventSource`]: an opaque event-feed token (`@stream`)
//!
//! Dates and times use `chrono` directly: `NaiveDate` for `@date` and
//! `DateTime<Utc>` for `@time`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace reference, encoded as `{"@mod": "<name>"}`
///
/// Collections, functions and other server-side namespaces are all modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Module {
    name: String,
}

impl Module {
    /// Create a module reference by name
    ///
    /// # Examples
    ///
    /// ```
    /// use tessera_core::Module;
    ///
    /// let coll = Module::new("Products");
    /// assert_eq!(coll.name(), "Products");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Module { name: name.into() }
    }

    /// The module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consume and return the name
    pub fn into_name(self) -> String {
        self.name
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Module {
    fn from(name: &str) -> Self {
        Module::new(name)
    }
}

impl From<String> for Module {
    fn from(name: String) -> Self {
        Module { name }
    }
}

/// Binary payload, encoded as `{"@bytes": "<base64>"}`
///
/// A newtype rather than `Vec<u8>` so that binary data and a list of
/// `@int`-tagged bytes stay distinct shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    /// Borrow the raw bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the raw bytes
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Bytes(bytes.to_vec())
    }
}

/// Event-feed source token, encoded as `{"@stream": "<token>"}`
///
/// The token is opaque to the client; it is handed back to the server to open
/// a stream. Cursor semantics live outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventSource {
    token: String,
}

impl EventSource {
    /// Wrap a stream token
    pub fn new(token: impl Into<String>) -> Self {
        EventSource {
            token: token.into(),
        }
    }

    /// The opaque token
    pub fn token(&self) -> &str {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_display_is_name() {
        let m = Module::new("Customers");
        assert_eq!(m.to_string(), "Customers");
        assert_eq!(m, Module::from("Customers"));
    }

    #[test]
    fn test_bytes_conversions() {
        let b = Bytes::from(&[1u8, 2, 3][..]);
        assert_eq!(b.as_slice(), &[1, 2, 3]);
        assert_eq!(b.into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_module_serde_shape() {
        let json = serde_json::to_string(&Module::new("Foo")).unwrap();
        assert_eq!(json, r#"{"name":"Foo"}"#);
    }
}
