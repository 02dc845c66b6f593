//! Error taxonomy for the wire codec
//!
//! Every fatal error aborts the whole decode or encode call; there are no
//! partial results.
//!
//! | Kind | Variants | Raised |
//! |------|----------|--------|
//! | Malformed | `InvalidJson`, `UnexpectedEnd`, `UnexpectedToken`, `InvalidPayload`, `Overflow`, `Unbalanced`, `DepthExceeded` | while reading bytes |
//! | Unsupported | `UnsupportedType` | at codec resolution, before any bytes are read |
//! | NullDocument | `NullDocument` | a tombstone met a target that requires a present document |
//! | Registration | `DuplicateRegistration` | at the registration call site |
//! | Encode | `Encode` | while writing |
//!
//! Unknown fields during class decode are not errors.

use crate::document::NullDocument;
use thiserror::Error;

/// Wire codec errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// Invalid JSON syntax
    #[error("invalid JSON at byte {offset}: {reason}")]
    InvalidJson {
        /// Byte offset into the input
        offset: usize,
        /// What was wrong
        reason: String,
    },

    /// Input ended inside a value
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A token other than the one the decoder required
    #[error("unexpected token: expected {expected}, got {actual}")]
    UnexpectedToken {
        /// What the decoder wanted
        expected: String,
        /// What it found
        actual: String,
    },

    /// A tagged payload that does not parse for its tag
    #[error("invalid {tag} payload: {payload:?}")]
    InvalidPayload {
        /// The tag, e.g. `@int`
        tag: &'static str,
        /// The raw payload
        payload: String,
    },

    /// Numeric value outside the target type's range
    #[error("value {value} does not fit in {target}")]
    Overflow {
        /// The value as read
        value: String,
        /// The target type name
        target: &'static str,
    },

    /// Structural close without a matching open
    #[error("unbalanced structure: {0}")]
    Unbalanced(String),

    /// Nesting deeper than the configured limit
    #[error("nesting depth exceeds limit of {0}")]
    DepthExceeded(usize),

    /// No codec can be built for the requested target shape
    #[error("unsupported target shape {shape}: {reason}")]
    UnsupportedType {
        /// The shape that was requested
        shape: String,
        /// Why it cannot be served
        reason: String,
    },

    /// Tombstone where a present document was required
    #[error("document does not exist: {0}")]
    NullDocument(NullDocument),

    /// A codec is already registered for this shape
    #[error("codec already registered for {0}")]
    DuplicateRegistration(String),

    /// Value cannot be written
    #[error("encode error: {0}")]
    Encode(String),
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`]
///
/// The transport layer uses this to tell a malformed server response apart
/// from a caller asking for an incompatible type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The bytes on the wire are not valid tagged JSON
    Malformed,
    /// The requested target shape cannot be served
    Unsupported,
    /// A tombstone met a non-nullable target
    NullDocument,
    /// Misuse of the registration API
    Registration,
    /// The value cannot be written
    Encode,
}

impl Error {
    /// Shorthand for [`Error::UnexpectedToken`]
    pub fn unexpected(expected: impl Into<String>, actual: impl std::fmt::Display) -> Self {
        Error::UnexpectedToken {
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }

    /// Shorthand for [`Error::UnsupportedType`]
    pub fn unsupported(shape: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Error::UnsupportedType {
            shape: shape.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::Overflow`]
    pub fn overflow(value: impl std::fmt::Display, target: &'static str) -> Self {
        Error::Overflow {
            value: value.to_string(),
            target,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidJson { .. }
            | Error::UnexpectedEnd
            | Error::UnexpectedToken { .. }
            | Error::InvalidPayload { .. }
            | Error::Overflow { .. }
            | Error::Unbalanced(_)
            | Error::DepthExceeded(_) => ErrorKind::Malformed,
            Error::UnsupportedType { .. } => ErrorKind::Unsupported,
            Error::NullDocument(_) => ErrorKind::NullDocument,
            Error::DuplicateRegistration(_) => ErrorKind::Registration,
            Error::Encode(_) => ErrorKind::Encode,
        }
    }

    /// Check if the wire input was at fault
    pub fn is_malformed(&self) -> bool {
        self.kind() == ErrorKind::Malformed
    }

    /// Check if the requested shape was at fault
    pub fn is_unsupported(&self) -> bool {
        self.kind() == ErrorKind::Unsupported
    }

    /// Check if this is a tombstone outcome
    pub fn is_null_document(&self) -> bool {
        matches!(self, Error::NullDocument(_))
    }

    /// The tombstone, if this is a tombstone outcome
    pub fn as_null_document(&self) -> Option<&NullDocument> {
        match self {
            Error::NullDocument(n) => Some(n),
            _ => None,
        }
    }
}
