//! Client-visible error type.
//!
//! Wraps the codec's internal taxonomy and presents the five outcomes a
//! caller can act on: the server sent something malformed, the requested
//! type does not fit, a document did not exist, a registration clashed, or a
//! value could not be written.

use tessera_core::error::{Error as CoreError, ErrorKind};
use tessera_core::NullDocument;
use thiserror::Error;

/// All Tessera errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// The wire input is not valid tagged JSON, or does not match the target
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No codec can serve the requested type
    #[error("incompatible type: {0}")]
    IncompatibleType(String),

    /// A document was requested but the server returned a tombstone
    #[error("document does not exist: {0}")]
    NullDocument(NullDocument),

    /// Codec registration clashed with an existing one
    #[error("registration error: {0}")]
    Registration(String),

    /// A value could not be encoded
    #[error("encode error: {0}")]
    Encode(String),
}

/// Result type for Tessera operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if the server response was at fault.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedResponse(_))
    }

    /// Check if the caller asked for a type the codec cannot produce.
    pub fn is_incompatible(&self) -> bool {
        matches!(self, Error::IncompatibleType(_))
    }

    /// The tombstone, if this error carries one.
    pub fn null_document(&self) -> Option<&NullDocument> {
        match self {
            Error::NullDocument(null) => Some(null),
            _ => None,
        }
    }
}

// Convert from internal codec errors
impl From<CoreError> for Error {
    fn from(e: CoreError) -> Self {
        match (e.kind(), e) {
            (_, CoreError::NullDocument(null)) => Error::NullDocument(null),
            (ErrorKind::Malformed, e) => Error::MalformedResponse(e.to_string()),
            (ErrorKind::Unsupported, e) => Error::IncompatibleType(e.to_string()),
            (ErrorKind::Registration, e) => Error::Registration(e.to_string()),
            (ErrorKind::Encode, e) => Error::Encode(e.to_string()),
            (ErrorKind::NullDocument, e) => Error::MalformedResponse(e.to_string()),
        }
    }
}
