//! Document and reference variants
//!
//! A document-shaped wire value (`@doc` or `@ref`) resolves into exactly one of
//! the shapes below once all of its fields have been read:
//!
//! | Shape | Identity | `ts` | `data` |
//! |-------|----------|------|--------|
//! | [`Document`] | `id` | yes | yes |
//! | [`NamedDocument`] | `name` | yes | yes |
//! | [`DocumentRef`] | `id` | no | no |
//! | [`NamedDocumentRef`] | `name` | no | no |
//! | [`NullDocument`] | `id` or `name` | - | no, carries `cause` |
//!
//! [`NullableDocument<T>`] is the target shape a caller uses when a tombstone
//! is an expected outcome rather than an error.

use crate::types::Module;
use crate::value::Value;
use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a document: a generated id or a user-chosen name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Server-assigned document id
    Id(String),
    /// Name of a schema document (collections, functions, roles, ...)
    Name(String),
}

impl Identity {
    /// The identity string, whichever kind it is
    pub fn as_str(&self) -> &str {
        match self {
            Identity::Id(s) | Identity::Name(s) => s,
        }
    }

    /// The wire field name carrying this identity (`id` or `name`)
    pub fn field_name(&self) -> &'static str {
        match self {
            Identity::Id(_) => "id",
            Identity::Name(_) => "name",
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field_name(), self.as_str())
    }
}

/// An identified, timestamped, collection-scoped record
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id
    pub id: String,
    /// Owning collection
    pub coll: Module,
    /// Last-write timestamp
    pub ts: DateTime<Utc>,
    /// All remaining user fields
    pub data: HashMap<String, Value>,
}

impl Document {
    /// Look up a user field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// A reference pointing at this document
    pub fn to_ref(&self) -> DocumentRef {
        DocumentRef {
            id: self.id.clone(),
            coll: self.coll.clone(),
        }
    }
}

/// A document identified by name rather than id
#[derive(Debug, Clone, PartialEq)]
pub struct NamedDocument {
    /// Document name
    pub name: String,
    /// Owning collection
    pub coll: Module,
    /// Last-write timestamp
    pub ts: DateTime<Utc>,
    /// All remaining user fields
    pub data: HashMap<String, Value>,
}

impl NamedDocument {
    /// Look up a user field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// A reference pointing at this document
    pub fn to_ref(&self) -> NamedDocumentRef {
        NamedDocumentRef {
            name: self.name.clone(),
            coll: self.coll.clone(),
        }
    }
}

/// Pointer to a document by id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    /// Document id
    pub id: String,
    /// Owning collection
    pub coll: Module,
}

/// Pointer to a document by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedDocumentRef {
    /// Document name
    pub name: String,
    /// Owning collection
    pub coll: Module,
}

/// Tombstone: a reference to a document that does not exist
///
/// Signalled on the wire by `"exists": false` inside a `@ref`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NullDocument {
    /// Identity that was looked up
    pub identity: Identity,
    /// Collection that was searched
    pub coll: Module,
    /// Server-supplied reason, e.g. `"not found"`
    pub cause: String,
}

impl NullDocument {
    /// Id of the missing document, if it was referenced by id
    pub fn id(&self) -> Option<&str> {
        match &self.identity {
            Identity::Id(id) => Some(id),
            Identity::Name(_) => None,
        }
    }

    /// Name of the missing document, if it was referenced by name
    pub fn name(&self) -> Option<&str> {
        match &self.identity {
            Identity::Name(name) => Some(name),
            Identity::Id(_) => None,
        }
    }
}

impl fmt::Display for NullDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {} ({})", self.identity, self.coll, self.cause)
    }
}

/// A document target that tolerates tombstones
///
/// Decoding a `@ref` with `exists: false` into `NullableDocument<T>` yields
/// [`NullableDocument::Null`] instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum NullableDocument<T> {
    /// The document exists
    Present(T),
    /// The document does not exist
    Null(NullDocument),
}

impl<T> NullableDocument<T> {
    /// True if the document exists
    pub fn is_present(&self) -> bool {
        matches!(self, NullableDocument::Present(_))
    }

    /// Borrow the document, if present
    pub fn as_present(&self) -> Option<&T> {
        match self {
            NullableDocument::Present(v) => Some(v),
            NullableDocument::Null(_) => None,
        }
    }

    /// Borrow the tombstone, if the document is missing
    pub fn as_null(&self) -> Option<&NullDocument> {
        match self {
            NullableDocument::Null(n) => Some(n),
            NullableDocument::Present(_) => None,
        }
    }

    /// Convert into a `Result`, treating the tombstone as the error side
    pub fn into_result(self) -> Result<T, NullDocument> {
        match self {
            NullableDocument::Present(v) => Ok(v),
            NullableDocument::Null(n) => Err(n),
        }
    }
}

/// A document decoded through a collection-to-class mapping
///
/// Produced by the dynamic decoder when the document's collection has a
/// registered class. The record is type-erased; recover it with
/// [`MappedDocument::downcast_ref`].
#[derive(Clone)]
pub struct MappedDocument {
    /// Collection that selected the mapping
    pub coll: Module,
    /// Identity read from the wire before the class took over
    pub identity: Option<Identity>,
    record: Arc<dyn Any + Send + Sync>,
}

impl MappedDocument {
    /// Wrap a decoded record
    pub fn new<T: Any + Send + Sync>(coll: Module, identity: Option<Identity>, record: T) -> Self {
        MappedDocument {
            coll,
            identity,
            record: Arc::new(record),
        }
    }

    /// Borrow the record as `T`, if that is its type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.record.downcast_ref::<T>()
    }

    /// Check the record's type
    pub fn is<T: Any>(&self) -> bool {
        self.record.is::<T>()
    }
}

impl fmt::Debug for MappedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedDocument")
            .field("coll", &self.coll)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl PartialEq for MappedDocument {
    fn eq(&self, other: &Self) -> bool {
        self.coll == other.coll
            && self.identity == other.identity
            && Arc::ptr_eq(&self.record, &other.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tombstone() -> NullDocument {
        NullDocument {
            identity: Identity::Id("123".into()),
            coll: Module::new("Foo"),
            cause: "not found".into(),
        }
    }

    #[test]
    fn test_null_document_accessors() {
        let n = tombstone();
        assert_eq!(n.id(), Some("123"));
        assert_eq!(n.name(), None);
        assert_eq!(n.to_string(), "id=123 in Foo (not found)");
    }

    #[test]
    fn test_nullable_document_into_result() {
        let present: NullableDocument<u32> = NullableDocument::Present(7);
        assert_eq!(present.as_present(), Some(&7));
        assert_eq!(present.into_result(), Ok(7));

        let missing: NullableDocument<u32> = NullableDocument::Null(tombstone());
        assert!(!missing.is_present());
        assert_eq!(missing.into_result().unwrap_err().cause, "not found");
    }

    #[test]
    fn test_mapped_document_downcast() {
        #[derive(Debug, PartialEq)]
        struct Product {
            sku: String,
        }

        let mapped = MappedDocument::new(
            Module::new("Products"),
            Some(Identity::Id("1".into())),
            Product { sku: "x1".into() },
        );
        assert!(mapped.is::<Product>());
        assert_eq!(mapped.downcast_ref::<Product>().unwrap().sku, "x1");
        assert!(mapped.downcast_ref::<String>().is_none());
        assert_eq!(mapped.clone(), mapped);
    }
}
