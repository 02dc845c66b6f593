//! Dynamic wire values
//!
//! [`Value`] is what the codec produces when the caller has no static target
//! shape: every tagged scalar keeps its wire type, and document-shaped values
//! come back already classified.
//!
//! ## Type fidelity
//!
//! Integer width survives a round trip: `{"@int":"1"}` decodes to
//! `Value::Int(1)` and `{"@long":"1"}` to `Value::Long(1)`, and each encodes
//! back to its own tag. Different variants are never equal, so
//! `Value::Int(1) != Value::Long(1)`.

use crate::document::{
    Document, DocumentRef, MappedDocument, NamedDocument, NamedDocumentRef, NullDocument,
};
use crate::page::Page;
use crate::types::{Bytes, EventSource, Module};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

/// Any value that can appear on the wire
///
/// | Variant | Wire form |
/// |---------|-----------|
/// | `Null` | `null` |
/// | `Bool` | `true` / `false` |
/// | `Int` | `{"@int":"..."}` |
/// | `Long` | `{"@long":"..."}` |
/// | `Double` | `{"@double":"..."}` |
/// | `String` | `"..."` |
/// | `Date` | `{"@date":"yyyy-MM-dd"}` |
/// | `Time` | `{"@time":"...Z"}` |
/// | `Module` | `{"@mod":"..."}` |
/// | `Bytes` | `{"@bytes":"<base64>"}` |
/// | `Stream` | `{"@stream":"..."}` |
/// | `Array` | `[...]` |
/// | `Object` | `{...}` or `{"@object":{...}}` |
/// | `Document`, `NamedDocument` | `{"@doc":{...}}` |
/// | `Ref`, `NamedRef`, `NullDocument` | `{"@ref":{...}}` |
/// | `Page` | `{"@set":{...}}` |
/// | `Mapped` | `{"@doc":{...}}` of a mapped collection |
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 64-bit IEEE-754 float, including NaN and the infinities
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// UTC timestamp
    Time(DateTime<Utc>),
    /// Namespace reference
    Module(Module),
    /// Binary payload
    Bytes(Bytes),
    /// Event-feed token
    Stream(EventSource),
    /// Ordered sequence
    Array(Vec<Value>),
    /// String-keyed map
    Object(HashMap<String, Value>),
    /// Document identified by id
    Document(Document),
    /// Document identified by name
    NamedDocument(NamedDocument),
    /// Reference by id
    Ref(DocumentRef),
    /// Reference by name
    NamedRef(NamedDocumentRef),
    /// Reference to a document that does not exist
    NullDocument(NullDocument),
    /// One page of a set
    Page(Page<Value>),
    /// Document decoded through a collection-to-class mapping
    Mapped(MappedDocument),
}

impl Value {
    /// Returns the type name as a string (for error messages)
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::Module(_) => "Module",
            Value::Bytes(_) => "Bytes",
            Value::Stream(_) => "Stream",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Document(_) => "Document",
            Value::NamedDocument(_) => "NamedDocument",
            Value::Ref(_) => "Ref",
            Value::NamedRef(_) => "NamedRef",
            Value::NullDocument(_) => "NullDocument",
            Value::Page(_) => "Page",
            Value::Mapped(_) => "Mapped",
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64, widening `Int`
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i64::from(*i)),
            Value::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Try to get as f64, widening either integer width
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(f64::from(*i)),
            Value::Long(l) => Some(*l as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as array slice
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Try to get as object reference
    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Try to get as document
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(l: i64) -> Self {
        Value::Long(l)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Time(t)
    }
}

impl From<Module> for Value {
    fn from(m: Module) -> Self {
        Value::Module(m)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths_are_distinct() {
        assert_ne!(Value::Int(1), Value::Long(1));
        assert_eq!(Value::Int(1).as_long(), Value::Long(1).as_long());
    }

    #[test]
    fn test_as_double_widens_integers() {
        assert_eq!(Value::Int(2).as_double(), Some(2.0));
        assert_eq!(Value::Long(-3).as_double(), Some(-3.0));
        assert_eq!(Value::String("2".into()).as_double(), None);
    }

    #[test]
    fn test_nan_is_not_equal_to_itself() {
        assert_ne!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "Null");
        assert_eq!(Value::Module(Module::new("M")).type_name(), "Module");
        assert_eq!(Value::Page(Page::default()).type_name(), "Page");
    }
}
