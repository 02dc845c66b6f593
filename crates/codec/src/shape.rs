//! Target shapes and declared wire-type hints
//!
//! A [`Shape`] is the structural cache key for a codec: two Rust types with
//! the same shape share one cached codec. Shapes form a closed sum type so the
//! dispatcher matches exhaustively instead of probing runtime type objects.
//!
//! | Shape | Rust target |
//! |-------|-------------|
//! | `Primitive` | `bool`, `String`, integers, floats, `NaiveDate`, `DateTime<Utc>`, `Module`, `Bytes`, `EventSource` |
//! | `Dynamic` | `Value` |
//! | `Nullable(T)` | `Option<T>` |
//! | `List(T)` | `Vec<T>` |
//! | `Dictionary(K, V)` | `HashMap<K, V>` (only `K = String` is servable) |
//! | `Page(T)` | `Page<T>` |
//! | `NullableDocument(T)` | `NullableDocument<T>` |
//! | `Document(kind)` | `Document`, `NamedDocument`, `DocumentRef`, `NamedDocumentRef` |
//! | `Class(name)` | a [`Record`](crate::Record) type |
//! | `Query` | `Query` |

use std::fmt;
use tessera_core::{Error, Result};
use tessera_wire::Tag;

/// Declared wire type of a class field
///
/// The hint decides the emitted tag independently of the field's Rust type,
/// so an `i16` field can be written as `@long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireHint {
    /// `@int`
    Int,
    /// `@long`
    Long,
    /// `@double`
    Double,
    /// `true` / `false`
    Bool,
    /// plain string
    String,
    /// `@date`
    Date,
    /// `@time`
    Time,
}

impl WireHint {
    /// The tag this hint emits, if it emits one
    pub fn tag(&self) -> Option<Tag> {
        match self {
            WireHint::Int => Some(Tag::Int),
            WireHint::Long => Some(Tag::Long),
            WireHint::Double => Some(Tag::Double),
            WireHint::Date => Some(Tag::Date),
            WireHint::Time => Some(Tag::Time),
            WireHint::Bool | WireHint::String => None,
        }
    }
}

impl fmt::Display for WireHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WireHint::Int => "int",
            WireHint::Long => "long",
            WireHint::Double => "double",
            WireHint::Bool => "bool",
            WireHint::String => "string",
            WireHint::Date => "date",
            WireHint::Time => "time",
        };
        f.write_str(s)
    }
}

/// Fixed primitive table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Primitive {
    Bool,
    String,
    U8,
    I8,
    I16,
    U16,
    I32,
    U32,
    I64,
    F32,
    F64,
    Date,
    Time,
    Module,
    Bytes,
    Stream,
}

impl Primitive {
    /// Rust-facing name
    pub const fn name(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::String => "String",
            Primitive::U8 => "u8",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::U16 => "u16",
            Primitive::I32 => "i32",
            Primitive::U32 => "u32",
            Primitive::I64 => "i64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Date => "NaiveDate",
            Primitive::Time => "DateTime<Utc>",
            Primitive::Module => "Module",
            Primitive::Bytes => "Bytes",
            Primitive::Stream => "EventSource",
        }
    }

    /// True for the integer family
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Primitive::U8
                | Primitive::I8
                | Primitive::I16
                | Primitive::U16
                | Primitive::I32
                | Primitive::U32
                | Primitive::I64
        )
    }

    /// Hint used when a field declares none
    ///
    /// Integers up to 32 signed bits are `@int`; `u32` and `i64` need `@long`.
    pub const fn natural_hint(&self) -> Option<WireHint> {
        match self {
            Primitive::U8 | Primitive::I8 | Primitive::I16 | Primitive::U16 | Primitive::I32 => {
                Some(WireHint::Int)
            }
            Primitive::U32 | Primitive::I64 => Some(WireHint::Long),
            Primitive::F32 | Primitive::F64 => Some(WireHint::Double),
            Primitive::Bool => Some(WireHint::Bool),
            Primitive::String => Some(WireHint::String),
            Primitive::Date => Some(WireHint::Date),
            Primitive::Time => Some(WireHint::Time),
            Primitive::Module | Primitive::Bytes | Primitive::Stream => None,
        }
    }

    /// Check whether a declared hint can be honoured for this primitive
    pub fn accepts(&self, hint: WireHint) -> bool {
        if self.is_integer() {
            return matches!(hint, WireHint::Int | WireHint::Long);
        }
        self.natural_hint() == Some(hint)
    }
}

/// Kind of document-family target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// `Document`
    Document,
    /// `NamedDocument`
    NamedDocument,
    /// `DocumentRef`
    Ref,
    /// `NamedDocumentRef`
    NamedRef,
}

/// Structural description of a codec target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Fixed primitive
    Primitive(Primitive),
    /// Any wire value, decoded without a static target
    Dynamic,
    /// `null` or the inner shape
    Nullable(Box<Shape>),
    /// Array of the inner shape
    List(Box<Shape>),
    /// Object with keys and values of the given shapes
    Dictionary(Box<Shape>, Box<Shape>),
    /// `@set` page of the inner shape
    Page(Box<Shape>),
    /// Present document of the inner shape, or a tombstone
    NullableDocument(Box<Shape>),
    /// Built-in document or reference type
    Document(DocumentKind),
    /// User record, keyed by its Rust type name
    Class(&'static str),
    /// Query fragments
    Query,
}

impl Shape {
    /// Check that a declared hint can be applied to this shape
    ///
    /// Hints pass through nullable and container wrappers to the leaf
    /// primitive they describe; every other shape rejects them.
    pub fn check_hint(&self, hint: Option<WireHint>) -> Result<()> {
        let hint = match hint {
            Some(hint) => hint,
            None => return Ok(()),
        };
        match self {
            Shape::Primitive(p) if p.accepts(hint) => Ok(()),
            Shape::Nullable(inner) | Shape::List(inner) | Shape::Page(inner) => {
                inner.check_hint(Some(hint))
            }
            Shape::Dictionary(_, value) => value.check_hint(Some(hint)),
            _ => Err(Error::unsupported(
                self,
                format!("wire type hint {} does not apply", hint),
            )),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Primitive(p) => f.write_str(p.name()),
            Shape::Dynamic => f.write_str("Value"),
            Shape::Nullable(inner) => write!(f, "Option<{}>", inner),
            Shape::List(inner) => write!(f, "Vec<{}>", inner),
            Shape::Dictionary(key, value) => write!(f, "HashMap<{}, {}>", key, value),
            Shape::Page(inner) => write!(f, "Page<{}>", inner),
            Shape::NullableDocument(inner) => write!(f, "NullableDocument<{}>", inner),
            Shape::Document(DocumentKind::Document) => f.write_str("Document"),
            Shape::Document(DocumentKind::NamedDocument) => f.write_str("NamedDocument"),
            Shape::Document(DocumentKind::Ref) => f.write_str("DocumentRef"),
            Shape::Document(DocumentKind::NamedRef) => f.write_str("NamedDocumentRef"),
            Shape::Class(name) => f.write_str(name),
            Shape::Query => f.write_str("Query"),
        }
    }
}
