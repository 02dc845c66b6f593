//! Document/reference variant resolver
//!
//! Accumulates the fields of a `@doc` or `@ref` run and classifies the
//! result once the whole run has been consumed. `exists` and `ts` may follow
//! `coll` on the wire, so no decision is made field by field.
//!
//! | id | name | coll | ts | exists | data | Variant |
//! |----|------|------|----|--------|------|---------|
//! | set | any | set | set | true/absent | any | `Document` (`name` joins `data`) |
//! | absent | set | set | set | true/absent | any | `NamedDocument` |
//! | set | absent | set | absent | true/absent | empty | `Ref` |
//! | absent | set | set | absent | true/absent | empty | `NamedRef` |
//! | id or name | | set | any | **false** | any | `Null` (tombstone) |
//! | anything else | | | | | | `Raw` map, never an error |

use crate::registry::Registry;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tessera_core::{
    Document, DocumentRef, Identity, Module, NamedDocument, NamedDocumentRef, NullDocument,
    Result, Value,
};
use tessera_wire::{TaggedReader, Token};
use tracing::warn;

/// Reserved document field names
pub const ID: &str = "id";
/// Named-document identity
pub const NAME: &str = "name";
/// Collection
pub const COLL: &str = "coll";
/// Timestamp
pub const TS: &str = "ts";
/// Tombstone marker
pub const EXISTS: &str = "exists";
/// Tombstone cause
pub const CAUSE: &str = "cause";

/// Classification outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Identified by id, with timestamp and data
    Document(Document),
    /// Identified by name, with timestamp and data
    NamedDocument(NamedDocument),
    /// Id and collection only
    Ref(DocumentRef),
    /// Name and collection only
    NamedRef(NamedDocumentRef),
    /// A document that does not exist
    Null(NullDocument),
    /// Unrecognised combination, returned as-is
    Raw(HashMap<String, Value>),
}

impl Resolved {
    /// Short variant name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Resolved::Document(_) => "document",
            Resolved::NamedDocument(_) => "named document",
            Resolved::Ref(_) => "reference",
            Resolved::NamedRef(_) => "named reference",
            Resolved::Null(_) => "null document",
            Resolved::Raw(_) => "object",
        }
    }

    /// The dynamic form of this variant
    pub fn into_value(self) -> Value {
        match self {
            Resolved::Document(d) => Value::Document(d),
            Resolved::NamedDocument(d) => Value::NamedDocument(d),
            Resolved::Ref(r) => Value::Ref(r),
            Resolved::NamedRef(r) => Value::NamedRef(r),
            Resolved::Null(n) => Value::NullDocument(n),
            Resolved::Raw(map) => Value::Object(map),
        }
    }
}

/// Fields accumulated from one document or reference run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFields {
    /// `id`
    pub id: Option<String>,
    /// `name`
    pub name: Option<String>,
    /// `coll`
    pub coll: Option<Module>,
    /// `ts`
    pub ts: Option<DateTime<Utc>>,
    /// `exists`; absent means true
    pub exists: Option<bool>,
    /// `cause`
    pub cause: Option<String>,
    /// Everything else
    pub data: HashMap<String, Value>,
}

impl DocumentFields {
    /// True for names with protocol meaning inside a document
    pub fn is_protocol_field(field: &str) -> bool {
        matches!(field, ID | NAME | COLL | TS | EXISTS | CAUSE)
    }

    /// True for the fields the server sends ahead of data fields
    pub fn is_identity_field(field: &str) -> bool {
        matches!(field, ID | NAME | COLL)
    }

    /// Read a full run; the reader must be on `StartDocument` or `StartRef`
    pub fn read(ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Self> {
        let end = match reader.current_token() {
            Token::StartDocument => Token::EndDocument,
            Token::StartRef => Token::EndRef,
            other => return Err(tessera_core::Error::unexpected("StartDocument", other)),
        };
        let mut fields = DocumentFields::default();
        fields.read_until(ctx, reader, end)?;
        Ok(fields)
    }

    /// Accumulate field/value pairs up to and including `end`
    pub fn read_until(
        &mut self,
        ctx: &Registry,
        reader: &mut TaggedReader<'_>,
        end: Token,
    ) -> Result<()> {
        loop {
            reader.advance()?;
            if reader.current_token() == end {
                return Ok(());
            }
            reader.expect(Token::FieldName)?;
            let field = reader.take_string()?;
            reader.advance()?;
            let value = ctx.decode_value(reader)?;
            self.insert(field, value);
        }
    }

    /// Record one field
    ///
    /// A protocol field whose value has the wrong wire type is kept as data.
    pub fn insert(&mut self, field: String, value: Value) {
        match (field.as_str(), value) {
            (ID, Value::String(s)) => self.id = Some(s),
            (NAME, Value::String(s)) => self.name = Some(s),
            (COLL, Value::Module(m)) => self.coll = Some(m),
            (TS, Value::Time(t)) => self.ts = Some(t),
            (EXISTS, Value::Bool(b)) => self.exists = Some(b),
            (CAUSE, Value::String(s)) => self.cause = Some(s),
            (_, value) => {
                self.data.insert(field, value);
            }
        }
    }

    /// Record a protocol field from the reader's current token without
    /// consuming it
    ///
    /// Returns false, recording nothing, when the token is not the field's
    /// protocol wire type.
    pub fn observe(&mut self, field: &str, reader: &TaggedReader<'_>) -> Result<bool> {
        match (field, reader.current_token()) {
            (ID, Token::String) => self.id = Some(reader.get_string()?),
            (NAME, Token::String) => self.name = Some(reader.get_string()?),
            (CAUSE, Token::String) => self.cause = Some(reader.get_string()?),
            (COLL, Token::Module) => self.coll = Some(reader.get_module()?),
            (TS, Token::Time) => self.ts = Some(reader.get_time()?),
            (EXISTS, Token::True | Token::False) => self.exists = Some(reader.get_bool()?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Identity, preferring id over name
    pub fn identity(&self) -> Option<Identity> {
        self.id
            .clone()
            .map(Identity::Id)
            .or_else(|| self.name.clone().map(Identity::Name))
    }

    /// The tombstone, if `exists: false` was read with an identity and
    /// collection
    pub fn tombstone(&self) -> Option<NullDocument> {
        if self.exists != Some(false) {
            return None;
        }
        Some(NullDocument {
            identity: self.identity()?,
            coll: self.coll.clone()?,
            cause: self.cause.clone().unwrap_or_default(),
        })
    }

    /// Classify the accumulated run
    pub fn classify(mut self) -> Resolved {
        if let Some(null) = self.tombstone() {
            return Resolved::Null(null);
        }
        if self.exists == Some(false) {
            return self.into_raw();
        }
        match (self.id.take(), self.name.take(), self.coll.take(), self.ts.take()) {
            (Some(id), name, Some(coll), Some(ts)) => {
                if let Some(name) = name {
                    self.data.insert(NAME.to_string(), Value::String(name));
                }
                Resolved::Document(Document {
                    id,
                    coll,
                    ts,
                    data: self.data,
                })
            }
            (None, Some(name), Some(coll), Some(ts)) => Resolved::NamedDocument(NamedDocument {
                name,
                coll,
                ts,
                data: self.data,
            }),
            (Some(id), None, Some(coll), None) if self.data.is_empty() => {
                Resolved::Ref(DocumentRef { id, coll })
            }
            (None, Some(name), Some(coll), None) if self.data.is_empty() => {
                Resolved::NamedRef(NamedDocumentRef { name, coll })
            }
            (id, name, coll, ts) => {
                self.id = id;
                self.name = name;
                self.coll = coll;
                self.ts = ts;
                self.into_raw()
            }
        }
    }

    fn into_raw(self) -> Resolved {
        warn!(
            fields = self.data.len(),
            "document fields match no known variant; returning raw map"
        );
        let mut map = self.data;
        if let Some(id) = self.id {
            map.insert(ID.to_string(), Value::String(id));
        }
        if let Some(name) = self.name {
            map.insert(NAME.to_string(), Value::String(name));
        }
        if let Some(coll) = self.coll {
            map.insert(COLL.to_string(), Value::Module(coll));
        }
        if let Some(ts) = self.ts {
            map.insert(TS.to_string(), Value::Time(ts));
        }
        if let Some(exists) = self.exists {
            map.insert(EXISTS.to_string(), Value::Bool(exists));
        }
        if let Some(cause) = self.cause {
            map.insert(CAUSE.to_string(), Value::String(cause));
        }
        Resolved::Raw(map)
    }
}
