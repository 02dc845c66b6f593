//! Class codec
//!
//! User records describe their wire mapping once, in a [`ClassDescriptor`]:
//! a statically-declared table of wire name, declared hint, role and typed
//! accessor pair per field. The codec built from it never reflects at run
//! time.
//!
//! ```ignore
//! impl Record for Person {
//!     fn descriptor() -> ClassDescriptor<Self> {
//!         ClassDescriptor::<Self>::new("Person")
//!             .collection("Person")
//!             .generated_id(|p| &p.id, |p, v| p.id = v)
//!             .field("name", |p| &p.name, |p, v| p.name = v)
//!             .field_as("age", WireHint::Long, |p| &p.age, |p, v| p.age = v)
//!     }
//! }
//! record!(Person);
//! ```
//!
//! ## Decode
//!
//! Accepts a plain object, a `@doc`, or a `@ref` tombstone. Unknown fields
//! are skipped. Inside `@doc` and `@ref`, protocol fields (`id`, `name`,
//! `coll`, `ts`, `exists`, `cause`) are tracked whether or not the record
//! maps them, so a tombstone carries its identity even when the record has
//! no id field. In a plain object those names are ordinary data fields.
//!
//! ## Encode
//!
//! Generated ids, `coll` and `ts` are server-owned and never written back.
//! The `@object` escape is decided once, from the declared wire names.

use crate::codec::{Codec, Decoded, WireType};
use crate::registry::Registry;
use crate::resolver::{DocumentFields, COLL, ID, NAME, TS};
use crate::shape::{Shape, WireHint};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tessera_core::{Error, MappedDocument, Module, Result, Value};
use tessera_wire::{needs_escape, TaggedReader, TaggedWriter, Token};
use tracing::trace;

/// A user type with a declared wire mapping
pub trait Record: Default + Send + Sync + 'static {
    /// The field table
    fn descriptor() -> ClassDescriptor<Self>;
}

/// What a field means to the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Ordinary data
    Data,
    /// Document id
    Id {
        /// Assigned by the server; not written back
        generated: bool,
    },
    /// Named-document identity
    Name,
    /// Collection, server-owned
    Collection,
    /// Timestamp, server-owned
    Ts,
}

impl FieldRole {
    /// True for fields that must not be round-tripped to the server
    pub fn skip_on_encode(&self) -> bool {
        matches!(
            self,
            FieldRole::Id { generated: true } | FieldRole::Collection | FieldRole::Ts
        )
    }
}

trait FieldAccess<T>: Send + Sync {
    fn decode(
        &self,
        ctx: &Registry,
        hint: Option<WireHint>,
        reader: &mut TaggedReader<'_>,
        record: &mut T,
    ) -> Result<()>;

    fn inject(
        &self,
        ctx: &Registry,
        hint: Option<WireHint>,
        value: &Value,
        record: &mut T,
    ) -> Result<()>;

    fn encode(
        &self,
        ctx: &Registry,
        hint: Option<WireHint>,
        writer: &mut TaggedWriter,
        record: &T,
    ) -> Result<()>;
}

struct Accessor<T, F> {
    get: fn(&T) -> &F,
    set: fn(&mut T, F),
}

impl<T, F: WireType> FieldAccess<T> for Accessor<T, F> {
    fn decode(
        &self,
        ctx: &Registry,
        hint: Option<WireHint>,
        reader: &mut TaggedReader<'_>,
        record: &mut T,
    ) -> Result<()> {
        let value = ctx.resolve::<F>(hint)?.decode(ctx, reader)?;
        (self.set)(record, value);
        Ok(())
    }

    fn inject(
        &self,
        ctx: &Registry,
        hint: Option<WireHint>,
        value: &Value,
        record: &mut T,
    ) -> Result<()> {
        let value = ctx.from_value_with_hint::<F>(value, hint)?;
        (self.set)(record, value);
        Ok(())
    }

    fn encode(
        &self,
        ctx: &Registry,
        hint: Option<WireHint>,
        writer: &mut TaggedWriter,
        record: &T,
    ) -> Result<()> {
        ctx.resolve::<F>(hint)?.encode(ctx, writer, (self.get)(record))
    }
}

/// One row of a [`ClassDescriptor`]
pub struct FieldDescriptor<T> {
    wire_name: String,
    hint: Option<WireHint>,
    role: FieldRole,
    shape: Shape,
    access: Box<dyn FieldAccess<T>>,
}

impl<T> FieldDescriptor<T> {
    /// Name on the wire
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Declared hint
    pub fn hint(&self) -> Option<WireHint> {
        self.hint
    }

    /// Protocol role
    pub fn role(&self) -> FieldRole {
        self.role
    }

    /// Shape of the Rust field
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("wire_name", &self.wire_name)
            .field("hint", &self.hint)
            .field("role", &self.role)
            .field("shape", &self.shape)
            .finish()
    }
}

/// Statically-declared field table for a record
pub struct ClassDescriptor<T> {
    name: &'static str,
    collection: Option<String>,
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: 'static> ClassDescriptor<T> {
    /// Start an empty table
    pub fn new(name: &'static str) -> Self {
        ClassDescriptor {
            name,
            collection: None,
            fields: Vec::new(),
        }
    }

    /// Collection whose documents map to this record
    pub fn collection(mut self, coll: impl Into<String>) -> Self {
        self.collection = Some(coll.into());
        self
    }

    /// Data field with the natural wire type
    pub fn field<F: WireType>(
        self,
        wire_name: &str,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        self.push(wire_name, None, FieldRole::Data, get, set)
    }

    /// Data field with a declared wire type
    pub fn field_as<F: WireType>(
        self,
        wire_name: &str,
        hint: WireHint,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        self.push(wire_name, Some(hint), FieldRole::Data, get, set)
    }

    /// Client-assigned `id`
    pub fn id<F: WireType>(self, get: fn(&T) -> &F, set: fn(&mut T, F)) -> Self {
        self.push(ID, None, FieldRole::Id { generated: false }, get, set)
    }

    /// Server-assigned `id`
    pub fn generated_id<F: WireType>(self, get: fn(&T) -> &F, set: fn(&mut T, F)) -> Self {
        self.push(ID, None, FieldRole::Id { generated: true }, get, set)
    }

    /// Named-document identity
    pub fn named_by<F: WireType>(self, get: fn(&T) -> &F, set: fn(&mut T, F)) -> Self {
        self.push(NAME, None, FieldRole::Name, get, set)
    }

    /// `coll`
    pub fn coll<F: WireType>(self, get: fn(&T) -> &F, set: fn(&mut T, F)) -> Self {
        self.push(COLL, None, FieldRole::Collection, get, set)
    }

    /// `ts`
    pub fn ts<F: WireType>(self, get: fn(&T) -> &F, set: fn(&mut T, F)) -> Self {
        self.push(TS, None, FieldRole::Ts, get, set)
    }

    fn push<F: WireType>(
        mut self,
        wire_name: &str,
        hint: Option<WireHint>,
        role: FieldRole,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        self.fields.push(FieldDescriptor {
            wire_name: wire_name.to_string(),
            hint,
            role,
            shape: F::shape(),
            access: Box::new(Accessor { get, set }),
        });
        self
    }

    /// Record name
    pub fn class_name(&self) -> &'static str {
        self.name
    }

    /// Mapped collection, if any
    pub fn collection_name(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Field rows in declaration order
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }
}

/// Codec built from a [`ClassDescriptor`]
pub struct ClassCodec<T> {
    descriptor: ClassDescriptor<T>,
    index: FxHashMap<String, usize>,
    escape: bool,
}

impl<T: Record> ClassCodec<T> {
    /// Build from `T`'s own descriptor
    pub fn new() -> Result<Self> {
        Self::from_descriptor(T::descriptor())
    }

    /// Build from an explicit descriptor
    ///
    /// Field hints are validated here, so an inapplicable hint fails at
    /// resolution time rather than mid-stream.
    pub fn from_descriptor(descriptor: ClassDescriptor<T>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, field) in descriptor.fields.iter().enumerate() {
            field.shape.check_hint(field.hint).map_err(|e| {
                Error::unsupported(
                    descriptor.name,
                    format!("field {}: {}", field.wire_name, e),
                )
            })?;
            if index.insert(field.wire_name.clone(), i).is_some() {
                return Err(Error::unsupported(
                    descriptor.name,
                    format!("wire name {} declared twice", field.wire_name),
                ));
            }
        }
        let escape = needs_escape(descriptor.fields.iter().map(|f| f.wire_name.as_str()));
        Ok(ClassCodec {
            descriptor,
            index,
            escape,
        })
    }

    /// Mapped collection, if any
    pub fn collection(&self) -> Option<&str> {
        self.descriptor.collection_name()
    }

    /// Whether encoding wraps the object in `@object`
    pub fn escape(&self) -> bool {
        self.escape
    }

    fn field(&self, wire_name: &str) -> Option<&FieldDescriptor<T>> {
        self.index
            .get(wire_name)
            .and_then(|&i| self.descriptor.fields.get(i))
    }

    /// Decode fields up to `end`
    ///
    /// Inside a `@doc` or `@ref` run, protocol fields are also recorded in
    /// `protocol` for tombstone and identity tracking. A plain object has no
    /// protocol fields. With `resume` the reader is already on the first
    /// unconsumed token and `protocol` holds identity fields read by the
    /// caller, which are injected first.
    fn decode_fields(
        &self,
        ctx: &Registry,
        reader: &mut TaggedReader<'_>,
        protocol: &mut DocumentFields,
        end: Token,
        resume: bool,
    ) -> Result<Decoded<T>> {
        let document = end != Token::EndObject;
        let mut record = T::default();

        if resume {
            let primed = [
                (ID, protocol.id.clone().map(Value::String)),
                (NAME, protocol.name.clone().map(Value::String)),
                (COLL, protocol.coll.clone().map(Value::Module)),
            ];
            for (wire_name, value) in primed {
                if let (Some(field), Some(value)) = (self.field(wire_name), value) {
                    field.access.inject(ctx, field.hint, &value, &mut record)?;
                }
            }
        }

        let mut at_current = resume;
        loop {
            if !at_current {
                reader.advance()?;
            }
            at_current = false;
            if reader.current_token() == end {
                break;
            }
            reader.expect(Token::FieldName)?;
            let name = reader.take_string()?;
            reader.advance()?;

            let tracked = document
                && DocumentFields::is_protocol_field(&name)
                && protocol.observe(&name, reader)?;
            match self.field(&name) {
                Some(field) => field.access.decode(ctx, field.hint, reader, &mut record)?,
                None if tracked => {}
                None => {
                    trace!(record = self.descriptor.name, field = %name, "skipping unknown field");
                    reader.skip()?;
                }
            }
        }

        if !document {
            return Ok(Decoded::Value(record));
        }
        if protocol.exists == Some(false) {
            return protocol.tombstone().map(Decoded::Null).ok_or_else(|| {
                Error::unexpected("tombstone with identity and collection", "incomplete tombstone")
            });
        }
        if end == Token::EndRef {
            return Err(Error::unexpected(
                format!("document for {}", self.descriptor.name),
                "reference",
            ));
        }
        Ok(Decoded::Value(record))
    }
}

impl<T: Record> Codec<T> for ClassCodec<T> {
    fn decode_nullable(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Decoded<T>> {
        let end = match reader.current_token() {
            Token::StartObject => Token::EndObject,
            Token::StartDocument => Token::EndDocument,
            Token::StartRef => Token::EndRef,
            other => {
                return Err(Error::unexpected(
                    format!("object for {}", self.descriptor.name),
                    other,
                ))
            }
        };
        let mut protocol = DocumentFields::default();
        self.decode_fields(ctx, reader, &mut protocol, end, false)
    }

    fn encode(&self, ctx: &Registry, writer: &mut TaggedWriter, value: &T) -> Result<()> {
        if self.escape {
            writer.write_start_escaped_object()?;
        } else {
            writer.write_start_object()?;
        }
        for field in &self.descriptor.fields {
            if field.role.skip_on_encode() {
                continue;
            }
            writer.write_field_name(&field.wire_name)?;
            field.access.encode(ctx, field.hint, writer, value)?;
        }
        if self.escape {
            writer.write_end_escaped_object()
        } else {
            writer.write_end_object()
        }
    }
}

/// Type-erased record decoder bound to a collection
pub(crate) trait MappedDecoder: Send + Sync {
    /// Continue a `@doc` run whose identity fields the caller already read
    fn resume(
        &self,
        ctx: &Registry,
        reader: &mut TaggedReader<'_>,
        primed: DocumentFields,
        end: Token,
    ) -> Result<Decoded<MappedDocument>>;
}

impl<T: Record> MappedDecoder for ClassCodec<T> {
    fn resume(
        &self,
        ctx: &Registry,
        reader: &mut TaggedReader<'_>,
        mut primed: DocumentFields,
        end: Token,
    ) -> Result<Decoded<MappedDocument>> {
        let decoded = self.decode_fields(ctx, reader, &mut primed, end, true)?;
        Ok(decoded.map(|record| {
            let coll = primed
                .coll
                .clone()
                .unwrap_or_else(|| Module::new(self.collection().unwrap_or_default()));
            MappedDocument::new(coll, primed.identity(), record)
        }))
    }
}

/// Build the codec for a record; records take no hint
pub fn build_class_codec<T: Record>(
    _registry: &Registry,
    hint: Option<WireHint>,
) -> Result<Arc<dyn Codec<T>>> {
    if let Some(hint) = hint {
        return Err(Error::unsupported(
            std::any::type_name::<T>(),
            format!("wire type hint {} does not apply to records", hint),
        ));
    }
    Ok(Arc::new(ClassCodec::<T>::new()?))
}
