//! Document-family codecs
//!
//! Decoding runs the [variant resolver](crate::resolver) and accepts only the
//! variant the target names; a tombstone is reported through
//! [`Codec::decode_nullable`]. Every document-family value is written back as
//! a `@ref` carrying identity and collection only.

use crate::codec::{Codec, Decoded, WireType};
use crate::registry::Registry;
use crate::resolver::{DocumentFields, Resolved, COLL, ID, NAME};
use crate::shape::{DocumentKind, Shape, WireHint};
use std::marker::PhantomData;
use std::sync::Arc;
use tessera_core::{
    Document, DocumentRef, Error, Identity, Module, NamedDocument, NamedDocumentRef,
    NullableDocument, Result,
};
use tessera_wire::{TaggedReader, TaggedWriter};

/// Write `{"@ref":{"<id|name>":"...","coll":{"@mod":"..."}}}`
pub(crate) fn write_ref(
    writer: &mut TaggedWriter,
    identity_field: &str,
    identity: &str,
    coll: &Module,
) -> Result<()> {
    writer.write_start_ref()?;
    writer.write_string(identity_field, identity)?;
    writer.write_module(COLL, coll)?;
    writer.write_end_ref()
}

pub(crate) fn write_identity_ref(
    writer: &mut TaggedWriter,
    identity: &Identity,
    coll: &Module,
) -> Result<()> {
    write_ref(writer, identity.field_name(), identity.as_str(), coll)
}

/// A built-in target of the document family
pub trait DocumentVariant: Sized + Send + Sync + 'static {
    /// Which family member this is
    const KIND: DocumentKind;

    /// Take the matching variant, handing back anything else
    fn extract(resolved: Resolved) -> std::result::Result<Self, Resolved>;

    /// Identity field name and value
    fn identity(&self) -> (&'static str, &str);

    /// Collection
    fn coll(&self) -> &Module;
}

impl DocumentVariant for Document {
    const KIND: DocumentKind = DocumentKind::Document;

    fn extract(resolved: Resolved) -> std::result::Result<Self, Resolved> {
        match resolved {
            Resolved::Document(d) => Ok(d),
            other => Err(other),
        }
    }

    fn identity(&self) -> (&'static str, &str) {
        (ID, &self.id)
    }

    fn coll(&self) -> &Module {
        &self.coll
    }
}

impl DocumentVariant for NamedDocument {
    const KIND: DocumentKind = DocumentKind::NamedDocument;

    fn extract(resolved: Resolved) -> std::result::Result<Self, Resolved> {
        match resolved {
            Resolved::NamedDocument(d) => Ok(d),
            other => Err(other),
        }
    }

    fn identity(&self) -> (&'static str, &str) {
        (NAME, &self.name)
    }

    fn coll(&self) -> &Module {
        &self.coll
    }
}

impl DocumentVariant for DocumentRef {
    const KIND: DocumentKind = DocumentKind::Ref;

    fn extract(resolved: Resolved) -> std::result::Result<Self, Resolved> {
        match resolved {
            Resolved::Ref(r) => Ok(r),
            // A full document can always be narrowed to its reference.
            Resolved::Document(d) => Ok(d.to_ref()),
            other => Err(other),
        }
    }

    fn identity(&self) -> (&'static str, &str) {
        (ID, &self.id)
    }

    fn coll(&self) -> &Module {
        &self.coll
    }
}

impl DocumentVariant for NamedDocumentRef {
    const KIND: DocumentKind = DocumentKind::NamedRef;

    fn extract(resolved: Resolved) -> std::result::Result<Self, Resolved> {
        match resolved {
            Resolved::NamedRef(r) => Ok(r),
            Resolved::NamedDocument(d) => Ok(d.to_ref()),
            other => Err(other),
        }
    }

    fn identity(&self) -> (&'static str, &str) {
        (NAME, &self.name)
    }

    fn coll(&self) -> &Module {
        &self.coll
    }
}

/// Codec for one [`DocumentVariant`]
pub struct DocumentCodec<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T: DocumentVariant> Codec<T> for DocumentCodec<T> {
    fn decode_nullable(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Decoded<T>> {
        match DocumentFields::read(ctx, reader)?.classify() {
            Resolved::Null(null) => Ok(Decoded::Null(null)),
            resolved => T::extract(resolved).map(Decoded::Value).map_err(|other| {
                Error::unexpected(Shape::Document(T::KIND).to_string(), other.kind())
            }),
        }
    }

    fn encode(&self, _ctx: &Registry, writer: &mut TaggedWriter, value: &T) -> Result<()> {
        let (field, identity) = value.identity();
        write_ref(writer, field, identity, value.coll())
    }
}

macro_rules! document_wire_type {
    ($($ty:ty),+ $(,)?) => {$(
        impl WireType for $ty {
            fn shape() -> Shape {
                Shape::Document(<$ty as DocumentVariant>::KIND)
            }

            fn build_codec(
                _registry: &Registry,
                hint: Option<WireHint>,
            ) -> Result<Arc<dyn Codec<Self>>> {
                Self::shape().check_hint(hint)?;
                Ok(Arc::new(DocumentCodec::<$ty> { _target: PhantomData }))
            }
        }
    )+};
}

document_wire_type!(Document, NamedDocument, DocumentRef, NamedDocumentRef);

/// Codec for [`NullableDocument<T>`]
///
/// Keeps the tombstone's identity, collection and cause.
pub struct NullableDocumentCodec<T> {
    inner: Arc<dyn Codec<T>>,
}

impl<T: WireType> Codec<NullableDocument<T>> for NullableDocumentCodec<T> {
    fn decode(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<NullableDocument<T>> {
        Ok(match self.inner.decode_nullable(ctx, reader)? {
            Decoded::Value(v) => NullableDocument::Present(v),
            Decoded::Null(null) => NullableDocument::Null(null),
        })
    }

    fn encode(
        &self,
        ctx: &Registry,
        writer: &mut TaggedWriter,
        value: &NullableDocument<T>,
    ) -> Result<()> {
        match value {
            NullableDocument::Present(v) => self.inner.encode(ctx, writer, v),
            NullableDocument::Null(null) => write_identity_ref(writer, &null.identity, &null.coll),
        }
    }
}

impl<T: WireType> WireType for NullableDocument<T> {
    fn shape() -> Shape {
        Shape::NullableDocument(Box::new(T::shape()))
    }

    fn build_codec(registry: &Registry, hint: Option<WireHint>) -> Result<Arc<dyn Codec<Self>>> {
        Self::shape().check_hint(hint)?;
        Ok(Arc::new(NullableDocumentCodec {
            inner: registry.resolve::<T>(None)?,
        }))
    }
}
