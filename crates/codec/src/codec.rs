//! The codec contract
//!
//! A [`Codec<T>`] is the paired decode/encode unit for one target shape. Every
//! codec receives the [`Registry`] it was resolved from so it can resolve
//! nested shapes on demand.
//!
//! ## Reader position
//!
//! `decode` is entered with the reader positioned on the first token of the
//! value and returns with it positioned on the value's last token. The caller
//! advances.
//!
//! ## Tombstones
//!
//! A `@ref` with `exists: false` is an ordinary outcome, not an error.
//! [`Codec::decode_nullable`] returns it as [`Decoded::Null`]; targets that
//! cannot hold a tombstone turn it into [`Error::NullDocument`] in
//! [`Codec::decode`]. Implementors override at least one of the two.

use crate::registry::Registry;
use crate::shape::{Shape, WireHint};
use std::sync::Arc;
use tessera_core::{Error, NullDocument, Result};
use tessera_wire::{TaggedReader, TaggedWriter};

/// Outcome of a decode that may meet a tombstone
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// A value of the target type
    Value(T),
    /// A reference to a document that does not exist
    Null(NullDocument),
}

impl<T> Decoded<T> {
    /// The value, or [`Error::NullDocument`] for a tombstone
    pub fn into_value(self) -> Result<T> {
        match self {
            Decoded::Value(v) => Ok(v),
            Decoded::Null(null) => Err(Error::NullDocument(null)),
        }
    }

    /// Map the present value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::Value(v) => Decoded::Value(f(v)),
            Decoded::Null(null) => Decoded::Null(null),
        }
    }
}

/// Paired decoder and encoder for one target type
pub trait Codec<T>: Send + Sync {
    /// Decode one value
    fn decode(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<T> {
        self.decode_nullable(ctx, reader)?.into_value()
    }

    /// Decode one value, reporting a tombstone as [`Decoded::Null`]
    fn decode_nullable(
        &self,
        ctx: &Registry,
        reader: &mut TaggedReader<'_>,
    ) -> Result<Decoded<T>> {
        self.decode(ctx, reader).map(Decoded::Value)
    }

    /// Encode one value
    fn encode(&self, ctx: &Registry, writer: &mut TaggedWriter, value: &T) -> Result<()>;
}

/// A Rust type the registry knows how to build a codec for
pub trait WireType: Sized + Send + Sync + 'static {
    /// Structural cache key
    fn shape() -> Shape;

    /// Build a fresh codec, honouring the declared hint
    ///
    /// Called at most once per `(shape, hint)` between cache invalidations.
    /// An inapplicable hint is [`Error::UnsupportedType`].
    fn build_codec(registry: &Registry, hint: Option<WireHint>) -> Result<Arc<dyn Codec<Self>>>;
}
