//! Nullable, list and dictionary codecs
//!
//! Each wraps the inner codec resolved once at build time. A declared hint
//! passes through to the inner shape, so `Vec<i16>` declared `Long` writes
//! every element as `@long`.

use crate::codec::{Codec, Decoded, WireType};
use crate::registry::Registry;
use crate::shape::{Primitive, Shape, WireHint};
use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tessera_core::{Error, Result};
use tessera_wire::{needs_escape, TaggedReader, TaggedWriter, Token};

// ============================================================================
// Option<T>
// ============================================================================

/// `null` or the inner value
///
/// A tombstone also decodes to `None`; use `NullableDocument<T>` to keep it.
pub struct NullableCodec<T> {
    inner: Arc<dyn Codec<T>>,
}

impl<T: WireType> Codec<Option<T>> for NullableCodec<T> {
    fn decode(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Option<T>> {
        if reader.current_token() == Token::Null {
            return Ok(None);
        }
        match self.inner.decode_nullable(ctx, reader)? {
            Decoded::Value(v) => Ok(Some(v)),
            Decoded::Null(_) => Ok(None),
        }
    }

    fn encode(&self, ctx: &Registry, writer: &mut TaggedWriter, value: &Option<T>) -> Result<()> {
        match value {
            Some(v) => self.inner.encode(ctx, writer, v),
            None => writer.write_null_value(),
        }
    }
}

impl<T: WireType> WireType for Option<T> {
    fn shape() -> Shape {
        Shape::Nullable(Box::new(T::shape()))
    }

    fn build_codec(registry: &Registry, hint: Option<WireHint>) -> Result<Arc<dyn Codec<Self>>> {
        Ok(Arc::new(NullableCodec {
            inner: registry.resolve::<T>(hint)?,
        }))
    }
}

// ============================================================================
// Vec<T>
// ============================================================================

/// JSON array of the inner shape
pub struct ListCodec<T> {
    inner: Arc<dyn Codec<T>>,
}

impl<T> ListCodec<T> {
    pub(crate) fn read_elements(
        inner: &dyn Codec<T>,
        ctx: &Registry,
        reader: &mut TaggedReader<'_>,
    ) -> Result<Vec<T>> {
        reader.expect(Token::StartArray)?;
        let mut items = Vec::new();
        loop {
            reader.advance()?;
            if reader.current_token() == Token::EndArray {
                return Ok(items);
            }
            items.push(inner.decode(ctx, reader)?);
        }
    }

    pub(crate) fn write_elements(
        inner: &dyn Codec<T>,
        ctx: &Registry,
        writer: &mut TaggedWriter,
        items: &[T],
    ) -> Result<()> {
        writer.write_start_array()?;
        for item in items {
            inner.encode(ctx, writer, item)?;
        }
        writer.write_end_array()
    }
}

impl<T: WireType> Codec<Vec<T>> for ListCodec<T> {
    fn decode(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Vec<T>> {
        Self::read_elements(self.inner.as_ref(), ctx, reader)
    }

    fn encode(&self, ctx: &Registry, writer: &mut TaggedWriter, value: &Vec<T>) -> Result<()> {
        Self::write_elements(self.inner.as_ref(), ctx, writer, value)
    }
}

impl<T: WireType> WireType for Vec<T> {
    fn shape() -> Shape {
        Shape::List(Box::new(T::shape()))
    }

    fn build_codec(registry: &Registry, hint: Option<WireHint>) -> Result<Arc<dyn Codec<Self>>> {
        Ok(Arc::new(ListCodec {
            inner: registry.resolve::<T>(hint)?,
        }))
    }
}

// ============================================================================
// HashMap<String, V>
// ============================================================================

/// JSON object with string keys
///
/// Keys are written sorted. The `@object` escape is decided per map from its
/// actual key set.
pub struct DictionaryCodec<K, V> {
    inner: Arc<dyn Codec<V>>,
    _key: std::marker::PhantomData<fn() -> K>,
}

impl<K, V> Codec<HashMap<K, V>> for DictionaryCodec<K, V>
where
    K: WireType + Eq + Hash,
    V: WireType,
{
    fn decode(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<HashMap<K, V>> {
        reader.expect(Token::StartObject)?;
        let mut map = HashMap::new();
        loop {
            reader.advance()?;
            match reader.current_token() {
                Token::EndObject => return Ok(map),
                Token::FieldName => {
                    let key = key_from_string::<K>(reader.take_string()?)?;
                    reader.advance()?;
                    map.insert(key, self.inner.decode(ctx, reader)?);
                }
                other => return Err(Error::unexpected("FieldName", other)),
            }
        }
    }

    fn encode(
        &self,
        ctx: &Registry,
        writer: &mut TaggedWriter,
        value: &HashMap<K, V>,
    ) -> Result<()> {
        let mut entries = value
            .iter()
            .map(|(k, v)| Ok((key_as_str(k)?, v)))
            .collect::<Result<Vec<_>>>()?;
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let escape = needs_escape(entries.iter().map(|(k, _)| *k));
        if escape {
            writer.write_start_escaped_object()?;
        } else {
            writer.write_start_object()?;
        }
        for (key, v) in entries {
            writer.write_field_name(key)?;
            self.inner.encode(ctx, writer, v)?;
        }
        if escape {
            writer.write_end_escaped_object()
        } else {
            writer.write_end_object()
        }
    }
}

// Only `K = String` gets past `build_codec`, so these casts cannot miss.
fn key_from_string<K: 'static>(key: String) -> Result<K> {
    let boxed: Box<dyn Any> = Box::new(key);
    boxed
        .downcast::<K>()
        .map(|k| *k)
        .map_err(|_| {
            Error::unsupported(std::any::type_name::<K>(), "dictionary keys must be strings")
        })
}

fn key_as_str<K: 'static>(key: &K) -> Result<&str> {
    (key as &dyn Any)
        .downcast_ref::<String>()
        .map(String::as_str)
        .ok_or_else(|| {
            Error::unsupported(std::any::type_name::<K>(), "dictionary keys must be strings")
        })
}

impl<K, V> WireType for HashMap<K, V>
where
    K: WireType + Eq + Hash,
    V: WireType,
{
    fn shape() -> Shape {
        Shape::Dictionary(Box::new(K::shape()), Box::new(V::shape()))
    }

    fn build_codec(registry: &Registry, hint: Option<WireHint>) -> Result<Arc<dyn Codec<Self>>> {
        if K::shape() != Shape::Primitive(Primitive::String) {
            return Err(Error::unsupported(
                Self::shape(),
                "dictionary keys must be strings",
            ));
        }
        Ok(Arc::new(DictionaryCodec::<K, V> {
            inner: registry.resolve::<V>(hint)?,
            _key: std::marker::PhantomData,
        }))
    }
}
