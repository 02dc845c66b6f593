//! Codec registry and dispatcher
//!
//! Resolves a target type to its codec, building and caching on first use.
//!
//! ## Resolution order
//!
//! 1. User overrides, keyed by shape alone. An override serves every hint.
//! 2. The generated-codec cache, keyed by `(shape, hint)`.
//! 3. [`WireType::build_codec`], whose result is inserted into the cache.
//!
//! ## Concurrency
//!
//! The override table sits behind a reader-writer lock. A resolve holds the
//! read side for its whole duration (recursively, since composite codecs
//! resolve their inner shapes), so `register`/`deregister` never interleave
//! with a build. Both clear the cache under the write side: a composite codec
//! built before the change would otherwise keep a stale inner codec.
//!
//! Two threads racing to build the same shape both build; the first cache
//! insert wins and the loser adopts it.

use crate::class::{ClassCodec, MappedDecoder, Record};
use crate::codec::{Codec, WireType};
use crate::dynamic::DynamicCodec;
use crate::shape::{Shape, WireHint};
use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};
use std::any::Any;
use std::hash::BuildHasherDefault;
use std::sync::Arc;
use tessera_core::{Error, Result, Value, WireConfig};
use tessera_wire::{TaggedReader, TaggedWriter};
use tracing::{debug, warn};

/// Type-erased `Arc<dyn Codec<T>>`
type Erased = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    shape: Shape,
    hint: Option<WireHint>,
}

/// Codec registry
///
/// Constructed once and passed by shared reference to every call site.
pub struct Registry {
    config: WireConfig,
    overrides: RwLock<FxHashMap<Shape, Erased>>,
    cache: DashMap<CacheKey, Erased, BuildHasherDefault<FxHasher>>,
    collections: RwLock<FxHashMap<String, Arc<dyn MappedDecoder>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("overrides", &self.overrides.read().len())
            .field("cached", &self.cache.len())
            .field("collections", &self.collections.read().len())
            .finish()
    }
}

impl Registry {
    /// Create a registry with default limits
    pub fn new() -> Self {
        Self::with_config(WireConfig::default())
    }

    /// Create a registry with explicit limits
    pub fn with_config(config: WireConfig) -> Self {
        Registry {
            config,
            overrides: RwLock::new(FxHashMap::default()),
            cache: DashMap::with_hasher(BuildHasherDefault::default()),
            collections: RwLock::new(FxHashMap::default()),
        }
    }

    /// Reader limits
    pub fn config(&self) -> &WireConfig {
        &self.config
    }

    /// Number of generated codecs currently cached
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve the codec for `T` under an optional declared hint
    pub fn resolve<T: WireType>(&self, hint: Option<WireHint>) -> Result<Arc<dyn Codec<T>>> {
        let shape = T::shape();
        let overrides = self.overrides.read_recursive();

        if let Some(erased) = overrides.get(&shape) {
            match downcast::<T>(erased) {
                Some(codec) => return Ok(codec),
                None => warn!(
                    shape = %shape,
                    "override registered under this shape belongs to another type"
                ),
            }
        }

        let key = CacheKey { shape, hint };
        let cached = self.cache.get(&key).map(|entry| Arc::clone(entry.value()));
        if let Some(erased) = cached {
            match downcast::<T>(&erased) {
                Some(codec) => return Ok(codec),
                None => {
                    warn!(shape = %key.shape, "two types share one shape; bypassing cache");
                    return T::build_codec(self, hint);
                }
            }
        }

        let codec = T::build_codec(self, hint)?;
        debug!(shape = %key.shape, hint = ?hint, "built codec");
        let erased: Erased = Arc::new(Arc::clone(&codec));
        let winner = Arc::clone(self.cache.entry(key).or_insert(erased).value());
        drop(overrides);
        Ok(downcast::<T>(&winner).unwrap_or(codec))
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a codec that overrides the generated one for `T`
    ///
    /// Fails with [`Error::DuplicateRegistration`] if `T` already has one.
    pub fn register<T: WireType>(&self, codec: Arc<dyn Codec<T>>) -> Result<()> {
        let shape = T::shape();
        let mut overrides = self.overrides.write();
        if overrides.contains_key(&shape) {
            return Err(Error::DuplicateRegistration(shape.to_string()));
        }
        let erased: Erased = Arc::new(codec);
        overrides.insert(shape.clone(), erased);
        self.invalidate();
        debug!(shape = %shape, "registered codec override");
        Ok(())
    }

    /// Remove the override for `T`; a no-op when none is registered
    ///
    /// Returns whether an override was removed.
    pub fn deregister<T: WireType>(&self) -> bool {
        let shape = T::shape();
        let mut overrides = self.overrides.write();
        let removed = overrides.remove(&shape).is_some();
        if removed {
            self.invalidate();
            debug!(shape = %shape, "deregistered codec override");
        }
        removed
    }

    /// Check whether `T` has an override
    pub fn is_registered<T: WireType>(&self) -> bool {
        self.overrides.read().contains_key(&T::shape())
    }

    /// Bind `T`'s collection so dynamically decoded documents of that
    /// collection come back as `T`
    pub fn register_collection<T: Record>(&self) -> Result<()> {
        let codec = ClassCodec::<T>::new()?;
        let coll = codec.collection().map(str::to_string).ok_or_else(|| {
            Error::unsupported(
                std::any::type_name::<T>(),
                "record declares no collection",
            )
        })?;
        let mut collections = self.collections.write();
        if collections.contains_key(&coll) {
            return Err(Error::DuplicateRegistration(format!("collection {}", coll)));
        }
        debug!(
            collection = %coll,
            record = std::any::type_name::<T>(),
            "registered collection mapping"
        );
        collections.insert(coll, Arc::new(codec));
        Ok(())
    }

    /// Remove a collection binding; a no-op when none is registered
    pub fn deregister_collection(&self, coll: &str) -> bool {
        let removed = self.collections.write().remove(coll).is_some();
        if removed {
            debug!(collection = %coll, "deregistered collection mapping");
        }
        removed
    }

    pub(crate) fn collection(&self, coll: &str) -> Option<Arc<dyn MappedDecoder>> {
        self.collections.read().get(coll).cloned()
    }

    fn invalidate(&self) {
        if !self.cache.is_empty() {
            debug!(entries = self.cache.len(), "invalidating generated codecs");
            self.cache.clear();
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// A reader over `input` using this registry's limits
    pub fn reader<'a>(&self, input: &'a [u8]) -> TaggedReader<'a> {
        TaggedReader::with_config(input, &self.config)
    }

    /// Decode a complete wire value into `T`
    ///
    /// The codec is resolved before any input is read, so an unsupported
    /// target fails without touching the bytes.
    pub fn decode<T: WireType>(&self, input: &[u8]) -> Result<T> {
        self.decode_with_hint(input, None)
    }

    /// Decode a complete wire value from text
    pub fn decode_str<T: WireType>(&self, input: &str) -> Result<T> {
        self.decode(input.as_bytes())
    }

    fn decode_with_hint<T: WireType>(&self, input: &[u8], hint: Option<WireHint>) -> Result<T> {
        let codec = self.resolve::<T>(hint)?;
        let mut reader = self.reader(input);
        reader.advance()?;
        let value = codec.decode(self, &mut reader)?;
        reader.finish()?;
        Ok(value)
    }

    /// Encode a value as tagged JSON
    pub fn encode<T: WireType>(&self, value: &T) -> Result<String> {
        self.encode_with_hint(value, None)
    }

    fn encode_with_hint<T: WireType>(&self, value: &T, hint: Option<WireHint>) -> Result<String> {
        let codec = self.resolve::<T>(hint)?;
        let mut writer = TaggedWriter::new();
        codec.encode(self, &mut writer, value)?;
        writer.finish()
    }

    /// Decode the value under the reader with no static target
    pub fn decode_value(&self, reader: &mut TaggedReader<'_>) -> Result<Value> {
        DynamicCodec.decode(self, reader)
    }

    /// Encode a dynamic value
    pub fn encode_value(&self, writer: &mut TaggedWriter, value: &Value) -> Result<()> {
        DynamicCodec.encode(self, writer, value)
    }

    /// Convert a native value into its dynamic form
    pub fn to_value<T: WireType>(&self, value: &T) -> Result<Value> {
        let text = self.encode(value)?;
        self.decode::<Value>(text.as_bytes())
    }

    /// Convert a dynamic value into `T`
    pub fn from_value<T: WireType>(&self, value: &Value) -> Result<T> {
        self.from_value_with_hint(value, None)
    }

    pub(crate) fn from_value_with_hint<T: WireType>(
        &self,
        value: &Value,
        hint: Option<WireHint>,
    ) -> Result<T> {
        let text = self.encode_with_hint(value, None)?;
        self.decode_with_hint(text.as_bytes(), hint)
    }
}

fn downcast<T: WireType>(erased: &Erased) -> Option<Arc<dyn Codec<T>>> {
    erased.downcast_ref::<Arc<dyn Codec<T>>>().cloned()
}
