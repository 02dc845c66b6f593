//! Serializer entry point and builder.

use crate::error::Result;
use std::sync::Arc;
use tessera_codec::{Codec, QueryRequest, QueryResponse, Record, Registry, WireType};
use tessera_core::{Value, WireConfig};
use tracing::debug;

/// Encodes requests and decodes responses for one client.
///
/// Cheap to clone; clones share the codec registry and its cache.
///
/// # Example
///
/// ```
/// use tessera::Serializer;
///
/// let serializer = Serializer::new();
/// let n: i64 = serializer.decode(br#"{"@long":"7"}"#).unwrap();
/// assert_eq!(n, 7);
/// assert_eq!(serializer.encode(&n).unwrap(), r#"{"@long":"7"}"#);
/// ```
#[derive(Clone, Debug)]
pub struct Serializer {
    registry: Arc<Registry>,
}

impl Serializer {
    /// Serializer with default limits and no custom codecs.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    /// Create a builder for configuring a serializer.
    pub fn builder() -> SerializerBuilder {
        SerializerBuilder::new()
    }

    /// The underlying codec registry.
    ///
    /// Codecs can still be registered after construction; doing so drops
    /// every generated codec built so far.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Decode a complete tagged value into `T`.
    pub fn decode<T: WireType>(&self, input: &[u8]) -> Result<T> {
        Ok(self.registry.decode(input)?)
    }

    /// Encode a value as tagged JSON.
    pub fn encode<T: WireType>(&self, value: &T) -> Result<String> {
        Ok(self.registry.encode(value)?)
    }

    /// Decode a query response body, decoding its `data` as `T`.
    pub fn decode_response<T: WireType>(&self, body: &[u8]) -> Result<QueryResponse<T>> {
        Ok(QueryResponse::decode(&self.registry, body)?)
    }

    /// Encode a query request body.
    pub fn encode_request(&self, request: &QueryRequest) -> Result<String> {
        Ok(request.encode(&self.registry)?)
    }

    /// Convert a native value to its dynamic form.
    pub fn to_value<T: WireType>(&self, value: &T) -> Result<Value> {
        Ok(self.registry.to_value(value)?)
    }

    /// Convert a dynamic value to `T`.
    pub fn from_value<T: WireType>(&self, value: &Value) -> Result<T> {
        Ok(self.registry.from_value(value)?)
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

type Registration = Box<dyn FnOnce(&Registry) -> tessera_core::Result<()> + Send>;

/// Builder for [`Serializer`].
///
/// Registrations are applied in order by [`build`](Self::build); the first
/// failure aborts the build.
pub struct SerializerBuilder {
    config: WireConfig,
    registrations: Vec<Registration>,
}

impl SerializerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: WireConfig::default(),
            registrations: Vec::new(),
        }
    }

    /// Set the maximum nesting depth accepted when decoding.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config = self.config.with_max_depth(max_depth);
        self
    }

    /// Replace the whole reader configuration.
    pub fn config(mut self, config: WireConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the codec for `T`.
    pub fn register<T: WireType>(mut self, codec: Arc<dyn Codec<T>>) -> Self {
        self.registrations
            .push(Box::new(move |registry| registry.register::<T>(codec)));
        self
    }

    /// Map `T`'s collection so dynamically decoded documents of that
    /// collection come back as `T`.
    pub fn collection<T: Record + WireType>(mut self) -> Self {
        self.registrations
            .push(Box::new(|registry| registry.register_collection::<T>()));
        self
    }

    /// Build the serializer.
    pub fn build(self) -> Result<Serializer> {
        let registry = Registry::with_config(self.config);
        let count = self.registrations.len();
        for register in self.registrations {
            register(&registry)?;
        }
        debug!(registrations = count, max_depth = registry.config().max_depth, "serializer built");
        Ok(Serializer {
            registry: Arc::new(registry),
        })
    }
}

impl Default for SerializerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SerializerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializerBuilder")
            .field("config", &self.config)
            .field("registrations", &self.registrations.len())
            .finish()
    }
}
