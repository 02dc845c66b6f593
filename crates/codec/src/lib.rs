//! Type-directed codecs for Tessera
//!
//! Maps tagged JSON (see `tessera-wire`) onto Rust types. Every supported
//! target implements [`WireType`], which names its [`Shape`] and builds a
//! [`Codec`] for it. The [`Registry`] dispatches on shape, caches what it
//! builds, and lets callers override any shape with their own codec.
//!
//! | Target | Module |
//! |--------|--------|
//! | integers, floats, `bool`, `String`, dates, times, bytes | [`primitive`] |
//! | `Option<T>`, `Vec<T>`, `HashMap<String, T>` | [`collection`] |
//! | `Page<T>` | [`page`] |
//! | `Document`, refs, `NullableDocument<T>` | [`document`] |
//! | `Value` | [`dynamic`] |
//! | user records | [`class`] |
//! | `Query` | [`query`] |
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//! use tessera_codec::Registry;
//!
//! let registry = Registry::new();
//! let wire = r#"{"a":{"@long":"1"},"b":{"@long":"2"}}"#;
//! let map: HashMap<String, i64> = registry.decode_str(wire).unwrap();
//! assert_eq!(map["b"], 2);
//! assert_eq!(registry.encode(&map).unwrap(), wire);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod class;
pub mod codec;
pub mod collection;
pub mod document;
pub mod dynamic;
pub mod envelope;
pub mod page;
pub mod primitive;
pub mod query;
pub mod registry;
pub mod resolver;
pub mod shape;

pub use class::{ClassCodec, ClassDescriptor, FieldDescriptor, FieldRole, Record};
pub use codec::{Codec, Decoded, WireType};
pub use document::DocumentVariant;
pub use dynamic::DynamicCodec;
pub use envelope::{QueryFailure, QueryRequest, QueryResponse, QueryStats, QuerySuccess};
pub use query::{Fragment, Query};
pub use registry::Registry;
pub use resolver::{DocumentFields, Resolved};
pub use shape::{DocumentKind, Primitive, Shape, WireHint};
pub use tessera_core::{Error, Result};

/// Implement [`WireType`] for one or more [`Record`] types
///
/// ```ignore
/// record!(Person, Address);
/// ```
#[macro_export]
macro_rules! record {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::WireType for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::Class(::std::any::type_name::<$ty>())
            }

            fn build_codec(
                registry: &$crate::Registry,
                hint: ::std::option::Option<$crate::WireHint>,
            ) -> $crate::Result<::std::sync::Arc<dyn $crate::Codec<Self>>> {
                $crate::class::build_class_codec::<$ty>(registry, hint)
            }
        }
    )+};
}
