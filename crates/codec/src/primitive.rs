//! Primitive codecs
//!
//! Numeric coercion on decode widens but never narrows: an integer target
//! accepts `@int` or `@long` and fails with [`Error::Overflow`] when the value
//! does not fit; `@double` is never accepted by an integer target. Float
//! targets accept all three numeric tags.
//!
//! On encode the declared hint, not the runtime value, picks the tag.

use crate::codec::{Codec, WireType};
use crate::registry::Registry;
use crate::shape::{Primitive, Shape, WireHint};
use chrono::{DateTime, NaiveDate, Utc};
use std::marker::PhantomData;
use std::sync::Arc;
use tessera_core::{Bytes, Error, EventSource, Module, Result};
use tessera_wire::{TaggedReader, TaggedWriter, Token};

// ============================================================================
// Integers
// ============================================================================

/// Integer codec; `long` selects `@long` over `@int` on encode
pub struct IntegerCodec<T> {
    long: bool,
    _target: PhantomData<fn() -> T>,
}

impl<T> IntegerCodec<T> {
    fn new(long: bool) -> Self {
        IntegerCodec {
            long,
            _target: PhantomData,
        }
    }
}

impl<T> Codec<T> for IntegerCodec<T>
where
    T: Copy + Into<i64> + TryFrom<i64> + WireType,
{
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<T> {
        let wide = reader.get_long()?;
        T::try_from(wide).map_err(|_| Error::overflow(wide, primitive_name::<T>()))
    }

    fn encode(&self, _ctx: &Registry, writer: &mut TaggedWriter, value: &T) -> Result<()> {
        let wide: i64 = (*value).into();
        if self.long {
            return writer.write_long_value(wide);
        }
        let narrow = i32::try_from(wide)
            .map_err(|_| Error::Encode(format!("{} does not fit @int", wide)))?;
        writer.write_int_value(narrow)
    }
}

fn primitive_name<T: WireType>() -> &'static str {
    match T::shape() {
        Shape::Primitive(p) => p.name(),
        _ => "integer",
    }
}

fn integer_codec<T>(primitive: Primitive, hint: Option<WireHint>) -> Result<Arc<dyn Codec<T>>>
where
    T: Copy + Into<i64> + TryFrom<i64> + WireType,
{
    Shape::Primitive(primitive).check_hint(hint)?;
    let long = hint.or(primitive.natural_hint()) == Some(WireHint::Long);
    Ok(Arc::new(IntegerCodec::<T>::new(long)))
}

macro_rules! integer_wire_type {
    ($($ty:ty => $prim:ident),+ $(,)?) => {$(
        impl WireType for $ty {
            fn shape() -> Shape {
                Shape::Primitive(Primitive::$prim)
            }

            fn build_codec(
                _registry: &Registry,
                hint: Option<WireHint>,
            ) -> Result<Arc<dyn Codec<Self>>> {
                integer_codec::<$ty>(Primitive::$prim, hint)
            }
        }
    )+};
}

integer_wire_type! {
    u8 => U8,
    i8 => I8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
}

// ============================================================================
// Floats
// ============================================================================

/// `f64` codec
pub struct DoubleCodec;

impl Codec<f64> for DoubleCodec {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<f64> {
        reader.get_double()
    }

    fn encode(&self, _ctx: &Registry, writer: &mut TaggedWriter, value: &f64) -> Result<()> {
        writer.write_double_value(*value)
    }
}

/// `f32` codec
pub struct FloatCodec;

impl Codec<f32> for FloatCodec {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<f32> {
        // Narrowing to single precision rounds; it never fails.
        reader.get_double().map(|d| d as f32)
    }

    fn encode(&self, _ctx: &Registry, writer: &mut TaggedWriter, value: &f32) -> Result<()> {
        writer.write_float_value(*value)
    }
}

// ============================================================================
// Everything else
// ============================================================================

/// `bool` codec
pub struct BoolCodec;

impl Codec<bool> for BoolCodec {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<bool> {
        reader.get_bool()
    }

    fn encode(&self, _ctx: &Registry, writer: &mut TaggedWriter, value: &bool) -> Result<()> {
        writer.write_bool_value(*value)
    }
}

/// `String` codec
pub struct StringCodec;

impl Codec<String> for StringCodec {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<String> {
        if reader.current_token() != Token::String {
            return Err(Error::unexpected("String", reader.current_token()));
        }
        reader.take_string()
    }

    fn encode(&self, _ctx: &Registry, writer: &mut TaggedWriter, value: &String) -> Result<()> {
        writer.write_string_value(value)
    }
}

/// `@date` codec
pub struct DateCodec;

impl Codec<NaiveDate> for DateCodec {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<NaiveDate> {
        reader.get_date()
    }

    fn encode(&self, _ctx: &Registry, writer: &mut TaggedWriter, value: &NaiveDate) -> Result<()> {
        writer.write_date_value(value)
    }
}

/// `@time` codec
pub struct TimeCodec;

impl Codec<DateTime<Utc>> for TimeCodec {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<DateTime<Utc>> {
        reader.get_time()
    }

    fn encode(
        &self,
        _ctx: &Registry,
        writer: &mut TaggedWriter,
        value: &DateTime<Utc>,
    ) -> Result<()> {
        writer.write_time_value(value)
    }
}

/// `@mod` codec
pub struct ModuleCodec;

impl Codec<Module> for ModuleCodec {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Module> {
        reader.get_module()
    }

    fn encode(&self, _ctx: &Registry, writer: &mut TaggedWriter, value: &Module) -> Result<()> {
        writer.write_module_value(value)
    }
}

/// `@bytes` codec
pub struct BytesCodec;

impl Codec<Bytes> for BytesCodec {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Bytes> {
        reader.get_bytes()
    }

    fn encode(&self, _ctx: &Registry, writer: &mut TaggedWriter, value: &Bytes) -> Result<()> {
        writer.write_bytes_value(value.as_slice())
    }
}

/// `@stream` codec
pub struct StreamCodec;

impl Codec<EventSource> for StreamCodec {
    fn decode(&self, _ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<EventSource> {
        reader.get_stream()
    }

    fn encode(
        &self,
        _ctx: &Registry,
        writer: &mut TaggedWriter,
        value: &EventSource,
    ) -> Result<()> {
        writer.write_stream_value(value)
    }
}

macro_rules! fixed_wire_type {
    ($($ty:ty => $prim:ident, $codec:expr);+ $(;)?) => {$(
        impl WireType for $ty {
            fn shape() -> Shape {
                Shape::Primitive(Primitive::$prim)
            }

            fn build_codec(
                _registry: &Registry,
                hint: Option<WireHint>,
            ) -> Result<Arc<dyn Codec<Self>>> {
                Self::shape().check_hint(hint)?;
                Ok(Arc::new($codec))
            }
        }
    )+};
}

fixed_wire_type! {
    f64 => F64, DoubleCodec;
    f32 => F32, FloatCodec;
    bool => Bool, BoolCodec;
    String => String, StringCodec;
    NaiveDate => Date, DateCodec;
    DateTime<Utc> => Time, TimeCodec;
    Module => Module, ModuleCodec;
    Bytes => Bytes, BytesCodec;
    EventSource => Stream, StreamCodec;
}
