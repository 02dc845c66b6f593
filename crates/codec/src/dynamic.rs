//! Dynamic value codec
//!
//! Decodes any wire value into [`Value`] without a static target. Documents
//! go through the variant resolver, except that a `@doc` whose collection has
//! a registered mapping is handed to that record's decoder as soon as the
//! leading `id`/`name`/`coll` fields have been read.

use crate::codec::{Codec, Decoded, WireType};
use crate::document::{write_identity_ref, write_ref};
use crate::page::read_page;
use crate::registry::Registry;
use crate::resolver::{DocumentFields, ID, NAME};
use crate::shape::{Shape, WireHint};
use std::collections::HashMap;
use std::sync::Arc;
use tessera_core::{Error, Result, Value};
use tessera_wire::{needs_escape, TaggedReader, TaggedWriter, Token};

/// Codec for [`Value`]
pub struct DynamicCodec;

impl Codec<Value> for DynamicCodec {
    fn decode(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Value> {
        Ok(match reader.current_token() {
            Token::Null => Value::Null,
            Token::True => Value::Bool(true),
            Token::False => Value::Bool(false),
            Token::String => Value::String(reader.take_string()?),
            Token::Int => Value::Int(reader.get_int()?),
            Token::Long => Value::Long(reader.get_long()?),
            Token::Double => Value::Double(reader.get_double()?),
            Token::Date => Value::Date(reader.get_date()?),
            Token::Time => Value::Time(reader.get_time()?),
            Token::Module => Value::Module(reader.get_module()?),
            Token::Bytes => Value::Bytes(reader.get_bytes()?),
            Token::Stream => Value::Stream(reader.get_stream()?),
            Token::StartArray => Value::Array(self.read_array(ctx, reader)?),
            Token::StartObject => Value::Object(self.read_object(ctx, reader)?),
            Token::StartPage => Value::Page(read_page(reader, |reader| {
                self.read_array(ctx, reader)
            })?),
            Token::StartDocument => self.read_document(ctx, reader)?,
            Token::StartRef => DocumentFields::read(ctx, reader)?.classify().into_value(),
            other => return Err(Error::unexpected("value", other)),
        })
    }

    fn encode(&self, ctx: &Registry, writer: &mut TaggedWriter, value: &Value) -> Result<()> {
        match value {
            Value::Null => writer.write_null_value(),
            Value::Bool(b) => writer.write_bool_value(*b),
            Value::Int(i) => writer.write_int_value(*i),
            Value::Long(l) => writer.write_long_value(*l),
            Value::Double(d) => writer.write_double_value(*d),
            Value::String(s) => writer.write_string_value(s),
            Value::Date(d) => writer.write_date_value(d),
            Value::Time(t) => writer.write_time_value(t),
            Value::Module(m) => writer.write_module_value(m),
            Value::Bytes(b) => writer.write_bytes_value(b.as_slice()),
            Value::Stream(s) => writer.write_stream_value(s),
            Value::Array(items) => {
                writer.write_start_array()?;
                for item in items {
                    self.encode(ctx, writer, item)?;
                }
                writer.write_end_array()
            }
            Value::Object(map) => self.write_object(ctx, writer, map),
            Value::Page(page) => {
                writer.write_start_page()?;
                writer.write_field_name("data")?;
                writer.write_start_array()?;
                for item in &page.data {
                    self.encode(ctx, writer, item)?;
                }
                writer.write_end_array()?;
                if let Some(after) = &page.after {
                    writer.write_string("after", after)?;
                }
                writer.write_end_page()
            }
            Value::Document(d) => write_ref(writer, ID, &d.id, &d.coll),
            Value::NamedDocument(d) => write_ref(writer, NAME, &d.name, &d.coll),
            Value::Ref(r) => write_ref(writer, ID, &r.id, &r.coll),
            Value::NamedRef(r) => write_ref(writer, NAME, &r.name, &r.coll),
            Value::NullDocument(null) => write_identity_ref(writer, &null.identity, &null.coll),
            Value::Mapped(mapped) => match &mapped.identity {
                Some(identity) => write_identity_ref(writer, identity, &mapped.coll),
                None => Err(Error::Encode(format!(
                    "mapped {} document has no identity to reference",
                    mapped.coll
                ))),
            },
        }
    }
}

impl DynamicCodec {
    fn read_array(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Vec<Value>> {
        reader.expect(Token::StartArray)?;
        let mut items = Vec::new();
        loop {
            reader.advance()?;
            if reader.current_token() == Token::EndArray {
                return Ok(items);
            }
            items.push(self.decode(ctx, reader)?);
        }
    }

    fn read_object(
        &self,
        ctx: &Registry,
        reader: &mut TaggedReader<'_>,
    ) -> Result<HashMap<String, Value>> {
        let mut map = HashMap::new();
        loop {
            reader.advance()?;
            match reader.current_token() {
                Token::EndObject => return Ok(map),
                Token::FieldName => {
                    let key = reader.take_string()?;
                    reader.advance()?;
                    map.insert(key, self.decode(ctx, reader)?);
                }
                other => return Err(Error::unexpected("FieldName", other)),
            }
        }
    }

    pub(crate) fn write_object(
        &self,
        ctx: &Registry,
        writer: &mut TaggedWriter,
        map: &HashMap<String, Value>,
    ) -> Result<()> {
        let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let escape = needs_escape(keys.iter().copied());
        if escape {
            writer.write_start_escaped_object()?;
        } else {
            writer.write_start_object()?;
        }
        for key in keys {
            writer.write_field_name(key)?;
            if let Some(value) = map.get(key) {
                self.encode(ctx, writer, value)?;
            }
        }
        if escape {
            writer.write_end_escaped_object()
        } else {
            writer.write_end_object()
        }
    }

    fn read_document(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Value> {
        let mut fields = DocumentFields::default();
        loop {
            reader.advance()?;
            let token = reader.current_token();
            let at_data = token == Token::EndDocument
                || (token == Token::FieldName
                    && !DocumentFields::is_identity_field(reader.get_str()?));

            if at_data {
                let mapped = fields.coll.as_ref().and_then(|coll| ctx.collection(coll.name()));
                if let Some(decoder) = mapped {
                    return Ok(match decoder.resume(ctx, reader, fields, Token::EndDocument)? {
                        Decoded::Value(record) => Value::Mapped(record),
                        Decoded::Null(null) => Value::NullDocument(null),
                    });
                }
            }

            if token == Token::EndDocument {
                return Ok(fields.classify().into_value());
            }
            reader.expect(Token::FieldName)?;
            let field = reader.take_string()?;
            reader.advance()?;
            let value = self.decode(ctx, reader)?;
            fields.insert(field, value);
        }
    }
}

impl WireType for Value {
    fn shape() -> Shape {
        Shape::Dynamic
    }

    fn build_codec(_registry: &Registry, hint: Option<WireHint>) -> Result<Arc<dyn Codec<Self>>> {
        Self::shape().check_hint(hint)?;
        Ok(Arc::new(DynamicCodec))
    }
}
