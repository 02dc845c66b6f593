//! Query serialization
//!
//! A [`Query`] is a sequence of fragments produced by the query compiler:
//! literal text, interpolated values, and nested queries. On the wire:
//!
//! ```text
//! {"fql":["Users.byId(",{"value":{"@int":"1"}},")"]}
//! ```
//!
//! Nested queries are written inline as their own `{"fql":[...]}` object.

use crate::codec::{Codec, WireType};
use crate::registry::Registry;
use crate::shape::{Shape, WireHint};
use std::sync::Arc;
use tessera_core::{Error, Result, Value};
use tessera_wire::{TaggedReader, TaggedWriter, Token};

const FQL: &str = "fql";
const VALUE: &str = "value";

/// One piece of a query
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Query text
    Literal(String),
    /// An interpolated argument
    Value(Value),
    /// A nested query
    Query(Query),
}

/// Query text with interpolated values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    fragments: Vec<Fragment>,
}

impl Query {
    /// Empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Query consisting of a single literal
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new().lit(text)
    }

    /// Append literal text, merging with a preceding literal
    pub fn push_literal(&mut self, text: impl Into<String>) {
        let text = text.into();
        if let Some(Fragment::Literal(last)) = self.fragments.last_mut() {
            last.push_str(&text);
        } else {
            self.fragments.push(Fragment::Literal(text));
        }
    }

    /// Append an interpolated value
    pub fn push_value(&mut self, value: impl Into<Value>) {
        self.fragments.push(Fragment::Value(value.into()));
    }

    /// Append a nested query
    pub fn push_query(&mut self, query: Query) {
        self.fragments.push(Fragment::Query(query));
    }

    /// Builder form of [`push_literal`](Self::push_literal)
    pub fn lit(mut self, text: impl Into<String>) -> Self {
        self.push_literal(text);
        self
    }

    /// Builder form of [`push_value`](Self::push_value)
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.push_value(value);
        self
    }

    /// Builder form of [`push_query`](Self::push_query)
    pub fn sub(mut self, query: Query) -> Self {
        self.push_query(query);
        self
    }

    /// Fragments in order
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// True when there are no fragments
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Codec for [`Query`]
pub struct QueryCodec;

impl QueryCodec {
    fn read_fragments(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Query> {
        reader.expect(Token::StartArray)?;
        let mut query = Query::new();
        loop {
            reader.advance()?;
            match reader.current_token() {
                Token::EndArray => return Ok(query),
                Token::String => query.fragments.push(Fragment::Literal(reader.take_string()?)),
                Token::StartObject => {
                    reader.advance()?;
                    reader.expect(Token::FieldName)?;
                    let key = reader.take_string()?;
                    reader.advance()?;
                    let fragment = match key.as_str() {
                        VALUE => Fragment::Value(ctx.decode_value(reader)?),
                        FQL => Fragment::Query(self.read_fragments(ctx, reader)?),
                        other => {
                            return Err(Error::unexpected(
                                "value or fql fragment",
                                format!("field {:?}", other),
                            ))
                        }
                    };
                    reader.advance()?;
                    reader.expect(Token::EndObject)?;
                    query.fragments.push(fragment);
                }
                other => return Err(Error::unexpected("query fragment", other)),
            }
        }
    }
}

impl Codec<Query> for QueryCodec {
    fn decode(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Query> {
        reader.expect(Token::StartObject)?;
        reader.advance()?;
        reader.expect(Token::FieldName)?;
        if reader.get_str()? != FQL {
            return Err(Error::unexpected("fql", format!("field {:?}", reader.get_str()?)));
        }
        reader.advance()?;
        let query = self.read_fragments(ctx, reader)?;
        reader.advance()?;
        reader.expect(Token::EndObject)?;
        Ok(query)
    }

    fn encode(&self, ctx: &Registry, writer: &mut TaggedWriter, value: &Query) -> Result<()> {
        writer.write_start_object()?;
        writer.write_field_name(FQL)?;
        writer.write_start_array()?;
        for fragment in &value.fragments {
            match fragment {
                Fragment::Literal(text) => writer.write_string_value(text)?,
                Fragment::Value(v) => {
                    writer.write_start_object()?;
                    writer.write_field_name(VALUE)?;
                    ctx.encode_value(writer, v)?;
                    writer.write_end_object()?;
                }
                Fragment::Query(q) => self.encode(ctx, writer, q)?,
            }
        }
        writer.write_end_array()?;
        writer.write_end_object()
    }
}

impl WireType for Query {
    fn shape() -> Shape {
        Shape::Query
    }

    fn build_codec(_registry: &Registry, hint: Option<WireHint>) -> Result<Arc<dyn Codec<Self>>> {
        Self::shape().check_hint(hint)?;
        Ok(Arc::new(QueryCodec))
    }
}
