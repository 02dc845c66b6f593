//! `@set` page codec

use crate::codec::{Codec, WireType};
use crate::collection::ListCodec;
use crate::registry::Registry;
use crate::shape::{Shape, WireHint};
use std::sync::Arc;
use tessera_core::{Error, Page, Result};
use tessera_wire::{TaggedReader, TaggedWriter, Token};
use tracing::trace;

/// Codec for [`Page<T>`]
///
/// `after` is omitted on encode when absent, and a `null` cursor decodes as
/// absent.
pub struct PageCodec<T> {
    inner: Arc<dyn Codec<T>>,
}

impl<T: WireType> Codec<Page<T>> for PageCodec<T> {
    fn decode(&self, ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<Page<T>> {
        read_page(reader, |reader| {
            ListCodec::read_elements(self.inner.as_ref(), ctx, reader)
        })
    }

    fn encode(&self, ctx: &Registry, writer: &mut TaggedWriter, value: &Page<T>) -> Result<()> {
        writer.write_start_page()?;
        writer.write_field_name("data")?;
        ListCodec::write_elements(self.inner.as_ref(), ctx, writer, &value.data)?;
        if let Some(after) = &value.after {
            writer.write_string("after", after)?;
        }
        writer.write_end_page()
    }
}

/// Read a `StartPage` .. `EndPage` run, delegating `data` to `read_data`
///
/// The reader must be on `StartPage`; `read_data` is entered on the token
/// after the `data` field name.
pub(crate) fn read_page<T>(
    reader: &mut TaggedReader<'_>,
    mut read_data: impl FnMut(&mut TaggedReader<'_>) -> Result<Vec<T>>,
) -> Result<Page<T>> {
    reader.expect(Token::StartPage)?;
    let mut page = Page::default();
    loop {
        reader.advance()?;
        match reader.current_token() {
            Token::EndPage => return Ok(page),
            Token::FieldName => {
                let field = reader.take_string()?;
                reader.advance()?;
                match field.as_str() {
                    "data" => page.data = read_data(reader)?,
                    "after" => {
                        page.after = match reader.current_token() {
                            Token::Null => None,
                            _ => Some(reader.take_string()?),
                        }
                    }
                    _ => {
                        trace!(field = %field, "skipping unknown page field");
                        reader.skip()?;
                    }
                }
            }
            other => return Err(Error::unexpected("FieldName", other)),
        }
    }
}

impl<T: WireType> WireType for Page<T> {
    fn shape() -> Shape {
        Shape::Page(Box::new(T::shape()))
    }

    fn build_codec(registry: &Registry, hint: Option<WireHint>) -> Result<Arc<dyn Codec<Self>>> {
        Ok(Arc::new(PageCodec {
            inner: registry.resolve::<T>(hint)?,
        }))
    }
}
