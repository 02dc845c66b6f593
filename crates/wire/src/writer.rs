//! Tagged writer
//!
//! Produces tagged JSON text into an in-memory buffer. Scalars with no native
//! JSON form are emitted as single-key wrapper objects whose payload comes
//! from [`crate::format`], so the writer and [`crate::TaggedReader`] share one
//! canonical grammar.
//!
//! The writer tracks open containers only to place commas and to reject
//! mismatched `write_end_*` calls. Whether an object needs the `@object`
//! escape is the caller's decision ([`crate::needs_escape`]).

use crate::format;
use crate::json::{format_double, format_float, write_string};
use crate::tag::Tag;
use chrono::{DateTime, NaiveDate, Utc};
use smallvec::SmallVec;
use tessera_core::{Error, EventSource, Module, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    EscapedObject,
    Array,
    Ref,
    Document,
    Page,
}

impl Container {
    fn is_keyed(&self) -> bool {
        !matches!(self, Container::Array)
    }

    fn close(&self) -> &'static str {
        match self {
            Container::Object => "}",
            Container::Array => "]",
            Container::EscapedObject | Container::Ref | Container::Document | Container::Page => {
                "}}"
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    container: Container,
    has_items: bool,
    after_field: bool,
}

/// Forward-only writer of tagged JSON
#[derive(Debug, Default)]
pub struct TaggedWriter {
    out: String,
    frames: SmallVec<[Frame; 16]>,
    root_written: bool,
}

impl TaggedWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with a pre-sized buffer
    pub fn with_capacity(capacity: usize) -> Self {
        TaggedWriter {
            out: String::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Text written so far
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Current container nesting
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Consume the writer, returning the text
    ///
    /// Fails if any container is still open.
    pub fn finish(self) -> Result<String> {
        if let Some(frame) = self.frames.last() {
            return Err(Error::Unbalanced(format!(
                "{:?} left open at end of output",
                frame.container
            )));
        }
        Ok(self.out)
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    /// `{`
    pub fn write_start_object(&mut self) -> Result<()> {
        self.open(Container::Object, "{")
    }

    /// `}`
    pub fn write_end_object(&mut self) -> Result<()> {
        self.close(Container::Object)
    }

    /// `{"@object":{`
    pub fn write_start_escaped_object(&mut self) -> Result<()> {
        self.open(Container::EscapedObject, "{\"@object\":{")
    }

    /// `}}` closing an escaped object
    pub fn write_end_escaped_object(&mut self) -> Result<()> {
        self.close(Container::EscapedObject)
    }

    /// `[`
    pub fn write_start_array(&mut self) -> Result<()> {
        self.open(Container::Array, "[")
    }

    /// `]`
    pub fn write_end_array(&mut self) -> Result<()> {
        self.close(Container::Array)
    }

    /// `{"@ref":{`
    pub fn write_start_ref(&mut self) -> Result<()> {
        self.open(Container::Ref, "{\"@ref\":{")
    }

    /// `}}` closing a ref
    pub fn write_end_ref(&mut self) -> Result<()> {
        self.close(Container::Ref)
    }

    /// `{"@doc":{`
    pub fn write_start_document(&mut self) -> Result<()> {
        self.open(Container::Document, "{\"@doc\":{")
    }

    /// `}}` closing a document
    pub fn write_end_document(&mut self) -> Result<()> {
        self.close(Container::Document)
    }

    /// `{"@set":{`
    pub fn write_start_page(&mut self) -> Result<()> {
        self.open(Container::Page, "{\"@set\":{")
    }

    /// `}}` closing a page
    pub fn write_end_page(&mut self) -> Result<()> {
        self.close(Container::Page)
    }

    /// Object key; must be followed by exactly one value
    pub fn write_field_name(&mut self, name: &str) -> Result<()> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| Error::Encode(format!("field {:?} outside of an object", name)))?;
        if !frame.container.is_keyed() {
            return Err(Error::Encode(format!("field {:?} inside an array", name)));
        }
        if frame.after_field {
            return Err(Error::Encode(format!(
                "field {:?} written before the previous field's value",
                name
            )));
        }
        if frame.has_items {
            self.out.push(',');
        }
        frame.has_items = true;
        frame.after_field = true;
        write_string(&mut self.out, name);
        self.out.push(':');
        Ok(())
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Plain JSON string
    pub fn write_string_value(&mut self, value: &str) -> Result<()> {
        self.begin_value()?;
        write_string(&mut self.out, value);
        Ok(())
    }

    /// `true` / `false`
    pub fn write_bool_value(&mut self, value: bool) -> Result<()> {
        self.raw(if value { "true" } else { "false" })
    }

    /// `null`
    pub fn write_null_value(&mut self) -> Result<()> {
        self.raw("null")
    }

    /// `{"@int":"..."}`
    pub fn write_int_value(&mut self, value: i32) -> Result<()> {
        self.write_tagged_value(Tag::Int, &value.to_string())
    }

    /// `{"@long":"..."}`
    pub fn write_long_value(&mut self, value: i64) -> Result<()> {
        self.write_tagged_value(Tag::Long, &value.to_string())
    }

    /// `{"@double":"..."}`
    pub fn write_double_value(&mut self, value: f64) -> Result<()> {
        self.write_tagged_value(Tag::Double, &format_double(value))
    }

    /// `{"@double":"..."}` formatted at single precision
    pub fn write_float_value(&mut self, value: f32) -> Result<()> {
        self.write_tagged_value(Tag::Double, &format_float(value))
    }

    /// `{"@date":"yyyy-MM-dd"}`
    pub fn write_date_value(&mut self, value: &NaiveDate) -> Result<()> {
        self.write_tagged_value(Tag::Date, &format::format_date(value))
    }

    /// `{"@time":"...Z"}`
    pub fn write_time_value(&mut self, value: &DateTime<Utc>) -> Result<()> {
        self.write_tagged_value(Tag::Time, &format::format_time(value))
    }

    /// `{"@mod":"..."}`
    pub fn write_module_value(&mut self, value: &Module) -> Result<()> {
        self.write_tagged_value(Tag::Module, value.name())
    }

    /// `{"@bytes":"..."}`
    pub fn write_bytes_value(&mut self, value: &[u8]) -> Result<()> {
        self.write_tagged_value(Tag::Bytes, &format::format_bytes(value))
    }

    /// `{"@stream":"..."}`
    pub fn write_stream_value(&mut self, value: &EventSource) -> Result<()> {
        self.write_tagged_value(Tag::Stream, value.token())
    }

    /// Scalar wrapper `{"<tag>":"<payload>"}`
    ///
    /// The payload is written verbatim; it must already be canonical for the
    /// tag.
    pub fn write_tagged_value(&mut self, tag: Tag, payload: &str) -> Result<()> {
        if !tag.is_scalar() {
            return Err(Error::Encode(format!("{} is not a scalar tag", tag)));
        }
        self.begin_value()?;
        self.out.push_str("{\"");
        self.out.push_str(tag.as_str());
        self.out.push_str("\":");
        write_string(&mut self.out, payload);
        self.out.push('}');
        Ok(())
    }

    // ------------------------------------------------------------------
    // Field shorthands
    // ------------------------------------------------------------------

    /// Field name followed by a plain string
    pub fn write_string(&mut self, field: &str, value: &str) -> Result<()> {
        self.write_field_name(field)?;
        self.write_string_value(value)
    }

    /// Field name followed by a boolean
    pub fn write_bool(&mut self, field: &str, value: bool) -> Result<()> {
        self.write_field_name(field)?;
        self.write_bool_value(value)
    }

    /// Field name followed by `null`
    pub fn write_null(&mut self, field: &str) -> Result<()> {
        self.write_field_name(field)?;
        self.write_null_value()
    }

    /// Field name followed by an `@int`
    pub fn write_int(&mut self, field: &str, value: i32) -> Result<()> {
        self.write_field_name(field)?;
        self.write_int_value(value)
    }

    /// Field name followed by an `@long`
    pub fn write_long(&mut self, field: &str, value: i64) -> Result<()> {
        self.write_field_name(field)?;
        self.write_long_value(value)
    }

    /// Field name followed by an `@double`
    pub fn write_double(&mut self, field: &str, value: f64) -> Result<()> {
        self.write_field_name(field)?;
        self.write_double_value(value)
    }

    /// Field name followed by an `@date`
    pub fn write_date(&mut self, field: &str, value: &NaiveDate) -> Result<()> {
        self.write_field_name(field)?;
        self.write_date_value(value)
    }

    /// Field name followed by an `@time`
    pub fn write_time(&mut self, field: &str, value: &DateTime<Utc>) -> Result<()> {
        self.write_field_name(field)?;
        self.write_time_value(value)
    }

    /// Field name followed by an `@mod`
    pub fn write_module(&mut self, field: &str, value: &Module) -> Result<()> {
        self.write_field_name(field)?;
        self.write_module_value(value)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn begin_value(&mut self) -> Result<()> {
        match self.frames.last_mut() {
            None => {
                if self.root_written {
                    return Err(Error::Encode("more than one root value".into()));
                }
                self.root_written = true;
            }
            Some(frame) if frame.container.is_keyed() => {
                if !frame.after_field {
                    return Err(Error::Encode("object value written without a field name".into()));
                }
                frame.after_field = false;
            }
            Some(frame) => {
                if frame.has_items {
                    self.out.push(',');
                }
                frame.has_items = true;
            }
        }
        Ok(())
    }

    fn raw(&mut self, text: &str) -> Result<()> {
        self.begin_value()?;
        self.out.push_str(text);
        Ok(())
    }

    fn open(&mut self, container: Container, text: &str) -> Result<()> {
        self.begin_value()?;
        self.out.push_str(text);
        self.frames.push(Frame {
            container,
            has_items: false,
            after_field: false,
        });
        Ok(())
    }

    fn close(&mut self, container: Container) -> Result<()> {
        let frame = self.frames.pop().ok_or_else(|| {
            Error::Unbalanced(format!("end of {:?} without a matching start", container))
        })?;
        if frame.container != container {
            return Err(Error::Unbalanced(format!(
                "end of {:?} while {:?} is open",
                container, frame.container
            )));
        }
        if frame.after_field {
            return Err(Error::Encode(format!(
                "{:?} closed after a field name with no value",
                container
            )));
        }
        self.out.push_str(container.close());
        Ok(())
    }
}
