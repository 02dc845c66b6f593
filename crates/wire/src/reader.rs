//! Tagged reader
//!
//! A pull-based state machine over [`JsonTokenizer`] that recognises tag
//! wrapper objects and emits the richer [`Token`] vocabulary.
//!
//! ## Disambiguation
//!
//! A `{` on the wire is either a tag wrapper or a genuine object, and only
//! the first property name tells them apart. On every `{` the reader pulls
//! one more token:
//!
//! | Next token | Emitted | Marker pushed |
//! |------------|---------|---------------|
//! | `}` | `StartObject`, then `EndObject` from the pending buffer | none |
//! | scalar tag (`@int`, `@date`, ...) | one scalar token; payload and both braces consumed | none |
//! | `@doc` / `@ref` / `@set` | `StartDocument` / `StartRef` / `StartPage` | `Document` / `Ref` / `Page` |
//! | `@object` | `StartObject` | `EscapedObject` |
//! | any other key | `StartObject`, then the key from the pending buffer | `Object` |
//!
//! Structural wrappers close with two real `}` (inner object, outer wrapper);
//! the marker popped on the inner `}` tells the reader to consume the outer
//! one and which `End*` token to emit, so every `Start*` has exactly one
//! matching `End*`.
//!
//! ## Pending buffer
//!
//! Tokens already pulled from the tokenizer but not yet delivered wait in a
//! small FIFO and are handed out before the tokenizer advances again. The
//! common case is the single property name consumed by the lookahead above.

use crate::format;
use crate::json::{JsonToken, JsonTokenizer};
use crate::tag::Tag;
use chrono::{DateTime, NaiveDate, Utc};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::fmt;
use tessera_core::{Bytes, Error, EventSource, Module, Result, WireConfig};
use tracing::trace;

/// Tokens produced by [`TaggedReader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Before the first read, or after the input is exhausted
    None,
    /// Start of a plain (possibly escaped) object
    StartObject,
    /// End of a plain object
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// Start of a `@set` page
    StartPage,
    /// End of a `@set` page
    EndPage,
    /// Start of a `@doc`
    StartDocument,
    /// End of a `@doc`
    EndDocument,
    /// Start of a `@ref`
    StartRef,
    /// End of a `@ref`
    EndRef,
    /// Object key
    FieldName,
    /// Plain string
    String,
    /// `@int`
    Int,
    /// `@long`
    Long,
    /// `@double`
    Double,
    /// `@date`
    Date,
    /// `@time`
    Time,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `@mod`
    Module,
    /// `@bytes`
    Bytes,
    /// `@stream`
    Stream,
}

impl Token {
    /// True for tokens that open a nested structure
    pub fn is_start(&self) -> bool {
        matches!(
            self,
            Token::StartObject
                | Token::StartArray
                | Token::StartPage
                | Token::StartDocument
                | Token::StartRef
        )
    }

    /// True for tokens that close a nested structure
    pub fn is_end(&self) -> bool {
        matches!(
            self,
            Token::EndObject | Token::EndArray | Token::EndPage | Token::EndDocument | Token::EndRef
        )
    }

    /// The closing token for an opening one
    pub fn end_token(&self) -> Option<Token> {
        match self {
            Token::StartObject => Some(Token::EndObject),
            Token::StartArray => Some(Token::EndArray),
            Token::StartPage => Some(Token::EndPage),
            Token::StartDocument => Some(Token::EndDocument),
            Token::StartRef => Some(Token::EndRef),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Open-object markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Object,
    EscapedObject,
    Document,
    Ref,
    Page,
}

/// Payload of the current scalar token
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    None,
    Str(String),
    Int(i32),
    Long(i64),
    Double(f64),
    Date(NaiveDate),
    Time(DateTime<Utc>),
    Bytes(Vec<u8>),
}

/// Pull-based reader over tagged JSON
pub struct TaggedReader<'a> {
    json: JsonTokenizer<'a>,
    frames: SmallVec<[Frame; 16]>,
    pending: VecDeque<(Token, Scalar)>,
    token: Token,
    scalar: Scalar,
}

impl<'a> TaggedReader<'a> {
    /// Create a reader with default limits
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, &WireConfig::default())
    }

    /// Create a reader with explicit limits
    pub fn with_config(input: &'a [u8], config: &WireConfig) -> Self {
        TaggedReader {
            json: JsonTokenizer::with_max_depth(input, config.max_depth),
            frames: SmallVec::new(),
            pending: VecDeque::new(),
            token: Token::None,
            scalar: Scalar::None,
        }
    }

    /// The token most recently read
    pub fn current_token(&self) -> Token {
        self.token
    }

    /// Advance one token; `Ok(false)` once the input is exhausted
    pub fn read(&mut self) -> Result<bool> {
        if let Some((token, scalar)) = self.pending.pop_front() {
            self.set(token, scalar);
            return Ok(true);
        }
        let json = match self.json.next_token()? {
            Some(json) => json,
            None => {
                self.set(Token::None, Scalar::None);
                return Ok(false);
            }
        };
        match json {
            JsonToken::StartObject => self.start_object()?,
            JsonToken::EndObject => self.end_object()?,
            JsonToken::StartArray => self.set(Token::StartArray, Scalar::None),
            JsonToken::EndArray => self.set(Token::EndArray, Scalar::None),
            JsonToken::PropertyName(name) => self.set(Token::FieldName, Scalar::Str(name)),
            JsonToken::String(s) => self.set(Token::String, Scalar::Str(s)),
            JsonToken::Number(raw) => self.plain_number(&raw)?,
            JsonToken::True => self.set(Token::True, Scalar::None),
            JsonToken::False => self.set(Token::False, Scalar::None),
            JsonToken::Null => self.set(Token::Null, Scalar::None),
        }
        Ok(true)
    }

    /// Advance one token, treating end of input as an error
    pub fn advance(&mut self) -> Result<()> {
        if self.read()? {
            Ok(())
        } else {
            Err(Error::UnexpectedEnd)
        }
    }

    /// Fail unless the current token is `expected`
    pub fn expect(&self, expected: Token) -> Result<()> {
        if self.token == expected {
            Ok(())
        } else {
            Err(Error::unexpected(expected.to_string(), self.token))
        }
    }

    /// Skip the current value, including everything nested inside it
    ///
    /// On return the current token is the last token of the skipped value.
    pub fn skip(&mut self) -> Result<()> {
        if !self.token.is_start() {
            return Ok(());
        }
        let mut depth = 1usize;
        while depth > 0 {
            self.advance()?;
            if self.token.is_start() {
                depth += 1;
            } else if self.token.is_end() {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Fail unless the input has been fully consumed
    pub fn finish(&mut self) -> Result<()> {
        if self.read()? {
            Err(Error::unexpected("end of input", self.token))
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Scalar accessors
    // ------------------------------------------------------------------

    /// Text of the current `String` or `FieldName`
    pub fn get_str(&self) -> Result<&str> {
        match (&self.token, &self.scalar) {
            (Token::String | Token::FieldName, Scalar::Str(s)) => Ok(s),
            _ => Err(Error::unexpected("String", self.token)),
        }
    }

    /// Owned text of the current `String` or `FieldName`
    pub fn get_string(&self) -> Result<String> {
        self.get_str().map(str::to_string)
    }

    /// Move the text of the current `String` or `FieldName` out of the reader
    pub fn take_string(&mut self) -> Result<String> {
        self.get_str()?;
        match std::mem::replace(&mut self.scalar, Scalar::None) {
            Scalar::Str(s) => Ok(s),
            _ => Err(Error::unexpected("String", self.token)),
        }
    }

    /// Current `@int`, or an `@long` that fits 32 bits
    pub fn get_int(&self) -> Result<i32> {
        match self.scalar {
            Scalar::Int(i) if self.token == Token::Int => Ok(i),
            Scalar::Long(l) if self.token == Token::Long => {
                i32::try_from(l).map_err(|_| Error::overflow(l, "i32"))
            }
            _ => Err(Error::unexpected("Int", self.token)),
        }
    }

    /// Current `@int` or `@long`
    pub fn get_long(&self) -> Result<i64> {
        match self.scalar {
            Scalar::Int(i) if self.token == Token::Int => Ok(i64::from(i)),
            Scalar::Long(l) if self.token == Token::Long => Ok(l),
            _ => Err(Error::unexpected("Long", self.token)),
        }
    }

    /// Current `@double`, widening `@int` and `@long`
    pub fn get_double(&self) -> Result<f64> {
        match self.scalar {
            Scalar::Double(d) if self.token == Token::Double => Ok(d),
            Scalar::Int(i) if self.token == Token::Int => Ok(f64::from(i)),
            Scalar::Long(l) if self.token == Token::Long => Ok(l as f64),
            _ => Err(Error::unexpected("Double", self.token)),
        }
    }

    /// Current `true` / `false`
    pub fn get_bool(&self) -> Result<bool> {
        match self.token {
            Token::True => Ok(true),
            Token::False => Ok(false),
            other => Err(Error::unexpected("Boolean", other)),
        }
    }

    /// Current `@date`
    pub fn get_date(&self) -> Result<NaiveDate> {
        match self.scalar {
            Scalar::Date(d) if self.token == Token::Date => Ok(d),
            _ => Err(Error::unexpected("Date", self.token)),
        }
    }

    /// Current `@time`
    pub fn get_time(&self) -> Result<DateTime<Utc>> {
        match self.scalar {
            Scalar::Time(t) if self.token == Token::Time => Ok(t),
            _ => Err(Error::unexpected("Time", self.token)),
        }
    }

    /// Current `@mod`
    pub fn get_module(&self) -> Result<Module> {
        match (&self.token, &self.scalar) {
            (Token::Module, Scalar::Str(name)) => Ok(Module::new(name.as_str())),
            _ => Err(Error::unexpected("Module", self.token)),
        }
    }

    /// Current `@bytes`
    pub fn get_bytes(&self) -> Result<Bytes> {
        match (&self.token, &self.scalar) {
            (Token::Bytes, Scalar::Bytes(b)) => Ok(Bytes(b.clone())),
            _ => Err(Error::unexpected("Bytes", self.token)),
        }
    }

    /// Current `@stream`
    pub fn get_stream(&self) -> Result<EventSource> {
        match (&self.token, &self.scalar) {
            (Token::Stream, Scalar::Str(t)) => Ok(EventSource::new(t.as_str())),
            _ => Err(Error::unexpected("Stream", self.token)),
        }
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    fn set(&mut self, token: Token, scalar: Scalar) {
        self.token = token;
        self.scalar = scalar;
    }

    fn next_json(&mut self) -> Result<JsonToken> {
        self.json.next_token()?.ok_or(Error::UnexpectedEnd)
    }

    fn start_object(&mut self) -> Result<()> {
        match self.next_json()? {
            JsonToken::EndObject => {
                self.set(Token::StartObject, Scalar::None);
                self.pending.push_back((Token::EndObject, Scalar::None));
                Ok(())
            }
            JsonToken::PropertyName(name) => match Tag::from_key(&name) {
                Some(tag) => {
                    trace!(tag = %tag, "tag wrapper");
                    self.start_tagged(tag)
                }
                None => {
                    self.frames.push(Frame::Object);
                    self.set(Token::StartObject, Scalar::None);
                    self.pending.push_back((Token::FieldName, Scalar::Str(name)));
                    Ok(())
                }
            },
            other => Err(Error::unexpected("property name", describe(&other))),
        }
    }

    fn start_tagged(&mut self, tag: Tag) -> Result<()> {
        match tag {
            Tag::Document => self.start_wrapped(tag, Frame::Document, Token::StartDocument),
            Tag::Ref => self.start_wrapped(tag, Frame::Ref, Token::StartRef),
            Tag::Object => self.start_wrapped(tag, Frame::EscapedObject, Token::StartObject),
            Tag::Set => self.start_set(),
            Tag::Int
            | Tag::Long
            | Tag::Double
            | Tag::Date
            | Tag::Time
            | Tag::Module
            | Tag::Bytes
            | Tag::Stream => self.read_scalar(tag),
        }
    }

    fn start_wrapped(&mut self, tag: Tag, frame: Frame, token: Token) -> Result<()> {
        match self.next_json()? {
            JsonToken::StartObject => {
                self.frames.push(frame);
                self.set(token, Scalar::None);
                Ok(())
            }
            other => Err(Error::unexpected(
                format!("object payload for {}", tag),
                describe(&other),
            )),
        }
    }

    fn start_set(&mut self) -> Result<()> {
        match self.next_json()? {
            JsonToken::StartObject => {
                self.frames.push(Frame::Page);
                self.set(Token::StartPage, Scalar::None);
                Ok(())
            }
            JsonToken::String(cursor) => {
                // Unmaterialized set: present it as a page holding only a cursor.
                self.expect_wrapper_end(Tag::Set)?;
                self.set(Token::StartPage, Scalar::None);
                self.pending
                    .push_back((Token::FieldName, Scalar::Str("after".to_string())));
                self.pending.push_back((Token::String, Scalar::Str(cursor)));
                self.pending.push_back((Token::EndPage, Scalar::None));
                Ok(())
            }
            other => Err(Error::unexpected(
                "object or cursor payload for @set",
                describe(&other),
            )),
        }
    }

    fn read_scalar(&mut self, tag: Tag) -> Result<()> {
        let payload = match self.next_json()? {
            JsonToken::String(s) => s,
            other => {
                return Err(Error::unexpected(
                    format!("string payload for {}", tag),
                    describe(&other),
                ))
            }
        };
        let (token, scalar) = match tag {
            Tag::Int => (Token::Int, Scalar::Int(format::parse_int(&payload)?)),
            Tag::Long => (Token::Long, Scalar::Long(format::parse_long(&payload)?)),
            Tag::Double => (Token::Double, Scalar::Double(format::parse_double(&payload)?)),
            Tag::Date => (Token::Date, Scalar::Date(format::parse_date(&payload)?)),
            Tag::Time => (Token::Time, Scalar::Time(format::parse_time(&payload)?)),
            Tag::Bytes => (Token::Bytes, Scalar::Bytes(format::parse_bytes(&payload)?)),
            Tag::Module => (Token::Module, Scalar::Str(payload)),
            Tag::Stream => (Token::Stream, Scalar::Str(payload)),
            Tag::Document | Tag::Ref | Tag::Set | Tag::Object => {
                return Err(Error::unexpected("scalar tag", tag));
            }
        };
        self.expect_wrapper_end(tag)?;
        self.set(token, scalar);
        Ok(())
    }

    fn expect_wrapper_end(&mut self, tag: Tag) -> Result<()> {
        match self.next_json()? {
            JsonToken::EndObject => Ok(()),
            other => Err(Error::unexpected(
                format!("end of {} wrapper", tag),
                describe(&other),
            )),
        }
    }

    fn end_object(&mut self) -> Result<()> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| Error::Unbalanced("object closed without a matching open".into()))?;
        let token = match frame {
            Frame::Object => Token::EndObject,
            Frame::EscapedObject => {
                self.expect_wrapper_end(Tag::Object)?;
                Token::EndObject
            }
            Frame::Document => {
                self.expect_wrapper_end(Tag::Document)?;
                Token::EndDocument
            }
            Frame::Ref => {
                self.expect_wrapper_end(Tag::Ref)?;
                Token::EndRef
            }
            Frame::Page => {
                self.expect_wrapper_end(Tag::Set)?;
                Token::EndPage
            }
        };
        self.set(token, Scalar::None);
        Ok(())
    }

    fn plain_number(&mut self, raw: &str) -> Result<()> {
        let is_integral = !raw.contains(['.', 'e', 'E']);
        if is_integral {
            if let Ok(i) = raw.parse::<i32>() {
                self.set(Token::Int, Scalar::Int(i));
                return Ok(());
            }
            if let Ok(l) = raw.parse::<i64>() {
                self.set(Token::Long, Scalar::Long(l));
                return Ok(());
            }
        }
        let d = raw.parse::<f64>().map_err(|_| Error::InvalidJson {
            offset: self.json.offset(),
            reason: format!("invalid number {}", raw),
        })?;
        self.set(Token::Double, Scalar::Double(d));
        Ok(())
    }
}

fn describe(token: &JsonToken) -> String {
    match token {
        JsonToken::PropertyName(name) => format!("property {:?}", name),
        JsonToken::String(_) => "string".to_string(),
        JsonToken::Number(raw) => format!("number {}", raw),
        other => format!("{:?}", other),
    }
}
