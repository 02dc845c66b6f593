//! Pull-based JSON tokenizer
//!
//! Produces one structural or scalar token per call over a UTF-8 byte buffer.
//! The tokenizer knows nothing about tags; it only enforces JSON grammar:
//! - commas and colons in the right places
//! - balanced `{}` / `[]`
//! - a single top-level value with nothing but whitespace after it
//! - string escapes, including `\uXXXX` surrogate pairs
//!
//! Numbers are surfaced as their raw text; interpretation is left to the
//! caller.

use smallvec::SmallVec;
use tessera_core::config::DEFAULT_MAX_DEPTH;
use tessera_core::{Error, Result};

/// A generic JSON token
#[derive(Debug, Clone, PartialEq)]
pub enum JsonToken {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// Object key (the following `:` is consumed with it)
    PropertyName(String),
    /// String value
    String(String),
    /// Number value, raw text
    Number(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the grammar allows next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Value,
    ValueOrEnd,
    Key,
    KeyOrEnd,
    CommaOrEnd,
    Done,
}

/// JSON tokenizer over a byte buffer
pub struct JsonTokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    stack: SmallVec<[Container; 32]>,
    state: State,
    max_depth: usize,
}

impl<'a> JsonTokenizer<'a> {
    /// Create a tokenizer with the default nesting limit
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_max_depth(input, DEFAULT_MAX_DEPTH)
    }

    /// Create a tokenizer that rejects nesting deeper than `max_depth`
    pub fn with_max_depth(input: &'a [u8], max_depth: usize) -> Self {
        JsonTokenizer {
            input,
            pos: 0,
            stack: SmallVec::new(),
            state: State::Value,
            max_depth,
        }
    }

    /// Current byte offset
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Current container nesting
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Read the next token; `Ok(None)` once the single top-level value is done
    pub fn next_token(&mut self) -> Result<Option<JsonToken>> {
        loop {
            self.skip_whitespace();
            match self.state {
                State::Done => {
                    return match self.peek() {
                        None => Ok(None),
                        Some(_) => Err(self.error("trailing characters after JSON value")),
                    };
                }
                State::Value => return self.read_value().map(Some),
                State::ValueOrEnd => {
                    if self.peek() == Some(b']') {
                        self.pos += 1;
                        return Ok(Some(self.close(Container::Array)));
                    }
                    self.state = State::Value;
                }
                State::KeyOrEnd => {
                    if self.peek() == Some(b'}') {
                        self.pos += 1;
                        return Ok(Some(self.close(Container::Object)));
                    }
                    self.state = State::Key;
                }
                State::Key => return self.read_key().map(Some),
                State::CommaOrEnd => {
                    let top = self.stack.last().copied();
                    match (self.peek(), top) {
                        (None, _) => return Err(Error::UnexpectedEnd),
                        (Some(b','), Some(Container::Array)) => {
                            self.pos += 1;
                            self.state = State::Value;
                        }
                        (Some(b','), Some(Container::Object)) => {
                            self.pos += 1;
                            self.state = State::Key;
                        }
                        (Some(b']'), Some(Container::Array)) => {
                            self.pos += 1;
                            return Ok(Some(self.close(Container::Array)));
                        }
                        (Some(b'}'), Some(Container::Object)) => {
                            self.pos += 1;
                            return Ok(Some(self.close(Container::Object)));
                        }
                        (Some(c), _) => return Err(self.unexpected_char(c)),
                    }
                }
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::InvalidJson {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn unexpected_char(&self, c: u8) -> Error {
        self.error(format!("unexpected character {:?}", c as char))
    }

    fn after_value(&self) -> State {
        if self.stack.is_empty() {
            State::Done
        } else {
            State::CommaOrEnd
        }
    }

    fn open(&mut self, kind: Container) -> Result<JsonToken> {
        if self.stack.len() >= self.max_depth {
            return Err(Error::DepthExceeded(self.max_depth));
        }
        self.pos += 1;
        self.stack.push(kind);
        Ok(match kind {
            Container::Object => {
                self.state = State::KeyOrEnd;
                JsonToken::StartObject
            }
            Container::Array => {
                self.state = State::ValueOrEnd;
                JsonToken::StartArray
            }
        })
    }

    fn close(&mut self, kind: Container) -> JsonToken {
        self.stack.pop();
        self.state = self.after_value();
        match kind {
            Container::Object => JsonToken::EndObject,
            Container::Array => JsonToken::EndArray,
        }
    }

    fn read_key(&mut self) -> Result<JsonToken> {
        match self.peek() {
            Some(b'"') => {}
            None => return Err(Error::UnexpectedEnd),
            Some(_) => return Err(self.error("expected string key")),
        }
        let key = self.read_string()?;
        self.skip_whitespace();
        match self.peek() {
            Some(b':') => self.pos += 1,
            None => return Err(Error::UnexpectedEnd),
            Some(_) => return Err(self.error("expected ':'")),
        }
        self.state = State::Value;
        Ok(JsonToken::PropertyName(key))
    }

    fn read_value(&mut self) -> Result<JsonToken> {
        let token = match self.peek() {
            None => return Err(Error::UnexpectedEnd),
            Some(b'{') => return self.open(Container::Object),
            Some(b'[') => return self.open(Container::Array),
            Some(b'"') => JsonToken::String(self.read_string()?),
            Some(b't') => {
                self.expect_literal("true")?;
                JsonToken::True
            }
            Some(b'f') => {
                self.expect_literal("false")?;
                JsonToken::False
            }
            Some(b'n') => {
                self.expect_literal("null")?;
                JsonToken::Null
            }
            Some(c) if c == b'-' || c.is_ascii_digit() => JsonToken::Number(self.read_number()?),
            Some(c) => return Err(self.unexpected_char(c)),
        };
        self.state = self.after_value();
        Ok(token)
    }

    fn expect_literal(&mut self, literal: &str) -> Result<()> {
        let rest = &self.input[self.pos..];
        if rest.starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            Ok(())
        } else if literal.as_bytes().starts_with(rest) {
            Err(Error::UnexpectedEnd)
        } else {
            Err(self.error(format!("expected '{}'", literal)))
        }
    }

    fn read_number(&mut self) -> Result<String> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(c) if c.is_ascii_digit() => self.skip_digits(),
            Some(_) => return Err(self.error("expected digit")),
            None => return Err(Error::UnexpectedEnd),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(self.error("expected digit after decimal point"));
            }
            self.skip_digits();
        }
        if let Some(b'e' | b'E') = self.peek() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek() {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                return Err(self.error("expected digit in exponent"));
            }
            self.skip_digits();
        }
        // Only ASCII was consumed above.
        Ok(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn read_string(&mut self) -> Result<String> {
        self.pos += 1; // opening quote
        let mut out = Vec::new();
        loop {
            let start = self.pos;
            while let Some(b) = self.peek() {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            out.extend_from_slice(&self.input[start..self.pos]);
            match self.peek() {
                None => return Err(Error::UnexpectedEnd),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    self.read_escape(&mut out)?;
                }
                Some(_) => return Err(self.error("control character in string")),
            }
        }
        String::from_utf8(out).map_err(|_| self.error("invalid UTF-8 in string"))
    }

    fn read_escape(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let c = self.peek().ok_or(Error::UnexpectedEnd)?;
        self.pos += 1;
        let byte = match c {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let ch = self.read_unicode_escape()?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                return Ok(());
            }
            other => return Err(self.error(format!("invalid escape \\{}", other as char))),
        };
        out.push(byte);
        Ok(())
    }

    fn read_unicode_escape(&mut self) -> Result<char> {
        let high = self.read_hex4()?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if self.input.get(self.pos) != Some(&b'\\')
                || self.input.get(self.pos + 1) != Some(&b'u')
            {
                return Err(self.error("unpaired surrogate in unicode escape"));
            }
            self.pos += 2;
            let low = self.read_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.error("invalid low surrogate in unicode escape"));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| self.error("invalid unicode codepoint"))
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let end = self.pos + 4;
        if end > self.input.len() {
            return Err(Error::UnexpectedEnd);
        }
        let hex = std::str::from_utf8(&self.input[self.pos..end])
            .map_err(|_| self.error("invalid unicode escape"))?;
        let code =
            u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos = end;
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Result<Vec<JsonToken>> {
        let mut t = JsonTokenizer::new(input.as_bytes());
        let mut out = Vec::new();
        while let Some(tok) = t.next_token()? {
            out.push(tok);
        }
        Ok(out)
    }

    fn key(s: &str) -> JsonToken {
        JsonToken::PropertyName(s.to_string())
    }

    fn string(s: &str) -> JsonToken {
        JsonToken::String(s.to_string())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(tokens("null").unwrap(), vec![JsonToken::Null]);
        assert_eq!(tokens(" true ").unwrap(), vec![JsonToken::True]);
        assert_eq!(tokens("false").unwrap(), vec![JsonToken::False]);
        assert_eq!(tokens(r#""hi""#).unwrap(), vec![string("hi")]);
        assert_eq!(
            tokens("-12.5e3").unwrap(),
            vec![JsonToken::Number("-12.5e3".into())]
        );
    }

    #[test]
    fn test_nested_structure() {
        let toks = tokens(r#"{"a":[1,{"b":null}],"c":"d"}"#).unwrap();
        assert_eq!(
            toks,
            vec![
                JsonToken::StartObject,
                key("a"),
                JsonToken::StartArray,
                JsonToken::Number("1".into()),
                JsonToken::StartObject,
                key("b"),
                JsonToken::Null,
                JsonToken::EndObject,
                JsonToken::EndArray,
                key("c"),
                string("d"),
                JsonToken::EndObject,
            ]
        );
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(
            tokens("{}").unwrap(),
            vec![JsonToken::StartObject, JsonToken::EndObject]
        );
        assert_eq!(
            tokens("[ ]").unwrap(),
            vec![JsonToken::StartArray, JsonToken::EndArray]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#""a\n\t\"b\\\/""#).unwrap(),
            vec![string("a\n\t\"b\\/")]
        );
        assert_eq!(tokens(r#""é""#).unwrap(), vec![string("é")]);
        assert_eq!(tokens(r#""😀""#).unwrap(), vec![string("😀")]);
        assert_eq!(tokens("\"日本語\"").unwrap(), vec![string("日本語")]);
    }

    #[test]
    fn test_unpaired_surrogate_rejected() {
        assert!(matches!(
            tokens(r#""\ud83d""#),
            Err(Error::InvalidJson { .. })
        ));
        assert!(matches!(
            tokens(r#""\ude00""#),
            Err(Error::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_grammar_errors() {
        assert!(matches!(tokens(""), Err(Error::UnexpectedEnd)));
        assert!(matches!(tokens("{"), Err(Error::UnexpectedEnd)));
        assert!(matches!(tokens("[1,]"), Err(Error::InvalidJson { .. })));
        assert!(matches!(tokens(r#"{"a" 1}"#), Err(Error::InvalidJson { .. })));
        assert!(matches!(tokens(r#"{"a":1,}"#), Err(Error::InvalidJson { .. })));
        assert!(matches!(tokens("[1}"), Err(Error::InvalidJson { .. })));
        assert!(matches!(tokens("01"), Err(Error::InvalidJson { .. })));
        assert!(matches!(tokens("1."), Err(Error::InvalidJson { .. })));
        assert!(matches!(tokens("tru"), Err(Error::UnexpectedEnd)));
        assert!(matches!(tokens("nul1"), Err(Error::InvalidJson { .. })));
    }

    #[test]
    fn test_trailing_content_rejected() {
        let err = tokens("1 2").unwrap_err();
        assert!(matches!(err, Error::InvalidJson { offset: 2, .. }));
    }

    #[test]
    fn test_depth_limit() {
        let mut t = JsonTokenizer::with_max_depth(b"[[[1]]]", 2);
        assert_eq!(t.next_token().unwrap(), Some(JsonToken::StartArray));
        assert_eq!(t.next_token().unwrap(), Some(JsonToken::StartArray));
        assert_eq!(t.next_token(), Err(Error::DepthExceeded(2)));
    }

    #[test]
    fn test_control_character_rejected() {
        assert!(matches!(
            tokens("\"a\u{0001}b\""),
            Err(Error::InvalidJson { .. })
        ));
    }
}
