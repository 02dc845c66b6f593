//! Request and response envelopes
//!
//! A request wraps a [`Query`] and its named arguments:
//!
//! ```text
//! {"query":{"fql":[...]},"arguments":{"x":{"@int":"1"}}}
//! ```
//!
//! A response is a plain JSON object. Its `data` field is tagged and decoded
//! into the caller's target; everything else is bookkeeping read here.
//!
//! | Field | Type |
//! |-------|------|
//! | `data` | tagged value (success only) |
//! | `error` | `{code, message, abort?}` (failure only) |
//! | `static_type` | string |
//! | `summary` | string |
//! | `txn_ts` | integer |
//! | `schema_version` | integer |
//! | `query_tags` | `"k=v,k2=v2"` or object |
//! | `stats` | [`QueryStats`] |

use crate::codec::{Codec, WireType};
use crate::dynamic::DynamicCodec;
use crate::query::{Query, QueryCodec};
use crate::registry::Registry;
use std::collections::HashMap;
use tessera_core::{Error, Result, Value};
use tessera_wire::{TaggedReader, TaggedWriter, Token};
use tracing::trace;

// ============================================================================
// Request
// ============================================================================

/// A query with named arguments, ready to send
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    /// The query
    pub query: Query,
    /// Named arguments bound in the query
    pub arguments: HashMap<String, Value>,
}

impl QueryRequest {
    /// Request with no arguments
    pub fn new(query: Query) -> Self {
        Self {
            query,
            arguments: HashMap::new(),
        }
    }

    /// Bind a named argument
    pub fn argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Encode the request body
    ///
    /// `arguments` is always written, possibly empty.
    pub fn encode(&self, ctx: &Registry) -> Result<String> {
        let mut writer = TaggedWriter::new();
        writer.write_start_object()?;
        writer.write_field_name("query")?;
        QueryCodec.encode(ctx, &mut writer, &self.query)?;
        writer.write_field_name("arguments")?;
        DynamicCodec.write_object(ctx, &mut writer, &self.arguments)?;
        writer.write_end_object()?;
        writer.finish()
    }
}

// ============================================================================
// Response
// ============================================================================

/// Execution statistics reported with every response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Compute operations consumed
    pub compute_ops: i64,
    /// Read operations consumed
    pub read_ops: i64,
    /// Write operations consumed
    pub write_ops: i64,
    /// Server-side execution time
    pub query_time_ms: i64,
    /// Retries caused by transaction contention
    pub contention_retries: i64,
    /// Bytes read from storage
    pub storage_bytes_read: i64,
    /// Bytes written to storage
    pub storage_bytes_write: i64,
    /// Which rate limits were hit, if any
    pub rate_limits_hit: Vec<String>,
}

/// A successful response
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySuccess<T> {
    /// Decoded result
    pub data: T,
    /// Static type of the result, when type checking is on
    pub static_type: Option<String>,
    /// Informational summary
    pub summary: Option<String>,
    /// Transaction timestamp in microseconds
    pub txn_ts: Option<i64>,
    /// Schema version the query ran against
    pub schema_version: Option<i64>,
    /// Tags echoed back from the request
    pub query_tags: HashMap<String, String>,
    /// Execution statistics
    pub stats: QueryStats,
}

/// A failed response
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFailure {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Value passed to `abort()`, for aborted queries
    pub abort: Option<Value>,
    /// Informational summary
    pub summary: Option<String>,
    /// Transaction timestamp in microseconds
    pub txn_ts: Option<i64>,
    /// Tags echoed back from the request
    pub query_tags: HashMap<String, String>,
    /// Execution statistics
    pub stats: QueryStats,
}

/// Either outcome of a query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse<T> {
    /// Query ran and produced `data`
    Success(QuerySuccess<T>),
    /// Query failed with an `error`
    Failure(QueryFailure),
}

#[derive(Default)]
struct ErrorInfo {
    code: String,
    message: String,
    abort: Option<Value>,
}

impl<T: WireType> QueryResponse<T> {
    /// Decode a response body, decoding `data` as `T`
    ///
    /// A body carrying `error` is a failure even if `data` is also present.
    pub fn decode(ctx: &Registry, input: &[u8]) -> Result<Self> {
        let codec = ctx.resolve::<T>(None)?;
        let mut reader = ctx.reader(input);
        reader.advance()?;
        reader.expect(Token::StartObject)?;

        let mut data = None;
        let mut error = None;
        let mut static_type = None;
        let mut summary = None;
        let mut txn_ts = None;
        let mut schema_version = None;
        let mut query_tags = HashMap::new();
        let mut stats = QueryStats::default();

        loop {
            reader.advance()?;
            if reader.current_token() == Token::EndObject {
                break;
            }
            reader.expect(Token::FieldName)?;
            let field = reader.take_string()?;
            reader.advance()?;
            match field.as_str() {
                "data" => data = Some(codec.decode(ctx, &mut reader)?),
                "error" => error = Some(read_error(ctx, &mut reader)?),
                "static_type" => static_type = read_opt_string(&mut reader)?,
                "summary" => summary = read_opt_string(&mut reader)?,
                "txn_ts" => txn_ts = read_opt_long(&reader)?,
                "schema_version" => schema_version = read_opt_long(&reader)?,
                "query_tags" => query_tags = read_query_tags(&mut reader)?,
                "stats" => stats = read_stats(&mut reader)?,
                other => {
                    trace!(field = other, "skipping response field");
                    reader.skip()?;
                }
            }
        }
        reader.finish()?;

        if let Some(error) = error {
            return Ok(QueryResponse::Failure(QueryFailure {
                code: error.code,
                message: error.message,
                abort: error.abort,
                summary,
                txn_ts,
                query_tags,
                stats,
            }));
        }
        match data {
            Some(data) => Ok(QueryResponse::Success(QuerySuccess {
                data,
                static_type,
                summary,
                txn_ts,
                schema_version,
                query_tags,
                stats,
            })),
            None => Err(Error::unexpected("data or error", "neither in response")),
        }
    }

    /// True for a success
    pub fn is_success(&self) -> bool {
        matches!(self, QueryResponse::Success(_))
    }

    /// Statistics from either outcome
    pub fn stats(&self) -> &QueryStats {
        match self {
            QueryResponse::Success(s) => &s.stats,
            QueryResponse::Failure(f) => &f.stats,
        }
    }
}

fn read_opt_string(reader: &mut TaggedReader<'_>) -> Result<Option<String>> {
    match reader.current_token() {
        Token::Null => Ok(None),
        _ => reader.take_string().map(Some),
    }
}

fn read_opt_long(reader: &TaggedReader<'_>) -> Result<Option<i64>> {
    match reader.current_token() {
        Token::Null => Ok(None),
        _ => reader.get_long().map(Some),
    }
}

fn read_error(ctx: &Registry, reader: &mut TaggedReader<'_>) -> Result<ErrorInfo> {
    reader.expect(Token::StartObject)?;
    let mut info = ErrorInfo::default();
    loop {
        reader.advance()?;
        if reader.current_token() == Token::EndObject {
            return Ok(info);
        }
        reader.expect(Token::FieldName)?;
        let field = reader.take_string()?;
        reader.advance()?;
        match field.as_str() {
            "code" => info.code = reader.take_string()?,
            "message" => info.message = reader.take_string()?,
            "abort" => info.abort = Some(ctx.decode_value(reader)?),
            other => {
                trace!(field = other, "skipping error field");
                reader.skip()?;
            }
        }
    }
}

/// Tags arrive either as `"k=v,k2=v2"` or as a flat object
fn read_query_tags(reader: &mut TaggedReader<'_>) -> Result<HashMap<String, String>> {
    let mut tags = HashMap::new();
    match reader.current_token() {
        Token::Null => {}
        Token::String => {
            let raw = reader.take_string()?;
            for pair in raw.split(',').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').ok_or_else(|| Error::InvalidPayload {
                    tag: "query_tags",
                    payload: pair.into(),
                })?;
                tags.insert(key.to_string(), value.to_string());
            }
        }
        Token::StartObject => loop {
            reader.advance()?;
            if reader.current_token() == Token::EndObject {
                break;
            }
            reader.expect(Token::FieldName)?;
            let key = reader.take_string()?;
            reader.advance()?;
            tags.insert(key, reader.take_string()?);
        },
        other => return Err(Error::unexpected("query tags", other)),
    }
    Ok(tags)
}

fn read_stats(reader: &mut TaggedReader<'_>) -> Result<QueryStats> {
    reader.expect(Token::StartObject)?;
    let mut stats = QueryStats::default();
    loop {
        reader.advance()?;
        if reader.current_token() == Token::EndObject {
            return Ok(stats);
        }
        reader.expect(Token::FieldName)?;
        let field = reader.take_string()?;
        reader.advance()?;
        let slot = match field.as_str() {
            "compute_ops" => &mut stats.compute_ops,
            "read_ops" => &mut stats.read_ops,
            "write_ops" => &mut stats.write_ops,
            "query_time_ms" => &mut stats.query_time_ms,
            "contention_retries" => &mut stats.contention_retries,
            "storage_bytes_read" => &mut stats.storage_bytes_read,
            "storage_bytes_write" => &mut stats.storage_bytes_write,
            "rate_limits_hit" => {
                reader.expect(Token::StartArray)?;
                loop {
                    reader.advance()?;
                    if reader.current_token() == Token::EndArray {
                        break;
                    }
                    stats.rate_limits_hit.push(reader.take_string()?);
                }
                continue;
            }
            other => {
                trace!(field = other, "skipping stats field");
                reader.skip()?;
                continue;
            }
        };
        *slot = reader.get_long()?;
    }
}
