//! Text encodings for [`Dictionary`] plus a configuration document that embeds them.
//!
//! Three independent formats, none of them readable by the others:
//! - [`persist`]: the flat `{"k": "v"}` string stored under a `json` field inside a
//!   larger configuration value. Everything becomes text, and it breaks on keys or
//!   values containing `, ` or `:`.
//! - [`json`]: a regular JSON object through serde.
//! - [`literal`]: Python-style `{'k': 'v'}` literals.

pub mod builder;
pub mod json;
pub mod literal;
pub mod persist;
pub mod storage;

pub use collections::{DictError, Dictionary, dict};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Derived IO error
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    /// Derived serde_json error
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Text did not start with `{` and end with `}`
    #[error("Expected text wrapped in curly braces, got: {input:?}")]
    MissingBraces { input: String },

    /// A `, `-separated segment of a persisted string did not split into key and value
    #[error("Malformed persisted segment: {segment:?}")]
    MalformedSegment { segment: String },

    /// A literal pair was missing its colon, had an empty key or an empty value
    #[error("Invalid key-value pair: {pair:?}")]
    InvalidPair { pair: String },

    #[error("Unterminated quote in: {input:?}")]
    UnterminatedQuote { input: String },

    /// Flat construction got a dangling key
    #[error("Entries must be in key-value pairs, got {len} items")]
    OddEntryCount { len: usize },

    /// Item at `index` of a flat construction sequence did not decode into its type
    #[error("Entry {index} has the wrong type: {source}")]
    Entry {
        index: usize,
        source: serde_json::Error,
    },

    /// A dotted config path runs through something that is not an object
    #[error("Config path {path:?} is blocked by a non-object value")]
    PathConflict { path: String },

    /// Caller asked for something the operation does not support
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Dict(#[from] DictError),
}
