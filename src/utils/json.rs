//! JSON encoding and decoding.
//!
//! Thin wrappers over `serde_json` that map failures onto a small set of
//! stable, client-presentable error messages.
//!
//! Values encode with their serde shape: sequences become JSON arrays, so an
//! empty `Vec` is `[]`. Callers that need an object must pass a map or a
//! struct; nothing is coerced into an object.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Why a JSON value could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("Syntax error")]
    Syntax(#[source] serde_json::Error),

    #[error("Malformed UTF-8 characters, possibly incorrectly encoded")]
    Utf8,

    #[error("Invalid or malformed JSON")]
    Data(#[source] serde_json::Error),

    #[error("Unexpected end of input")]
    Eof(#[source] serde_json::Error),

    #[error("Unable to encode value")]
    Encode(#[source] serde_json::Error),
}

impl JsonError {
    fn from_decode(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Syntax => JsonError::Syntax(err),
            Category::Data => JsonError::Data(err),
            Category::Eof => JsonError::Eof(err),
            Category::Io => JsonError::Syntax(err),
        }
    }
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, JsonError> {
    serde_json::to_string(value).map_err(JsonError::Encode)
}

/// Encode with four-space indentation.
pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, JsonError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer).map_err(JsonError::Encode)?;
    String::from_utf8(out).map_err(|_| JsonError::Utf8)
}

/// Decode JSON bytes. Input that is not UTF-8 is rejected before parsing.
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T, JsonError> {
    let text = std::str::from_utf8(data).map_err(|_| JsonError::Utf8)?;
    serde_json::from_str(text).map_err(JsonError::from_decode)
}
