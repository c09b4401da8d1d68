//! Content stage: JSON body → base64 payload → bytes + file name
//!
//! [`ContentDecoder::decode`] is pure. Persisting the payload is the
//! coordinator's job (see [`crate::coordinator`]).

pub mod filename;
mod path;

pub use path::{JsonPath, PathError, Segment};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::record::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("No data in response")]
    NoData,

    #[error("No base64 data")]
    NoBase64,

    #[error("Base64 decode error: {0}")]
    Base64(String),
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::InvalidJson(_) => ErrorKind::UnknownError,
            DecodeError::NoData => ErrorKind::NoData,
            DecodeError::NoBase64 => ErrorKind::NoBase64,
            DecodeError::Base64(_) => ErrorKind::DecodeError,
        }
    }
}

/// Where the decoder finds things inside a response body
#[derive(Debug, Clone)]
pub struct FieldMap {
    pub item_path: JsonPath,
    pub content_field: JsonPath,
    pub filename_field: JsonPath,
    pub fallback_filename_field: Option<JsonPath>,
}

impl FieldMap {
    pub fn from_config(api: &ApiConfig) -> Result<Self, PathError> {
        Ok(Self {
            item_path: api.item_path.parse()?,
            content_field: api.content_field.parse()?,
            filename_field: api.filename_field.parse()?,
            fallback_filename_field: api
                .fallback_filename_field
                .as_deref()
                .map(JsonPath::parse)
                .transpose()?,
        })
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        // Defaults are known-good paths
        Self::from_config(&ApiConfig::default()).unwrap_or_else(|_| Self {
            item_path: JsonPath::root(),
            content_field: JsonPath::root(),
            filename_field: JsonPath::root(),
            fallback_filename_field: None,
        })
    }
}

/// Decoded file ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub id: String,
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl DecodedPayload {
    /// Name on disk: `{id}_{filename}`, unique per id
    pub fn stored_name(&self) -> String {
        format!("{}_{}", filename::sanitize_component(&self.id), self.filename)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentDecoder {
    fields: FieldMap,
}

impl ContentDecoder {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    pub fn decode(&self, id: &str, body: &[u8]) -> Result<DecodedPayload, DecodeError> {
        let json: Value =
            serde_json::from_slice(body).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;

        let item = self.locate_item(&json)?;

        let content = self
            .fields
            .content_field
            .lookup(item)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or(DecodeError::NoBase64)?;

        let bytes = decode_base64(content)?;
        let filename = self.filename_for(id, item);

        Ok(DecodedPayload {
            id: id.to_string(),
            bytes,
            filename,
        })
    }

    /// Resolve the item object; null or an empty array counts as "no data"
    fn locate_item<'a>(&self, json: &'a Value) -> Result<&'a Value, DecodeError> {
        let item = self
            .fields
            .item_path
            .resolve(json)
            .map_err(|_| DecodeError::NoData)?;

        match item {
            Value::Null => Err(DecodeError::NoData),
            Value::Array(items) => items.first().ok_or(DecodeError::NoData),
            other => Ok(other),
        }
    }

    fn filename_for(&self, id: &str, item: &Value) -> String {
        let candidates = std::iter::once(&self.fields.filename_field)
            .chain(self.fields.fallback_filename_field.as_ref());

        candidates
            .filter_map(|path| path.lookup(item).and_then(Value::as_str))
            .find_map(filename::sanitize)
            .map(filename::ensure_extension)
            .unwrap_or_else(|| filename::default_filename(id))
    }
}

fn decode_base64(content: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::Base64(e.to_string()))
}
