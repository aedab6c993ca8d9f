//! Compressed value encoding for cache entries.
//!
//! Values are serialized to JSON, gzip-compressed, then base64-encoded so
//! they can be stored by any string-valued provider.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use linkshare_core::error::{AppError, ErrorKind};
use linkshare_core::result::AppResult;

/// Encode a value as base64(gzip(json)).
pub fn encode<T: Serialize>(value: &T) -> AppResult<String> {
    let json = serde_json::to_vec(value)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| AppError::with_source(ErrorKind::Serialization, "Failed to compress cache value", e))?;
    let compressed = encoder
        .finish()
        .map_err(|e| AppError::with_source(ErrorKind::Serialization, "Failed to compress cache value", e))?;

    Ok(STANDARD.encode(compressed))
}

/// Decode a value produced by [`encode`].
pub fn decode<T: DeserializeOwned>(raw: &str) -> AppResult<T> {
    let compressed = STANDARD.decode(raw).map_err(|e| {
        AppError::with_source(ErrorKind::Serialization, "Cache value is not valid base64", e)
    })?;

    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Failed to decompress cache value", e)
        })?;

    Ok(serde_json::from_slice(&json)?)
}
