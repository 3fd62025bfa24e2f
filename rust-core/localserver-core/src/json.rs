//! # JSON Module
//!
//! Request body decoding with simd-json (serde_json fallback) and envelope
//! encoding with serde_json.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Parse JSON bytes to a typed value
///
/// simd-json parses in place, so the input is copied first. Inputs simd-json
/// rejects are retried with serde_json, whose error is the one reported.
///
/// # Errors
///
/// Returns `Error::Json` if the bytes are not valid JSON for `T`
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut scratch = bytes.to_vec();
    match simd_json::from_slice(&mut scratch) {
        Ok(value) => Ok(value),
        Err(_) => Ok(serde_json::from_slice(bytes)?),
    }
}

/// Parse a request body as a flat JSON object
///
/// # Errors
///
/// Returns `Error::Json` if the body is not a JSON object
pub fn parse_json_object(bytes: &[u8]) -> Result<Map<String, Value>> {
    parse_json(bytes)
}

/// Decode a request body into its JSON object, if it is one
///
/// Empty bodies and anything that is not a JSON object yield `None`.
#[must_use]
pub fn body_object(body: &[u8]) -> Option<Map<String, Value>> {
    if body.is_empty() {
        return None;
    }
    parse_json_object(body).ok()
}

/// Serialize a value to JSON bytes
///
/// # Errors
///
/// Returns `Error::Json` if `value` cannot be serialized
pub fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}
