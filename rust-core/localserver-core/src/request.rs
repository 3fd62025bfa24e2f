//! # Wire Requests
//!
//! Parses the bytes of a single bounded read into a structured request.
//!
//! The head is parsed with `httparse`. Whatever follows the head inside the
//! same read is the body; nothing is reassembled from later reads.

use crate::error::{Error, Result};
use crate::json;
use hyper::body::Bytes;
use hyper::{Method, Uri};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

/// Maximum number of header lines accepted in one request
pub const MAX_HEADERS: usize = 64;

/// A parsed request
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// Request method as sent by the client
    pub method: Method,
    /// Request path, percent-decoded, without query string
    pub path: String,
    /// Header lines in arrival order, names as sent
    headers: Vec<(String, String)>,
    /// Body bytes contained in the read
    body: Bytes,
    /// Body decoded once as a JSON object, if it is one
    fields: Option<Map<String, Value>>,
}

impl WireRequest {
    /// Create a request from its parts
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Into<Bytes>,
    ) -> Self {
        let body: Bytes = body.into();
        Self {
            method,
            path: path.into(),
            headers,
            fields: json::body_object(&body),
            body,
        }
    }

    /// Parse a request from raw bytes
    ///
    /// # Errors
    ///
    /// Returns `Error::PartialRequest` if the head is not complete and
    /// `Error::Parse` if it is malformed.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut header_slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut parsed = httparse::Request::new(&mut header_slots);

        let head_len = match parsed.parse(buf)? {
            httparse::Status::Complete(len) => len,
            httparse::Status::Partial => return Err(Error::PartialRequest),
        };

        let method = parsed.method.ok_or(Error::PartialRequest)?;
        let method = Method::from_bytes(method.as_bytes()).map_err(|e| Error::Parse {
            reason: e.to_string(),
        })?;

        let target = parsed.path.ok_or(Error::PartialRequest)?;
        let uri: Uri = target.parse().map_err(|_| Error::Parse {
            reason: format!("invalid request target: {target}"),
        })?;
        let path = percent_decode_str(uri.path())
            .decode_utf8()
            .map_err(|e| Error::Parse {
                reason: format!("request path is not UTF-8: {e}"),
            })?
            .into_owned();

        let headers: Vec<(String, String)> = parsed
            .headers
            .iter()
            .map(|h| {
                (
                    h.name.to_string(),
                    String::from_utf8_lossy(h.value).into_owned(),
                )
            })
            .collect();

        let mut body = &buf[head_len..];
        let declared_len = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok());
        if let Some(len) = declared_len {
            body = &body[..len.min(body.len())];
        }

        Ok(Self::new(method, path, headers, Bytes::copy_from_slice(body)))
    }

    /// Get a header value by its exact, case-sensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All header lines
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Get a query field from the JSON object body
    ///
    /// Only string values are returned; missing or non-object bodies have
    /// no fields.
    #[must_use]
    pub fn query_field(&self, key: &str) -> Option<&str> {
        match self.fields.as_ref()?.get(key)? {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// The request body
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
