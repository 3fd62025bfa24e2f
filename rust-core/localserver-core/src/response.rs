//! # Response Envelopes
//!
//! Builds the response sent for every request.
//!
//! The status line is always `200 ok`. The logical outcome only appears in
//! the JSON body, a `{status, msg, data}` envelope whose code and message keys
//! can be renamed per descriptor.

use crate::header::HeaderSet;
use crate::json;
use crate::status::StatusDescriptor;
use hyper::body::Bytes;
use hyper::StatusCode;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::warn;

/// Default envelope key for the code
pub const CODE_KEY: &str = "status";
/// Default envelope key for the message
pub const MESSAGE_KEY: &str = "msg";
/// Envelope key for the payload
pub const DATA_KEY: &str = "data";

/// Reason phrase sent with every response
pub const REASON: &str = "ok";

/// Value of the default `Server` header
pub const SERVER_NAME: &str = "Rust Local Server";

const HTTP_DATE: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// The `{code, message, data}` body
///
/// Serializes with keys in code, message, data order. An override key is
/// honoured when it is non-empty and does not collide with another slot.
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a> {
    descriptor: &'a StatusDescriptor,
    data: Option<&'a Value>,
}

impl<'a> Envelope<'a> {
    /// Create an envelope for a descriptor and optional payload
    #[must_use]
    pub const fn new(descriptor: &'a StatusDescriptor, data: Option<&'a Value>) -> Self {
        Self { descriptor, data }
    }

    /// Key the code is written under
    #[must_use]
    pub fn code_key(&self) -> &'a str {
        match self.descriptor.code_key.as_deref() {
            Some(key) if !key.is_empty() && key != MESSAGE_KEY && key != DATA_KEY => key,
            _ => CODE_KEY,
        }
    }

    /// Key the message is written under
    #[must_use]
    pub fn message_key(&self) -> &'a str {
        let code_key = self.code_key();
        match self.descriptor.message_key.as_deref() {
            Some(key)
                if !key.is_empty() && key != CODE_KEY && key != DATA_KEY && key != code_key =>
            {
                key
            }
            _ => MESSAGE_KEY,
        }
    }
}

impl Serialize for Envelope<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let empty = Value::String(String::new());
        let data = match self.data {
            Some(Value::Null) | None => &empty,
            Some(value) => value,
        };

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(self.code_key(), &self.descriptor.code)?;
        map.serialize_entry(self.message_key(), &self.descriptor.message)?;
        map.serialize_entry(DATA_KEY, data)?;
        map.end()
    }
}

/// A fully formed response ready to be written to the socket
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// Status line code
    pub status: StatusCode,
    /// Status line reason phrase
    pub reason: &'static str,
    /// Header lines in send order
    pub headers: Vec<(String, String)>,
    /// JSON body
    pub body: Bytes,
}

impl WireResponse {
    /// Get a header value by exact name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Body as UTF-8 text
    #[must_use]
    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }

    /// Serialize to HTTP/1.1 bytes
    ///
    /// `Content-Length` always matches the body; an explicit one in
    /// `headers` is not sent.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256 + self.body.len());
        out.extend_from_slice(
            format!("HTTP/1.1 {} {}\r\n", self.status.as_u16(), self.reason).as_bytes(),
        );
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        out.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

/// Format a timestamp for the `Date` header
#[must_use]
pub fn http_date(at: OffsetDateTime) -> String {
    at.format(HTTP_DATE).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to format Date header");
        String::new()
    })
}

fn default_headers() -> Vec<(String, String)> {
    vec![
        ("Date".to_string(), http_date(OffsetDateTime::now_utc())),
        ("Server".to_string(), SERVER_NAME.to_string()),
        ("Connection".to_string(), "close".to_string()),
        ("Content-Type".to_string(), "text/plain".to_string()),
    ]
}

/// Build the response for a resolved descriptor
///
/// With `headers` every present field is sent under its wire name and
/// nothing else is added. Without it the default set is used: `Date`,
/// `Server`, `Connection: close` and `Content-Type: text/plain`.
#[must_use]
pub fn build(
    descriptor: &StatusDescriptor,
    headers: Option<&HeaderSet>,
    payload: Option<&Value>,
) -> WireResponse {
    let envelope = Envelope::new(descriptor, payload);
    let body = json::to_json_bytes(&envelope).unwrap_or_else(|e| {
        warn!(error = %e, code = descriptor.code, "Failed to encode response envelope");
        Vec::new()
    });

    let headers = headers.map_or_else(default_headers, HeaderSet::wire_headers);

    WireResponse {
        status: StatusCode::OK,
        reason: REASON,
        headers,
        body: Bytes::from(body),
    }
}
