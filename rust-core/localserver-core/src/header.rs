//! # Response Header Sets
//!
//! A bag of well-known header fields plus free-form extras, keyed the way the
//! embedding application writes them (`content_Type`, `user_Agent`, ...).
//! Keys become wire names by upper-casing the first letter and replacing
//! underscores with hyphens.

use std::collections::BTreeMap;

/// Well-known header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeaderField {
    /// `Accept`
    Accept,
    /// `Accept-Charset`
    AcceptCharset,
    /// `Accept-Encoding`
    AcceptEncoding,
    /// `Accept-Language`
    AcceptLanguage,
    /// `Authorization`
    Authorization,
    /// `Cache-Control`
    CacheControl,
    /// `Connection`
    Connection,
    /// `Cookie`
    Cookie,
    /// `Content-Length`
    ContentLength,
    /// `Content-Type`
    ContentType,
    /// `Date`
    Date,
    /// `Expect`
    Expect,
    /// `Host`
    Host,
    /// `If-Match`
    IfMatch,
    /// `If-Modified-Since`
    IfModifiedSince,
    /// `If-None-Match`
    IfNoneMatch,
    /// `If-Range`
    IfRange,
    /// `User-Agent`
    UserAgent,
    /// `Origin`
    Origin,
}

impl HeaderField {
    /// Every well-known field in declaration order
    pub const ALL: [Self; 19] = [
        Self::Accept,
        Self::AcceptCharset,
        Self::AcceptEncoding,
        Self::AcceptLanguage,
        Self::Authorization,
        Self::CacheControl,
        Self::Connection,
        Self::Cookie,
        Self::ContentLength,
        Self::ContentType,
        Self::Date,
        Self::Expect,
        Self::Host,
        Self::IfMatch,
        Self::IfModifiedSince,
        Self::IfNoneMatch,
        Self::IfRange,
        Self::UserAgent,
        Self::Origin,
    ];

    /// Field key as written by the embedding application
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::AcceptCharset => "accept_Charset",
            Self::AcceptEncoding => "accept_Encoding",
            Self::AcceptLanguage => "accept_Language",
            Self::Authorization => "authorization",
            Self::CacheControl => "cache_Control",
            Self::Connection => "connection",
            Self::Cookie => "cookie",
            Self::ContentLength => "content_Length",
            Self::ContentType => "content_Type",
            Self::Date => "date",
            Self::Expect => "expect",
            Self::Host => "host",
            Self::IfMatch => "if_Match",
            Self::IfModifiedSince => "if_Modified_Since",
            Self::IfNoneMatch => "if_None_Match",
            Self::IfRange => "if_Range",
            Self::UserAgent => "user_Agent",
            Self::Origin => "origin",
        }
    }

    /// Resolve a field key to a well-known field (exact match)
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Header name as sent on the wire
    #[must_use]
    pub fn wire_name(self) -> String {
        wire_header_name(self.key())
    }
}

/// Translate a field key into its wire header name
///
/// `content_Type` becomes `Content-Type`, `x_trace_id` becomes `X-trace-id`.
#[must_use]
pub fn wire_header_name(key: &str) -> String {
    let mut chars = key.chars();
    let mut name = String::with_capacity(key.len());
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
    }
    name.extend(chars);
    name.replace('_', "-")
}

/// Header override set applied to every response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    known: BTreeMap<HeaderField, String>,
    extra: BTreeMap<String, String>,
}

impl HeaderSet {
    /// Create an empty header set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a well-known field
    pub fn set(&mut self, field: HeaderField, value: impl Into<String>) {
        self.known.insert(field, value.into());
    }

    /// Builder form of [`HeaderSet::set`]
    #[must_use]
    pub fn with(mut self, field: HeaderField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field by key
    ///
    /// Keys naming a well-known field (`content_Type`) set that field,
    /// anything else lands in the extra map.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        match HeaderField::from_key(key) {
            Some(field) => self.set(field, value),
            None => {
                self.extra.insert(key.to_string(), value.into());
            }
        }
    }

    /// Builder form of [`HeaderSet::insert`] for free-form keys
    #[must_use]
    pub fn with_extra(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a well-known field
    #[must_use]
    pub fn get(&self, field: HeaderField) -> Option<&str> {
        self.known.get(&field).map(String::as_str)
    }

    /// Get a field by key, well-known or extra
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&str> {
        match HeaderField::from_key(key) {
            Some(field) => self.get(field),
            None => self.extra.get(key).map(String::as_str),
        }
    }

    /// Number of present fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.known.len() + self.extra.len()
    }

    /// Check if no field is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.extra.is_empty()
    }

    /// Present fields as `(wire name, value)` pairs
    ///
    /// Well-known fields come first in declaration order, then extras
    /// sorted by key.
    #[must_use]
    pub fn wire_headers(&self) -> Vec<(String, String)> {
        self.known
            .iter()
            .map(|(field, value)| (field.wire_name(), value.clone()))
            .chain(
                self.extra
                    .iter()
                    .map(|(key, value)| (wire_header_name(key), value.clone())),
            )
            .collect()
    }
}
