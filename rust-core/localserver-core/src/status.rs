//! # Status Codes
//!
//! Logical outcome codes and the registry that maps them to descriptors.
//!
//! The logical code travels inside the JSON envelope; the wire status line is
//! always `200 ok` regardless of what is resolved here.

use std::collections::HashMap;
use std::fmt;

/// Integer identifier of a result category
pub type OutcomeCode = i64;

/// The eight baseline outcome codes every default configuration carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedCode {
    /// Request handled successfully
    Ok,
    /// Generic server failure, also used for unparseable requests
    Server,
    /// Protocol/agreement failure
    Agreement,
    /// Method mismatch (also reported for unknown paths)
    Method,
    /// Header validation failure
    Header,
    /// Path failure
    Path,
    /// Query parameter failure
    Param,
    /// Missing status configuration
    Config,
}

impl ReservedCode {
    /// All reserved codes in ascending order
    pub const ALL: [Self; 8] = [
        Self::Ok,
        Self::Server,
        Self::Agreement,
        Self::Method,
        Self::Header,
        Self::Path,
        Self::Param,
        Self::Config,
    ];

    /// Numeric value of the code
    #[must_use]
    pub const fn code(self) -> OutcomeCode {
        match self {
            Self::Ok => 0,
            Self::Server => 1,
            Self::Agreement => 2,
            Self::Method => 3,
            Self::Header => 4,
            Self::Path => 5,
            Self::Param => 6,
            Self::Config => 7,
        }
    }

    /// Built-in English message
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Ok => "Success",
            Self::Server => "Server error",
            Self::Agreement => "Agreement error",
            Self::Method => "Method error",
            Self::Header => "Header error",
            Self::Path => "Path error",
            Self::Param => "Param error",
            Self::Config => "Config error",
        }
    }

    /// Look up the reserved code for a numeric value
    #[must_use]
    pub fn from_code(code: OutcomeCode) -> Option<Self> {
        Self::ALL.into_iter().find(|reserved| reserved.code() == code)
    }

    fn default_descriptor(self) -> StatusDescriptor {
        match self {
            Self::Ok => StatusDescriptor::success(self.code(), self.default_message()),
            _ => StatusDescriptor::error(self.code(), self.default_message()),
        }
    }
}

impl fmt::Display for ReservedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Whether a descriptor reports success or failure
///
/// Only informational: the wire status is the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Logical success
    Success,
    /// Logical failure
    Error,
}

/// Immutable description of a status outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDescriptor {
    /// Success or error tag
    pub kind: StatusKind,
    /// Code written into the envelope
    pub code: OutcomeCode,
    /// Envelope key for the code, replacing `status`
    pub code_key: Option<String>,
    /// Message written into the envelope
    pub message: String,
    /// Envelope key for the message, replacing `msg`
    pub message_key: Option<String>,
}

impl StatusDescriptor {
    /// Create a success descriptor
    pub fn success(code: OutcomeCode, message: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, code, message)
    }

    /// Create an error descriptor
    pub fn error(code: OutcomeCode, message: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, code, message)
    }

    fn new(kind: StatusKind, code: OutcomeCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            code_key: None,
            message: message.into(),
            message_key: None,
        }
    }

    /// Write the code under `key` instead of `status`
    #[must_use]
    pub fn with_code_key(mut self, key: impl Into<String>) -> Self {
        self.code_key = Some(key.into());
        self
    }

    /// Write the message under `key` instead of `msg`
    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = Some(key.into());
        self
    }

    /// Check whether this is a success descriptor
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }
}

/// Maps outcome codes to status descriptors
///
/// Resolution is total: a missing mapping falls back to a built-in
/// descriptor instead of failing.
#[derive(Debug, Clone)]
pub struct StatusCodeRegistry {
    entries: HashMap<OutcomeCode, StatusDescriptor>,
}

impl Default for StatusCodeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl StatusCodeRegistry {
    /// Create a registry with no mappings at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry holding the eight reserved codes
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.install_defaults();
        registry
    }

    /// Clear every mapping and install the reserved codes
    pub fn install_defaults(&mut self) {
        self.entries.clear();
        for reserved in ReservedCode::ALL {
            self.entries.insert(reserved.code(), reserved.default_descriptor());
        }
    }

    /// Set or remove the mapping for `code`
    ///
    /// Passing `None` removes the mapping so later lookups hit the fallback.
    pub fn upsert(&mut self, code: OutcomeCode, descriptor: Option<StatusDescriptor>) {
        match descriptor {
            Some(descriptor) => {
                self.entries.insert(code, descriptor);
            }
            None => {
                self.entries.remove(&code);
            }
        }
    }

    /// Resolve an ad hoc (rule-supplied) code
    ///
    /// Unmapped codes resolve to the built-in "Config error" descriptor.
    #[must_use]
    pub fn resolve(&self, code: OutcomeCode) -> StatusDescriptor {
        self.entries
            .get(&code)
            .cloned()
            .unwrap_or_else(|| ReservedCode::Config.default_descriptor())
    }

    /// Resolve one of the server's own pathways
    ///
    /// Unmapped reserved codes resolve to the built-in "Server error" descriptor.
    #[must_use]
    pub fn resolve_reserved(&self, reserved: ReservedCode) -> StatusDescriptor {
        self.entries
            .get(&reserved.code())
            .cloned()
            .unwrap_or_else(|| ReservedCode::Server.default_descriptor())
    }

    /// Check whether `code` has an explicit mapping
    #[must_use]
    pub fn contains(&self, code: OutcomeCode) -> bool {
        self.entries.contains_key(&code)
    }

    /// Number of mapped codes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no codes are mapped
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
