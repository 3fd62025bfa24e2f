//! # Route Definitions
//!
//! What a registered path expects from a request and what it may answer with.

use crate::header::HeaderSet;
use crate::validation::ValidationRule;
use serde_json::Value;
use std::fmt;

/// Method a route is configured with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// `get`
    Get,
    /// `post`
    Post,
    /// Any other verb, compared verbatim
    Other(String),
}

impl RouteMethod {
    /// Configured method value
    ///
    /// `get` and `post` are lowercase; `Other` is returned as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Other(method) => method,
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the server knows about one path
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    /// Path this definition was created for
    pub path: String,
    /// Configured method
    pub method: RouteMethod,
    /// Header rules, evaluated before the base header rules
    pub header_rules: Vec<ValidationRule>,
    /// Query rules, evaluated in registration order
    pub query_rules: Vec<ValidationRule>,
    /// Header set kept with the route for the embedding application;
    /// responses always use the server's header set
    pub headers: Option<HeaderSet>,
    /// Payload returned on success when payload responses are enabled
    pub payload: Option<Value>,
}

impl RouteDefinition {
    /// Create a route without rules, headers or payload
    pub fn new(path: impl Into<String>, method: RouteMethod) -> Self {
        Self {
            path: path.into(),
            method,
            header_rules: Vec::new(),
            query_rules: Vec::new(),
            headers: None,
            payload: None,
        }
    }

    /// Shorthand for a `get` route
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path, RouteMethod::Get)
    }

    /// Shorthand for a `post` route
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(path, RouteMethod::Post)
    }

    /// Append a header rule
    #[must_use]
    pub fn header_rule(mut self, rule: ValidationRule) -> Self {
        self.header_rules.push(rule);
        self
    }

    /// Append a query rule
    #[must_use]
    pub fn query_rule(mut self, rule: ValidationRule) -> Self {
        self.query_rules.push(rule);
        self
    }

    /// Set response headers for this route
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderSet) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set the default payload
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}
