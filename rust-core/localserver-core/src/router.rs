//! # Route Registry
//!
//! Exact-match map from request path to route definition.
//! Paths are compared byte for byte; there are no patterns or parameters.

use crate::route::RouteDefinition;
use std::collections::HashMap;

/// Path-keyed route table
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: HashMap<String, RouteDefinition>,
}

impl RouteRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `route` under `path`, replacing any previous registration
    pub fn register(&mut self, path: impl Into<String>, route: RouteDefinition) {
        self.routes.insert(path.into(), route);
    }

    /// Register a route under its own path
    pub fn add(&mut self, route: RouteDefinition) {
        self.register(route.path.clone(), route);
    }

    /// Look up the route for an exact path
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&RouteDefinition> {
        self.routes.get(path)
    }

    /// Number of registered paths
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if no path is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
