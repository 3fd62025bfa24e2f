//! # Server State
//!
//! Everything a connection needs to answer a request, bundled into one
//! immutable snapshot.
//!
//! The snapshot is built during configuration and published through
//! [`SharedState`]. Connection tasks load the current snapshot once and keep
//! it for their whole lifecycle; a reload swaps in a new snapshot without
//! touching the one in-flight connections hold.

use crate::header::HeaderSet;
use crate::route::RouteDefinition;
use crate::router::RouteRegistry;
use crate::status::{OutcomeCode, StatusCodeRegistry, StatusDescriptor};
use crate::validation::ValidationRule;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Registries and global rules used to process requests
#[derive(Debug, Clone, Default)]
pub struct ServerState {
    /// Outcome code descriptors
    pub statuses: StatusCodeRegistry,
    /// Path to route table
    pub routes: RouteRegistry,
    /// Header rules applied to every route, after the route's own
    pub base_header_rules: Vec<ValidationRule>,
    /// Query rules registered globally
    ///
    /// Kept for the embedding application; the pipeline only evaluates a
    /// route's own query rules.
    pub base_query_rules: Vec<ValidationRule>,
    /// Header set sent instead of the built-in defaults
    pub default_headers: Option<HeaderSet>,
}

impl ServerState {
    /// Create a state with the reserved status codes and nothing else
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route under `path`
    pub fn add_route(&mut self, path: impl Into<String>, route: RouteDefinition) {
        self.routes.register(path, route);
    }

    /// Append base header rules
    pub fn add_base_header_rules(&mut self, rules: impl IntoIterator<Item = ValidationRule>) {
        self.base_header_rules.extend(rules);
    }

    /// Append base query rules
    pub fn add_base_query_rules(&mut self, rules: impl IntoIterator<Item = ValidationRule>) {
        self.base_query_rules.extend(rules);
    }

    /// Set or remove the descriptor for `code`
    pub fn set_status(&mut self, code: OutcomeCode, descriptor: Option<StatusDescriptor>) {
        self.statuses.upsert(code, descriptor);
    }

    /// Headers sent with every response; `None` means the built-in set
    #[must_use]
    pub fn default_headers(&self) -> Option<&HeaderSet> {
        self.default_headers.as_ref()
    }
}

/// Atomically published [`ServerState`] snapshot
#[derive(Debug, Clone)]
pub struct SharedState {
    current: Arc<ArcSwap<ServerState>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(ServerState::default())
    }
}

impl SharedState {
    /// Publish an initial snapshot
    #[must_use]
    pub fn new(state: ServerState) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(state)),
        }
    }

    /// Current snapshot
    #[must_use]
    pub fn load(&self) -> Arc<ServerState> {
        self.current.load_full()
    }

    /// Replace the snapshot wholesale
    pub fn store(&self, state: ServerState) {
        self.current.store(Arc::new(state));
    }
}
