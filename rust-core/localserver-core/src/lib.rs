//! # Local Server Core
//!
//! Embeddable local request dispatcher for mock and test servers.
//! Accepts one framed request per TCP connection, routes it by exact path,
//! runs ordered header and query rules, and answers with a JSON envelope.
//!
//! ## Status model
//!
//! The wire status line is always `200 ok`. The logical outcome is carried
//! in the body as `{"status": code, "msg": message, "data": payload}`, with
//! the code and message keys renameable per status descriptor.
//!
//! ## Modules
//!
//! - `server` - TCP listener and per-connection lifecycle
//! - `state` - Immutable registry snapshot and atomic reload
//! - `status` - Outcome codes and the status descriptor registry
//! - `router` - Exact-path route registry
//! - `route` - Route definitions and methods
//! - `validation` - Header and query rule pipeline
//! - `request` - Wire request parsing
//! - `response` - Envelope encoding and wire responses
//! - `header` - Response header sets and wire names
//! - `json` - JSON decoding/encoding helpers
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod header;
pub mod json;
pub mod request;
pub mod response;
pub mod route;
pub mod router;
pub mod server;
pub mod state;
pub mod status;
pub mod validation;

pub use error::{Error, Result};
pub use header::{wire_header_name, HeaderField, HeaderSet};
pub use request::WireRequest;
pub use response::{Envelope, WireResponse};
pub use route::{RouteDefinition, RouteMethod};
pub use router::RouteRegistry;
pub use server::{Server, ServerConfig};
pub use state::{ServerState, SharedState};
pub use status::{OutcomeCode, ReservedCode, StatusCodeRegistry, StatusDescriptor, StatusKind};
pub use validation::ValidationRule;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
