//! # Local Server
//!
//! Runs a local mock server with a small demonstration route table.
//! Set `LOCALSERVER_ADDR` to change the bind address and `RUST_LOG` to
//! change log verbosity.

use anyhow::Context;
use localserver_core::{
    HeaderField, HeaderSet, ReservedCode, RouteDefinition, Server, ServerConfig,
    StatusDescriptor, ValidationRule,
};
use serde_json::json;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Outcome code for an expired or missing token
const TOKEN_INVALID: i64 = 100;

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("localserver_cli=info,localserver_core=info"))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

fn configure(server: &mut Server) {
    server
        .set_status(
            TOKEN_INVALID,
            Some(StatusDescriptor::error(TOKEN_INVALID, "Token invalid")),
        )
        .add_base_header_rule(ValidationRule::required("token", TOKEN_INVALID))
        .set_default_headers(
            HeaderSet::new()
                .with(HeaderField::ContentType, "application/json")
                .with(HeaderField::Connection, "close"),
        )
        .add_routes([
            RouteDefinition::get("/ping"),
            RouteDefinition::post("/login")
                .query_rule(ValidationRule::required("user", ReservedCode::Param.code()))
                .query_rule(ValidationRule::required("password", ReservedCode::Param.code()))
                .with_payload(json!({"token": "local-token"})),
        ]);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let mut config = ServerConfig::default();
    if let Ok(addr) = std::env::var("LOCALSERVER_ADDR") {
        config.address = addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid LOCALSERVER_ADDR: {addr}"))?;
    }

    let mut server = Server::new().with_config(config);
    configure(&mut server);
    tracing::info!(routes = server.state().routes.len(), "Routes registered");

    server.serve().await?;
    Ok(())
}
