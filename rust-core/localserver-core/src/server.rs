//! # Local Server
//!
//! TCP listener and the per-connection request lifecycle.
//!
//! Every accepted connection runs on its own task:
//! accept, one bounded read, parse, route lookup, method check, header
//! rules, query rules, one response, close. Each failed step answers with
//! the resolved descriptor and ends the connection; nothing is retried.

use crate::error::{Error, Result};
use crate::header::HeaderSet;
use crate::request::WireRequest;
use crate::response::{self, WireResponse};
use crate::route::RouteDefinition;
use crate::state::{ServerState, SharedState};
use crate::status::{OutcomeCode, ReservedCode, StatusDescriptor};
use crate::validation::{check_headers, check_query, ValidationRule};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Default size of the single request read
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 8 * 1024;

/// Server configuration
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub address: SocketAddr,
    /// Maximum bytes taken from the single read per connection
    pub max_request_size: usize,
    /// How long to wait for the request bytes; `None` waits forever
    pub read_timeout: Option<Duration>,
    /// Answer successful requests with the route's payload instead of an
    /// empty `data` slot
    pub respond_with_route_payload: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: ([127, 0, 0, 1], 3000).into(),
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            read_timeout: Some(Duration::from_secs(30)),
            respond_with_route_payload: false,
        }
    }
}

/// Lifecycle stage a request reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Connection accepted, bytes not read yet
    Accepted,
    /// Bytes parsed into a request
    Parsed,
    /// Path found in the route table
    RouteResolved,
    /// Method check passed
    MethodChecked,
    /// Header rules passed
    HeaderChecked,
    /// Query rules passed
    QueryChecked,
    /// Response produced
    Completed,
}

/// Result of running one request through the pipeline
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Last stage passed before completion
    pub reached: Stage,
    /// Request method, if the request parsed
    pub method: Option<String>,
    /// Request path, if the request parsed
    pub path: Option<String>,
    /// Descriptor the response was built from
    pub descriptor: StatusDescriptor,
    /// Response to send
    pub response: WireResponse,
}

fn complete(
    reached: Stage,
    request: Option<&WireRequest>,
    descriptor: StatusDescriptor,
    headers: Option<&HeaderSet>,
    payload: Option<&serde_json::Value>,
) -> Exchange {
    debug!(from = ?reached, to = ?Stage::Completed, code = descriptor.code, "Stage transition");
    let response = response::build(&descriptor, headers, payload);
    Exchange {
        reached,
        method: request.map(|r| r.method.to_string()),
        path: request.map(|r| r.path.clone()),
        descriptor,
        response,
    }
}

/// Run raw request bytes through the full validation pipeline
///
/// Never fails: every outcome, including unparseable input, is turned into a
/// response.
pub fn process(state: &ServerState, config: &ServerConfig, raw: &[u8]) -> Exchange {
    let statuses = &state.statuses;

    let request = match WireRequest::parse(raw) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Failed to parse request");
            return complete(
                Stage::Accepted,
                None,
                statuses.resolve_reserved(ReservedCode::Server),
                state.default_headers(),
                None,
            );
        }
    };
    debug!(method = %request.method, path = %request.path, "Request parsed");

    // Unknown paths report the method code, not the path code.
    let Some(route) = state.routes.lookup(&request.path) else {
        return complete(
            Stage::Parsed,
            Some(&request),
            statuses.resolve_reserved(ReservedCode::Method),
            state.default_headers(),
            None,
        );
    };
    let headers = state.default_headers();

    // A request whose method equals the configured value verbatim is rejected.
    if request.method.as_str() == route.method.as_str() {
        return complete(
            Stage::RouteResolved,
            Some(&request),
            statuses.resolve_reserved(ReservedCode::Method),
            headers,
            None,
        );
    }

    if let Some(code) = check_headers(route, &state.base_header_rules, &request) {
        return complete(
            Stage::MethodChecked,
            Some(&request),
            statuses.resolve(code),
            headers,
            None,
        );
    }

    if let Some(code) = check_query(route, &request) {
        return complete(
            Stage::HeaderChecked,
            Some(&request),
            statuses.resolve(code),
            headers,
            None,
        );
    }

    let payload = if config.respond_with_route_payload {
        route.payload.as_ref()
    } else {
        None
    };
    complete(
        Stage::QueryChecked,
        Some(&request),
        statuses.resolve_reserved(ReservedCode::Ok),
        headers,
        payload,
    )
}

/// Serve one connection: single read, one response, close
///
/// The stream is shut down on every path that got past the read, and dropped
/// when the function returns.
///
/// # Errors
///
/// Returns `Error::Io` if the read or write fails. A timed-out read or a
/// peer that closes without sending is not an error; no response is sent.
pub async fn serve_connection<S>(
    mut stream: S,
    peer: SocketAddr,
    state: &ServerState,
    config: &ServerConfig,
) -> Result<Option<Exchange>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let outcome = read_and_respond(&mut stream, peer, state, config).await;
    if let Err(e) = stream.shutdown().await {
        debug!(peer = %peer, error = %e, "Connection shutdown failed");
    }
    debug!(peer = %peer, "Connection closed");
    outcome
}

async fn read_and_respond<S>(
    stream: &mut S,
    peer: SocketAddr,
    state: &ServerState,
    config: &ServerConfig,
) -> Result<Option<Exchange>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; config.max_request_size];
    let read = match config.read_timeout {
        Some(limit) => match tokio::time::timeout(limit, stream.read(&mut buf)).await {
            Ok(read) => read?,
            Err(_) => {
                warn!(
                    peer = %peer,
                    timeout_ms = %limit.as_millis(),
                    "Timed out waiting for request"
                );
                return Ok(None);
            }
        },
        None => stream.read(&mut buf).await?,
    };
    if read == 0 {
        debug!(peer = %peer, "Peer closed before sending a request");
        return Ok(None);
    }

    let exchange = process(state, config, &buf[..read]);
    stream.write_all(&exchange.response.to_bytes()).await?;
    stream.flush().await?;

    info!(
        peer = %peer,
        method = exchange.method.as_deref().unwrap_or("-"),
        path = exchange.path.as_deref().unwrap_or("-"),
        code = exchange.descriptor.code,
        "Request handled"
    );
    Ok(Some(exchange))
}

/// Embeddable local server
///
/// Configure routes, rules, headers and status codes, then call
/// [`Server::serve`]. Configuration needs `&mut self`, so it cannot overlap
/// with serving; use [`Server::reload`] to swap the state of a running server.
pub struct Server {
    config: ServerConfig,
    state: ServerState,
    shared: SharedState,
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

impl Server {
    /// Create a server with the reserved status codes and no routes
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            state: ServerState::new(),
            shared: SharedState::default(),
        }
    }

    /// Bind the server to an address
    #[must_use]
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.config.address = addr;
        self
    }

    /// Replace the whole configuration
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// State being configured
    #[must_use]
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Register a route under `path`; a later registration replaces it
    pub fn add_route(&mut self, path: impl Into<String>, route: RouteDefinition) -> &mut Self {
        self.state.add_route(path, route);
        self
    }

    /// Register routes under their own paths
    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = RouteDefinition>) -> &mut Self {
        for route in routes {
            self.state.routes.add(route);
        }
        self
    }

    /// Append a header rule applied to every route
    pub fn add_base_header_rule(&mut self, rule: ValidationRule) -> &mut Self {
        self.add_base_header_rules([rule])
    }

    /// Append header rules applied to every route
    pub fn add_base_header_rules(
        &mut self,
        rules: impl IntoIterator<Item = ValidationRule>,
    ) -> &mut Self {
        self.state.add_base_header_rules(rules);
        self
    }

    /// Append a globally registered query rule
    pub fn add_base_query_rule(&mut self, rule: ValidationRule) -> &mut Self {
        self.add_base_query_rules([rule])
    }

    /// Append globally registered query rules
    pub fn add_base_query_rules(
        &mut self,
        rules: impl IntoIterator<Item = ValidationRule>,
    ) -> &mut Self {
        self.state.add_base_query_rules(rules);
        self
    }

    /// Send `headers` instead of the built-in default headers
    pub fn set_default_headers(&mut self, headers: HeaderSet) -> &mut Self {
        self.state.default_headers = Some(headers);
        self
    }

    /// Set or remove the descriptor for `code`
    pub fn set_status(
        &mut self,
        code: OutcomeCode,
        descriptor: Option<StatusDescriptor>,
    ) -> &mut Self {
        self.state.set_status(code, descriptor);
        self
    }

    /// Set or remove several descriptors
    pub fn set_statuses(
        &mut self,
        statuses: impl IntoIterator<Item = (OutcomeCode, Option<StatusDescriptor>)>,
    ) -> &mut Self {
        for (code, descriptor) in statuses {
            self.state.set_status(code, descriptor);
        }
        self
    }

    /// Drop every status mapping and reinstall the reserved codes
    pub fn install_default_statuses(&mut self) -> &mut Self {
        self.state.statuses.install_defaults();
        self
    }

    /// Handle for publishing new state to a running server
    #[must_use]
    pub fn shared_state(&self) -> SharedState {
        self.shared.clone()
    }

    /// Replace the state used by new connections
    pub fn reload(&self, state: ServerState) {
        info!(routes = state.routes.len(), "Server state reloaded");
        self.shared.store(state);
    }

    /// Start the server, stopping on Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns `Error::BindError` if the address cannot be bound
    pub async fn serve(&self) -> Result<()> {
        let addr = self.config.address;
        let listener = bind_listener(addr).map_err(|source| Error::BindError {
            address: addr.to_string(),
            source,
        })?;
        self.serve_listener(listener, shutdown_signal()).await
    }

    /// Accept connections on `listener` until `shutdown` resolves
    ///
    /// Publishes the configured state first, so any earlier
    /// [`Server::reload`] is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the listener address cannot be read
    pub async fn serve_listener<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.shared.store(self.state.clone());
        info!("Server listening on http://{}", listener.local_addr()?);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, peer) = match accept_result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };
                    debug!(peer = %peer, "Connection accepted");

                    let state = self.shared.load();
                    let config = self.config;
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, peer, &state, &config).await {
                            warn!(peer = %peer, error = %e, "Error serving connection");
                        }
                    });
                }
                () = &mut shutdown => {
                    info!("Shutdown signal received, stopping server...");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Run raw request bytes through the pipeline without a network
    #[must_use]
    pub fn test_request(&self, raw: &[u8]) -> WireResponse {
        process(&self.state, &self.config, raw).response
    }
}

fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4()?
    } else {
        tokio::net::TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(1024)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderField;
    use serde_json::{json, Value};
    use tokio::io::duplex;

    const PEER: SocketAddr = SocketAddr::V4(std::net::SocketAddrV4::new(
        std::net::Ipv4Addr::LOCALHOST,
        40000,
    ));

    fn ping_server() -> Server {
        let mut server = Server::new();
        server.add_route("/ping", RouteDefinition::get("/ping"));
        server
    }

    fn body(response: &WireResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.address.port(), 3000);
        assert_eq!(config.max_request_size, 8192);
        assert!(!config.respond_with_route_payload);
    }

    #[test]
    fn test_unknown_path_reports_method_error() {
        let server = Server::new();
        let response = server.test_request(b"GET /missing HTTP/1.1\r\n\r\n");
        assert_eq!(
            response.body_str(),
            r#"{"status":3,"msg":"Method error","data":""}"#
        );
    }

    #[test]
    fn test_ping_succeeds() {
        let server = ping_server();
        let response = server.test_request(b"GET /ping HTTP/1.1\r\nHost: localhost\r\n\r\n");
        assert_eq!(
            response.body_str(),
            r#"{"status":0,"msg":"Success","data":""}"#
        );
        assert_eq!(response.header("Connection"), Some("close"));
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn test_unparseable_request_reports_server_error() {
        let server = ping_server();
        let response = server.test_request(b"\x00\x01garbage\r\n\r\n");
        assert_eq!(body(&response)["status"], 1);
        assert_eq!(body(&response)["msg"], "Server error");
        assert_eq!(response.status, hyper::StatusCode::OK);
    }

    #[test]
    fn test_incomplete_head_reports_server_error() {
        let server = ping_server();
        let response = server.test_request(b"GET /ping HTTP/1.1\r\nHost: loc");
        assert_eq!(body(&response)["status"], 1);
    }

    #[test]
    fn test_method_matching_configured_value_is_rejected() {
        let mut server = Server::new();
        server.add_route("/ping", RouteDefinition::get("/ping"));
        server.add_route(
            "/put",
            RouteDefinition::new("/put", crate::RouteMethod::Other("PUT".into())),
        );

        let response = server.test_request(b"get /ping HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["status"], 3);

        let response = server.test_request(b"PUT /put HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["status"], 3);
    }

    #[test]
    fn test_method_differing_from_configured_value_passes() {
        let server = ping_server();
        let response = server.test_request(b"POST /ping HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["status"], 0);
    }

    #[test]
    fn test_route_header_rule_beats_base_rule() {
        let mut server = Server::new();
        server
            .add_route(
                "/ping",
                RouteDefinition::get("/ping").header_rule(ValidationRule::new("X", |_| Some(100))),
            )
            .add_base_header_rule(ValidationRule::new("token", |_| Some(200)))
            .set_status(100, Some(StatusDescriptor::error(100, "X rejected")))
            .set_status(200, Some(StatusDescriptor::error(200, "Token rejected")));

        let response = server.test_request(b"GET /ping HTTP/1.1\r\nX: 1\r\ntoken: t\r\n\r\n");
        assert_eq!(body(&response)["status"], 100);
        assert_eq!(body(&response)["msg"], "X rejected");
    }

    #[test]
    fn test_base_header_rule_applies_to_routes_without_rules() {
        let mut server = ping_server();
        server.add_base_header_rule(ValidationRule::required("token", ReservedCode::Header.code()));

        let response = server.test_request(b"GET /ping HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["msg"], "Header error");

        let response = server.test_request(b"GET /ping HTTP/1.1\r\ntoken: abc\r\n\r\n");
        assert_eq!(body(&response)["msg"], "Success");
    }

    #[test]
    fn test_unmapped_rule_code_reports_config_error() {
        let mut server = Server::new();
        server.add_route(
            "/ping",
            RouteDefinition::get("/ping").header_rule(ValidationRule::required("token", 555)),
        );

        let response = server.test_request(b"GET /ping HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["status"], 7);
        assert_eq!(body(&response)["msg"], "Config error");
    }

    #[test]
    fn test_query_rule_reads_json_body() {
        let mut server = Server::new();
        server.add_route(
            "/login",
            RouteDefinition::post("/login")
                .query_rule(ValidationRule::required("user", ReservedCode::Param.code())),
        );

        let response = server.test_request(b"POST /login HTTP/1.1\r\nContent-Length: 2\r\n\r\n{}");
        assert_eq!(body(&response)["msg"], "Param error");

        let raw = b"POST /login HTTP/1.1\r\nContent-Length: 14\r\n\r\n{\"user\":\"ann\"}";
        let response = server.test_request(raw);
        assert_eq!(body(&response)["msg"], "Success");
    }

    #[test]
    fn test_base_query_rules_are_not_evaluated() {
        let mut server = ping_server();
        server.add_base_query_rule(ValidationRule::new("anything", |_| Some(6)));

        let response = server.test_request(b"GET /ping HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["status"], 0);
        assert_eq!(server.state().base_query_rules.len(), 1);
    }

    #[test]
    fn test_removed_method_status_falls_back_to_server_error() {
        let mut server = Server::new();
        server.set_status(ReservedCode::Method.code(), None);

        let response = server.test_request(b"GET /missing HTTP/1.1\r\n\r\n");
        assert_eq!(
            response.body_str(),
            r#"{"status":1,"msg":"Server error","data":""}"#
        );
    }

    #[test]
    fn test_success_ignores_route_payload_by_default() {
        let mut server = Server::new();
        server.add_route(
            "/user",
            RouteDefinition::get("/user").with_payload(json!({"id": 1})),
        );

        let response = server.test_request(b"GET /user HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["data"], "");
    }

    #[test]
    fn test_success_with_route_payload_enabled() {
        let config = ServerConfig {
            respond_with_route_payload: true,
            ..ServerConfig::default()
        };
        let mut server = Server::new().with_config(config);
        server.add_route(
            "/user",
            RouteDefinition::get("/user").with_payload(json!({"id": 1})),
        );

        let response = server.test_request(b"GET /user HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["data"], json!({"id": 1}));
    }

    #[test]
    fn test_default_headers_override_applies_to_every_response() {
        let mut server = Server::new();
        server
            .set_default_headers(HeaderSet::new().with_extra("content_Type", "application/json"))
            .add_route("/ping", RouteDefinition::get("/ping"))
            .add_route(
                "/text",
                RouteDefinition::get("/text")
                    .with_headers(HeaderSet::new().with(HeaderField::ContentType, "text/html")),
            );

        let response = server.test_request(b"GET /missing HTTP/1.1\r\n\r\n");
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("Connection"), None);

        let response = server.test_request(b"GET /ping HTTP/1.1\r\n\r\n");
        assert_eq!(response.header("Content-Type"), Some("application/json"));

        let response = server.test_request(b"GET /text HTTP/1.1\r\n\r\n");
        assert_eq!(response.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_route_headers_do_not_replace_builtin_defaults() {
        let mut server = Server::new();
        server.add_route(
            "/x",
            RouteDefinition::get("/x")
                .with_headers(HeaderSet::new().with(HeaderField::ContentType, "text/html")),
        );

        let response = server.test_request(b"GET /x HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["status"], 0);
        assert_eq!(response.header("Connection"), Some("close"));
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.header("Server"), Some(response::SERVER_NAME));
        assert!(response.header("Date").is_some());
    }

    #[test]
    fn test_percent_encoded_path_reaches_route() {
        let server = ping_server();
        let response = server.test_request(b"GET /p%69ng HTTP/1.1\r\n\r\n");
        assert_eq!(body(&response)["msg"], "Success");
    }

    #[test]
    fn test_code_key_override_in_full_pipeline() {
        let mut server = ping_server();
        server.set_status(
            ReservedCode::Ok.code(),
            Some(StatusDescriptor::success(0, "Success").with_code_key("content")),
        );

        let response = server.test_request(b"GET /ping HTTP/1.1\r\n\r\n");
        let value = body(&response);
        assert_eq!(value["content"], 0);
        assert!(value.get("status").is_none());
    }

    #[test]
    fn test_process_reports_stage() {
        let server = ping_server();
        let exchange = process(server.state(), server.config(), b"GET /ping HTTP/1.1\r\n\r\n");
        assert_eq!(exchange.reached, Stage::QueryChecked);
        assert_eq!(exchange.path.as_deref(), Some("/ping"));
        assert_eq!(exchange.method.as_deref(), Some("GET"));

        let exchange = process(server.state(), server.config(), b"GET /nope HTTP/1.1\r\n\r\n");
        assert_eq!(exchange.reached, Stage::Parsed);
    }

    #[tokio::test]
    async fn test_serve_connection_writes_one_response_and_closes() {
        let server = ping_server();
        let (mut client, server_side) = duplex(64 * 1024);
        client
            .write_all(b"GET /ping HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let exchange = serve_connection(server_side, PEER, server.state(), server.config())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exchange.descriptor.code, 0);

        let mut raw = Vec::new();
        client.read_to_end(&mut raw).await.unwrap();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 ok\r\n"));
        assert!(text.ends_with(r#"{"status":0,"msg":"Success","data":""}"#));
        assert_eq!(text.matches("HTTP/1.1").count(), 1);
    }

    #[tokio::test]
    async fn test_serve_connection_without_request_sends_nothing() {
        let server = ping_server();
        let (mut client, server_side) = duplex(1024);
        client.shutdown().await.unwrap();

        let exchange = serve_connection(server_side, PEER, server.state(), server.config())
            .await
            .unwrap();
        assert!(exchange.is_none());

        let mut raw = Vec::new();
        client.read_to_end(&mut raw).await.unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn test_serve_connection_read_timeout() {
        let config = ServerConfig {
            read_timeout: Some(Duration::from_millis(20)),
            ..ServerConfig::default()
        };
        let server = ping_server().with_config(config);
        let (_client, server_side) = duplex(1024);

        let exchange = serve_connection(server_side, PEER, server.state(), server.config())
            .await
            .unwrap();
        assert!(exchange.is_none());
    }

    #[tokio::test]
    async fn test_serve_connection_bounded_read() {
        let config = ServerConfig {
            max_request_size: 16,
            ..ServerConfig::default()
        };
        let server = ping_server().with_config(config);
        let (mut client, server_side) = duplex(1024);
        client
            .write_all(b"GET /ping HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let exchange = serve_connection(server_side, PEER, server.state(), server.config())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exchange.descriptor.code, ReservedCode::Server.code());
    }

    #[tokio::test]
    async fn test_serve_over_tcp_and_reload() {
        let server = ping_server();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = server.shared_state();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let serving = async {
            server
                .serve_listener(listener, async {
                    let _ = stop_rx.await;
                })
                .await
                .unwrap();
        };

        let client = async {
            let first = roundtrip(addr, b"GET /ping HTTP/1.1\r\n\r\n").await;
            assert!(first.ends_with(r#"{"status":0,"msg":"Success","data":""}"#));

            let mut next = ServerState::new();
            next.add_route("/pong", RouteDefinition::get("/pong"));
            handle.store(next);

            let second = roundtrip(addr, b"GET /ping HTTP/1.1\r\n\r\n").await;
            assert!(second.ends_with(r#"{"status":3,"msg":"Method error","data":""}"#));
            let third = roundtrip(addr, b"GET /pong HTTP/1.1\r\n\r\n").await;
            assert!(third.ends_with(r#"{"status":0,"msg":"Success","data":""}"#));

            stop_tx.send(()).unwrap();
        };

        tokio::join!(serving, client);
    }

    async fn roundtrip(addr: SocketAddr, raw: &[u8]) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw).await.unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_serve_reports_bind_error() {
        let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = blocker.local_addr().unwrap();
        let server = Server::new().bind(addr);

        let result = tokio_test::block_on(server.serve());
        assert!(matches!(result, Err(Error::BindError { .. })));
    }
}
