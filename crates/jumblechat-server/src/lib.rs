//! JumbleChat production server.
//!
//! Production server implementation using hyper + tungstenite for the
//! websocket transport, Tokio for the async runtime, and OS randomness for
//! session IDs and the jumble shuffle.
//!
//! # Architecture
//!
//! This crate provides production "glue" around the action-based
//! [`RelayDriver`]. The driver follows the Sans-IO pattern: it consumes
//! [`RelayEvent`]s and returns [`RelayAction`]s without performing any I/O
//! itself. [`Server`] executes those actions against the live websocket
//! connections.
//!
//! # Components
//!
//! - [`RelayDriver`]: Action-based dispatcher (pure logic, no I/O)
//! - [`Server`]: Production runtime that executes driver actions
//! - [`WsTransport`]: TCP listener; HTTP routing + websocket upgrades
//! - [`SystemEnv`]: Production environment (real time, crypto RNG)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod error;
mod mode_table;
mod registry;
mod server_error;
mod system_env;
mod transport;

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use bytes::Bytes;
pub use driver::{
    ADMIN_ROOM, ADMIN_USERNAME, LogLevel, RelayAction, RelayConfig, RelayDriver, RelayEvent,
};
pub use error::ServerError;
use futures_util::{SinkExt, StreamExt};
use http::{Method, Request, Response, StatusCode, header};
use http_body_util::Full;
use hyper::{body::Incoming, service::service_fn};
use hyper_util::rt::TokioIo;
use jumblechat_core::env::Environment;
use jumblechat_proto::{ClientEvent, ProtocolError, ServerEvent};
pub use mode_table::ModeTable;
pub use registry::{SessionInfo, SessionRegistry};
pub use server_error::RelayError;
pub use system_env::SystemEnv;
use tokio::{
    net::TcpStream,
    sync::{Mutex, RwLock, mpsc},
};
use transport::{WsStream, is_upgrade_request, upgrade_websocket};
pub use transport::WsTransport;
use tungstenite::Message as WsMessage;

/// The embedded chat client page, served from `GET /`.
static INDEX_HTML: &str = include_str!("../assets/index.html");

/// Shared state for all connections.
///
/// Holds the per-session outbound channels for message routing. Each
/// session's messages go through its single channel, preserving per-session
/// ordering.
struct SharedState {
    /// Map of session ID to outbound message channel
    senders: RwLock<HashMap<u64, mpsc::UnboundedSender<WsMessage>>>,
}

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080")
    pub bind_address: String,
    /// Relay configuration (connection limits)
    pub relay: RelayConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:8080".to_owned(), relay: RelayConfig::default() }
    }
}

/// Production JumbleChat server.
///
/// Wraps `RelayDriver` with the websocket transport and system environment.
pub struct Server {
    /// The action-based relay driver
    driver: RelayDriver<SystemEnv>,
    /// TCP listener
    transport: WsTransport,
    /// Environment
    env: SystemEnv,
}

impl Server {
    /// Create and bind a new server.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let env = SystemEnv::new();
        let driver = RelayDriver::new(env.clone(), config.relay);
        let transport = WsTransport::bind(&config.bind_address).await?;

        Ok(Self { driver, transport, env })
    }

    /// Run the server, accepting connections and processing events.
    ///
    /// This method runs until the server is shut down or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server starting on {}", self.transport.local_addr()?);

        let env = self.env;
        let driver = Arc::new(Mutex::new(self.driver));
        let shared = Arc::new(SharedState { senders: RwLock::new(HashMap::new()) });

        loop {
            match self.transport.accept().await {
                Ok((stream, addr)) => {
                    let driver = Arc::clone(&driver);
                    let shared = Arc::clone(&shared);
                    let env = env.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, driver, shared, env).await
                        {
                            tracing::error!("Connection error: {}", e);
                        }
                    });
                },
                Err(e) => {
                    tracing::error!("Accept error: {}", e);
                },
            }
        }
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.transport.local_addr()
    }
}

/// Handle a single TCP connection: serve HTTP until it closes or upgrades.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    driver: Arc<Mutex<RelayDriver<SystemEnv>>>,
    shared: Arc<SharedState>,
    env: SystemEnv,
) -> Result<(), ServerError> {
    tracing::debug!("connection from {}", addr);

    let service = service_fn(move |req: Request<Incoming>| {
        let driver = Arc::clone(&driver);
        let shared = Arc::clone(&shared);
        let env = env.clone();
        async move {
            Ok::<_, std::convert::Infallible>(route_request(req, driver, shared, env))
        }
    });

    hyper::server::conn::http1::Builder::new()
        .serve_connection(TokioIo::new(stream), service)
        .with_upgrades()
        .await
        .map_err(|e| ServerError::Transport(format!("http connection failed: {e}")))
}

/// Route one HTTP request: websocket upgrade, client page, or 404.
fn route_request(
    mut req: Request<Incoming>,
    driver: Arc<Mutex<RelayDriver<SystemEnv>>>,
    shared: Arc<SharedState>,
    env: SystemEnv,
) -> Response<Full<Bytes>> {
    if is_upgrade_request(&req) {
        return match upgrade_websocket(&mut req) {
            Ok((response, on_upgrade)) => {
                tokio::spawn(async move {
                    match on_upgrade.await {
                        Ok(upgraded) => {
                            let ws = transport::websocket_stream(upgraded).await;
                            let session_id = env.random_u64();
                            if let Err(e) = serve_socket(ws, session_id, &driver, &shared).await {
                                tracing::warn!("websocket session {} failed: {}", session_id, e);
                            }
                        },
                        Err(e) => tracing::debug!("websocket upgrade failed: {}", e),
                    }
                });
                response
            },
            Err(e) => {
                tracing::debug!("bad upgrade request: {}", e);
                status_response(StatusCode::BAD_REQUEST, "bad websocket upgrade request")
            },
        };
    }

    if req.method() == Method::GET && req.uri().path() == "/" {
        return html_response(INDEX_HTML);
    }

    status_response(StatusCode::NOT_FOUND, "not found")
}

fn html_response(body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/html; charset=utf-8"));
    response
}

fn status_response(status: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = status;
    response
}

/// Serve one websocket session until the peer disconnects.
///
/// The read half feeds decoded events to the driver; the write half is
/// drained by a spawned writer task so broadcasts from other sessions never
/// block on this connection.
async fn serve_socket(
    ws: WsStream,
    session_id: u64,
    driver: &Mutex<RelayDriver<SystemEnv>>,
    shared: &SharedState,
) -> Result<(), ServerError> {
    tracing::debug!("new websocket session: {}", session_id);

    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    shared.senders.write().await.insert(session_id, tx.clone());

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let is_close = matches!(message, WsMessage::Close(_));
            if sink.send(message).await.is_err() {
                break;
            }
            if is_close {
                break;
            }
        }
        let _ = sink.close().await;
    });

    {
        let mut driver = driver.lock().await;
        let actions = driver.process_event(RelayEvent::ConnectionAccepted { session_id })?;
        execute_actions(&driver, actions, shared).await;
    }

    while let Some(result) = stream.next().await {
        match result {
            Ok(WsMessage::Text(text)) => match ClientEvent::decode(text.as_str()) {
                Ok(event) => {
                    let mut driver = driver.lock().await;
                    match driver.process_event(RelayEvent::EventReceived { session_id, event }) {
                        Ok(actions) => execute_actions(&driver, actions, shared).await,
                        Err(e) => {
                            tracing::warn!("event processing error for {}: {}", session_id, e);
                        },
                    }
                },
                Err(e) => {
                    tracing::debug!("rejected frame from {}: {}", session_id, e);
                    send_error(&tx, &e);
                },
            },
            Ok(WsMessage::Binary(_)) => {
                let e = ProtocolError::NotText;
                tracing::debug!("rejected frame from {}: {}", session_id, e);
                send_error(&tx, &e);
            },
            Ok(WsMessage::Close(_)) => break,
            Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_)) => {},
            Err(e) => {
                tracing::debug!("read error on session {}: {}", session_id, e);
                break;
            },
        }
    }

    shared.senders.write().await.remove(&session_id);
    drop(tx);

    {
        let mut driver = driver.lock().await;
        let actions = driver.process_event(RelayEvent::ConnectionClosed {
            session_id,
            reason: "connection closed".to_owned(),
        })?;
        execute_actions(&driver, actions, shared).await;
    }

    let _ = writer.await;

    tracing::debug!("websocket session closed: {}", session_id);

    Ok(())
}

/// Report a rejected frame back to its sender only.
fn send_error(tx: &mpsc::UnboundedSender<WsMessage>, err: &ProtocolError) {
    match ServerEvent::error(err.to_string()).encode() {
        Ok(text) => {
            let _ = tx.send(WsMessage::text(text));
        },
        Err(e) => tracing::error!("failed to encode error event: {}", e),
    }
}

/// Execute relay actions.
async fn execute_actions(
    driver: &RelayDriver<SystemEnv>,
    actions: Vec<RelayAction>,
    shared: &SharedState,
) {
    for action in actions {
        match action {
            RelayAction::SendToSession { session_id, event } => {
                let Some(message) = encode_event(&event) else { continue };

                let senders = shared.senders.read().await;
                if let Some(tx) = senders.get(&session_id) {
                    if tx.send(message).is_err() {
                        tracing::warn!("SendToSession write failed for {}: channel closed", session_id);
                    }
                } else {
                    tracing::warn!("SendToSession: session {} not found", session_id);
                }
            },

            RelayAction::BroadcastToRoom { room, event, exclude_session } => {
                let sessions: Vec<u64> = driver.sessions_in_room(&room).collect();

                let Some(message) = encode_event(&event) else { continue };

                let senders = shared.senders.read().await;
                for session_id in sessions {
                    if Some(session_id) != exclude_session {
                        if let Some(tx) = senders.get(&session_id) {
                            if tx.send(message.clone()).is_err() {
                                tracing::warn!(
                                    "BroadcastToRoom write failed for {}: channel closed",
                                    session_id
                                );
                            }
                        }
                    }
                }
            },

            RelayAction::CloseConnection { session_id, reason } => {
                tracing::info!("Closing connection {}: {}", session_id, reason);
                let mut senders = shared.senders.write().await;
                if let Some(tx) = senders.remove(&session_id) {
                    let _ = tx.send(WsMessage::Close(None));
                }
            },

            RelayAction::Log { level, message } => match level {
                LogLevel::Debug => tracing::debug!("{}", message),
                LogLevel::Info => tracing::info!("{}", message),
                LogLevel::Warn => tracing::warn!("{}", message),
                LogLevel::Error => tracing::error!("{}", message),
            },
        }
    }
}

/// Encode an outbound event as a text frame, logging on failure.
fn encode_event(event: &ServerEvent) -> Option<WsMessage> {
    match event.encode() {
        Ok(text) => Some(WsMessage::text(text)),
        Err(e) => {
            tracing::error!("failed to encode outbound event: {}", e);
            None
        },
    }
}
