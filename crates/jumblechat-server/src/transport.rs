//! WebSocket-over-HTTP transport.
//!
//! One TCP listener serves everything: plain HTTP for the client page and
//! the websocket upgrade for event traffic, on the same port. The upgrade is
//! done by hand - hyper performs the HTTP/1.1 connection switch and
//! tungstenite takes over the raw stream - so the relay owns the full
//! handshake without pulling in a framework.

use std::net::SocketAddr;

use bytes::Bytes;
use http::{Request, Response, StatusCode, header};
use http_body_util::Full;
use hyper::{
    body::Incoming,
    upgrade::{OnUpgrade, Upgraded},
};
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tungstenite::{handshake::derive_accept_key, protocol::Role};

use crate::error::ServerError;

/// A server-side websocket stream over an upgraded HTTP connection.
pub(crate) type WsStream = WebSocketStream<TokioIo<Upgraded>>;

/// TCP transport for the relay.
///
/// Owns the listener; connection handling (HTTP routing, upgrades) happens
/// in the server runtime.
pub struct WsTransport {
    /// Bound TCP listener
    listener: TcpListener,
}

impl WsTransport {
    /// Create and bind a new transport.
    pub async fn bind(address: &str) -> Result<Self, ServerError> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address '{address}': {e}")))?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Transport(format!("failed to bind {addr}: {e}")))?;

        tracing::info!("transport bound to {}", addr);

        Ok(Self { listener })
    }

    /// Accept a new TCP connection.
    ///
    /// Blocks until a connection is available.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ServerError> {
        self.listener
            .accept()
            .await
            .map_err(|e| ServerError::Transport(format!("accept failed: {e}")))
    }

    /// Local address the transport is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|e| ServerError::Transport(format!("failed to get local address: {e}")))
    }
}

/// Whether a request asks for a websocket upgrade.
pub(crate) fn is_upgrade_request<B>(req: &Request<B>) -> bool {
    header_contains(req, &header::CONNECTION, "upgrade")
        && header_contains(req, &header::UPGRADE, "websocket")
}

fn header_contains<B>(req: &Request<B>, name: &header::HeaderName, needle: &str) -> bool {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.split(',').any(|part| part.trim().eq_ignore_ascii_case(needle)))
}

/// Start a websocket upgrade on an HTTP request.
///
/// Returns the `101 Switching Protocols` response to hand back to hyper plus
/// the pending upgrade. The caller must return the response for the switch
/// to happen; the upgrade is awaited from a spawned task and the raw stream
/// wrapped with [`websocket_stream`].
pub(crate) fn upgrade_websocket(
    req: &mut Request<Incoming>,
) -> Result<(Response<Full<Bytes>>, OnUpgrade), ServerError> {
    let key = req
        .headers()
        .get(header::SEC_WEBSOCKET_KEY)
        .ok_or_else(|| ServerError::Protocol("missing Sec-WebSocket-Key header".to_owned()))?;
    let accept_key = derive_accept_key(key.as_bytes());

    let on_upgrade = hyper::upgrade::on(req);

    let response = Response::builder()
        .status(StatusCode::SWITCHING_PROTOCOLS)
        .header(header::CONNECTION, "upgrade")
        .header(header::UPGRADE, "websocket")
        .header(header::SEC_WEBSOCKET_ACCEPT, accept_key)
        .body(Full::new(Bytes::new()))
        .map_err(|e| ServerError::Internal(format!("failed to build upgrade response: {e}")))?;

    Ok((response, on_upgrade))
}

/// Wrap an upgraded HTTP connection as a server-side websocket stream.
pub(crate) async fn websocket_stream(upgraded: Upgraded) -> WsStream {
    WebSocketStream::from_raw_socket(TokioIo::new(upgraded), Role::Server, None).await
}
