//! WebSocket listener — terminates connections and feeds the gateway.
//!
//! This is the only module that knows about the transport. The handshake
//! credential is verified inside the upgrade callback, so an invalid or
//! expired token rejects the connection before any event is processed.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, info, warn};

use margins_core::config::app::ServerConfig;
use margins_core::config::realtime::RealtimeConfig;
use margins_core::error::AppError;

use crate::connection::authenticator::{AuthenticatedConnection, GatewayAuthenticator};
use crate::gateway::Gateway;
use crate::message::types::ServerEvent;

/// The realtime WebSocket server.
#[derive(Clone)]
pub struct RealtimeServer {
    /// Event gateway.
    gateway: Arc<Gateway>,
    /// Handshake authenticator.
    authenticator: GatewayAuthenticator,
    /// Listener configuration.
    server_config: ServerConfig,
    /// Gateway configuration.
    realtime_config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeServer").finish()
    }
}

impl RealtimeServer {
    /// Creates a new realtime server.
    pub fn new(
        gateway: Arc<Gateway>,
        authenticator: GatewayAuthenticator,
        server_config: ServerConfig,
        realtime_config: RealtimeConfig,
    ) -> Self {
        Self {
            gateway,
            authenticator,
            server_config,
            realtime_config,
        }
    }

    /// Binds the listener and serves until the shutdown signal flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), AppError> {
        let addr = format!("{}:{}", self.server_config.host, self.server_config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

        info!(addr = %addr, "Realtime server listening");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let gateway = Arc::clone(&self.gateway);
                            let authenticator = self.authenticator.clone();
                            let max_frame_bytes = self.realtime_config.max_frame_bytes;
                            tokio::spawn(async move {
                                if let Err(e) =
                                    handle_socket(stream, peer, gateway, authenticator, max_frame_bytes)
                                        .await
                                {
                                    debug!(peer = %peer, error = %e, "Connection ended");
                                }
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Realtime server shutting down");
        self.gateway.close_all();
        Ok(())
    }
}

/// Handles one socket from handshake to disconnect.
async fn handle_socket(
    stream: TcpStream,
    peer: SocketAddr,
    gateway: Arc<Gateway>,
    authenticator: GatewayAuthenticator,
    max_frame_bytes: usize,
) -> Result<(), AppError> {
    let mut auth: Option<AuthenticatedConnection> = None;

    // Authenticate inside the upgrade callback: a bad credential rejects
    // the handshake itself with a 401, before any event is processed.
    let callback = |request: &Request, response: Response| {
        let token = request
            .uri()
            .query()
            .and_then(|query| query.split('&').find_map(|pair| pair.strip_prefix("token=")));

        let Some(token) = token else {
            return Err(unauthorized("Missing access token"));
        };

        match authenticator.authenticate(token) {
            Ok(verified) => {
                auth = Some(verified);
                Ok(response)
            }
            Err(e) => Err(unauthorized(&e.message)),
        }
    };

    let ws = tokio_tungstenite::accept_hdr_async(stream, callback)
        .await
        .map_err(|e| AppError::authentication(format!("Handshake rejected: {e}")))?;

    let auth =
        auth.ok_or_else(|| AppError::internal("Handshake completed without credentials"))?;

    debug!(peer = %peer, principal_id = %auth.identity.principal_id, "Handshake accepted");

    let (mut ws_tx, mut ws_rx) = ws.split();
    let (handle, mut outbound_rx) = gateway.register(auth);
    let conn_id = handle.id;

    // Outbound forwarder: drains the connection's channel into the sink.
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if ws_tx.send(Message::text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Inbound loop: events are processed in receipt order, one at a time.
    while let Some(frame) = ws_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if text.len() > max_frame_bytes {
                    handle.send(
                        ServerEvent::Error {
                            message: format!("Frame exceeds {max_frame_bytes} bytes"),
                        }
                        .encode(),
                    );
                    continue;
                }
                gateway.handle_event(&conn_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer.abort();
    gateway.unregister(&conn_id);

    Ok(())
}

/// Builds a 401 handshake rejection.
fn unauthorized(message: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(message.to_string()));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
}
