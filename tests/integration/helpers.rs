//! Shared test application wiring.

use std::sync::Arc;

use tokio::sync::mpsc;

use margins_auth::jwt::{JwtDecoder, JwtEncoder, TokenPair};
use margins_auth::session::SessionManager;
use margins_core::config::auth::AuthConfig;
use margins_core::config::realtime::RealtimeConfig;
use margins_core::config::session::SessionConfig;
use margins_core::types::id::{PrincipalId, RoomId};
use margins_entity::Identity;
use margins_realtime::connection::handle::ConnectionId;
use margins_realtime::message::types::{ClientEvent, ServerEvent};
use margins_realtime::{Gateway, GatewayAuthenticator};
use margins_store::{
    MemoryCommentStore, MemoryDocumentSource, MemoryMembership, MemorySessionRepository,
};

/// Fully wired in-memory application.
pub struct TestApp {
    pub auth_config: AuthConfig,
    pub session_manager: Arc<SessionManager>,
    pub authenticator: GatewayAuthenticator,
    pub gateway: Arc<Gateway>,
    pub membership: Arc<MemoryMembership>,
    pub comments: Arc<MemoryCommentStore>,
    pub documents: Arc<MemoryDocumentSource>,
}

impl TestApp {
    pub fn new() -> Self {
        let auth_config = AuthConfig {
            jwt_secret: "integration-test-secret".to_string(),
            jwt_access_ttl_minutes: 15,
            jwt_refresh_ttl_days: 7,
        };

        let sessions = Arc::new(MemorySessionRepository::new());
        let membership = Arc::new(MemoryMembership::new());
        let comments = Arc::new(MemoryCommentStore::new());
        let documents = Arc::new(MemoryDocumentSource::new());

        let jwt_encoder = Arc::new(JwtEncoder::new(&auth_config));
        let jwt_decoder = Arc::new(JwtDecoder::new(&auth_config));

        let session_manager = Arc::new(SessionManager::new(
            jwt_encoder,
            Arc::clone(&jwt_decoder),
            sessions.clone(),
            SessionConfig { lifetime_days: 14 },
        ));

        let membership_checker: Arc<dyn margins_realtime::MembershipChecker> =
            membership.clone();
        let comment_store: Arc<dyn margins_realtime::CommentStore> = comments.clone();
        let gateway = Arc::new(Gateway::new(
            RealtimeConfig {
                channel_buffer_size: 64,
                max_frame_bytes: 64 * 1024,
            },
            membership_checker,
            comment_store,
        ));

        let authenticator = GatewayAuthenticator::new(jwt_decoder);

        Self {
            auth_config,
            session_manager,
            authenticator,
            gateway,
            membership,
            comments,
            documents,
        }
    }

    /// Creates a principal and opens a session for it.
    pub async fn login(&self, name: &str) -> (Identity, TokenPair) {
        let identity = Identity::new(PrincipalId::new(), name);
        let (_, tokens) = self
            .session_manager
            .open_session(&identity)
            .await
            .expect("open session");
        (identity, tokens)
    }

    /// Grants room membership.
    pub fn grant(&self, identity: &Identity, room_id: RoomId) {
        self.membership.grant(identity.principal_id, room_id);
    }

    /// Runs the handshake path (credential verification + registration)
    /// for an access token and returns the attached connection.
    pub fn connect(&self, access_token: &str) -> TestConnection {
        let auth = self
            .authenticator
            .authenticate(access_token)
            .expect("handshake auth");
        let (handle, rx) = self.gateway.register(auth);
        TestConnection {
            conn_id: handle.id,
            gateway: Arc::clone(&self.gateway),
            rx,
        }
    }
}

/// One registered connection with its outbound event stream.
pub struct TestConnection {
    pub conn_id: ConnectionId,
    gateway: Arc<Gateway>,
    rx: mpsc::Receiver<String>,
}

impl TestConnection {
    /// Sends a client event through the gateway, as the transport would.
    pub async fn emit(&self, event: &ClientEvent) {
        let raw = serde_json::to_string(event).expect("serialize event");
        self.gateway.handle_event(&self.conn_id, &raw).await;
    }

    /// Sends a raw frame (for malformed-input tests).
    pub async fn emit_raw(&self, raw: &str) {
        self.gateway.handle_event(&self.conn_id, raw).await;
    }

    /// Pops the next pending outbound event, if any.
    ///
    /// Handlers complete before `handle_event` returns, so anything the
    /// gateway sent is already buffered.
    pub fn recv(&mut self) -> Option<ServerEvent> {
        match self.rx.try_recv() {
            Ok(raw) => Some(serde_json::from_str(&raw).expect("parse server event")),
            Err(_) => None,
        }
    }

    /// Drains all pending outbound events.
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.recv() {
            events.push(event);
        }
        events
    }

    /// Simulates the transport dropping the connection.
    pub fn disconnect(&self) {
        self.gateway.unregister(&self.conn_id);
    }
}
