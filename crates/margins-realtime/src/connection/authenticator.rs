//! Handshake authentication — validates the access token presented at
//! connection establishment.

use std::sync::Arc;

use margins_auth::jwt::JwtDecoder;
use margins_core::error::AppError;
use margins_core::types::id::SessionId;
use margins_entity::Identity;

/// Authenticated connection info extracted from the handshake credential.
#[derive(Debug, Clone)]
pub struct AuthenticatedConnection {
    /// Verified identity.
    pub identity: Identity,
    /// Session the credential is bound to.
    pub session_id: SessionId,
}

/// Authenticates WebSocket connections using access tokens.
///
/// Verification happens exactly once, at handshake time. There is no
/// refresh fallback here: an expired credential rejects the connection and
/// the client must reconnect with a freshly refreshed token obtained
/// out-of-band. Live connections are not re-verified, so revoking a
/// session does not drop already-joined sockets until they reconnect.
#[derive(Clone)]
pub struct GatewayAuthenticator {
    /// JWT decoder.
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for GatewayAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayAuthenticator").finish()
    }
}

impl GatewayAuthenticator {
    /// Creates a new gateway authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticates a connection using an access token (typically from
    /// the `token` query parameter of the upgrade request).
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedConnection, AppError> {
        let claims = self.decoder.decode_access_token(token)?;

        Ok(AuthenticatedConnection {
            identity: claims.identity(),
            session_id: claims.session_id(),
        })
    }
}
