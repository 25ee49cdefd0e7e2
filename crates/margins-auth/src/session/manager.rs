//! Session lifecycle manager — open, issue, verify, refresh, revoke.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use margins_core::config::session::SessionConfig;
use margins_core::error::AppError;
use margins_core::types::id::SessionId;
use margins_entity::{Identity, Session};

use crate::jwt::encoder::TokenPair;
use crate::jwt::{JwtDecoder, JwtEncoder};

use super::store::SessionRepository;

/// Manages the complete credential lifecycle.
///
/// Tokens are derivative, unstored artifacts; the persisted session row is
/// the unit of revocation. Refreshing re-issues a pair for the **same**
/// session id, so revoking one session invalidates every refresh token
/// minted from it, no matter how many pairs were issued in between.
#[derive(Clone)]
pub struct SessionManager {
    /// JWT encoder for token generation.
    jwt_encoder: Arc<JwtEncoder>,
    /// JWT decoder for token validation.
    jwt_decoder: Arc<JwtDecoder>,
    /// Session persistence.
    sessions: Arc<dyn SessionRepository>,
    /// Session configuration.
    session_config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session_config", &self.session_config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager with all required dependencies.
    pub fn new(
        jwt_encoder: Arc<JwtEncoder>,
        jwt_decoder: Arc<JwtDecoder>,
        sessions: Arc<dyn SessionRepository>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            jwt_encoder,
            jwt_decoder,
            sessions,
            session_config,
        }
    }

    /// Opens a new session for the given identity and issues the initial
    /// credential pair. Called from the login/registration flow.
    pub async fn open_session(
        &self,
        identity: &Identity,
    ) -> Result<(Session, TokenPair), AppError> {
        let expires_at =
            Utc::now() + chrono::Duration::days(self.session_config.lifetime_days as i64);

        let session = self.sessions.create(identity.principal_id, expires_at).await?;
        let tokens = self.jwt_encoder.issue_pair(session.id, identity)?;

        info!(
            principal_id = %identity.principal_id,
            session_id = %session.id,
            "Session opened"
        );

        Ok((session, tokens))
    }

    /// Mints a fresh credential pair for an existing session.
    ///
    /// Deterministic apart from the clock; no side effects beyond token
    /// construction.
    pub fn issue(
        &self,
        session_id: SessionId,
        identity: &Identity,
    ) -> Result<TokenPair, AppError> {
        self.jwt_encoder.issue_pair(session_id, identity)
    }

    /// Verifies an access token and returns the identity it asserts.
    ///
    /// Any failure (expired, malformed, wrong kind, bad signature) treats
    /// the caller as unauthenticated.
    pub fn verify_access(&self, token: &str) -> Result<Identity, AppError> {
        let claims = self.jwt_decoder.decode_access_token(token)?;
        Ok(claims.identity())
    }

    /// Refreshes a credential pair using a valid refresh token.
    ///
    /// 1. Validate refresh token signature and kind
    /// 2. Load the referenced session; fail if absent
    /// 3. If the session itself has expired, delete it and fail
    /// 4. Issue a brand-new pair bound to the same session id
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.jwt_decoder.decode_refresh_token(refresh_token)?;
        let session_id = claims.session_id();

        let session = self
            .sessions
            .find(session_id)
            .await?
            .ok_or_else(|| AppError::authentication("Session not found"))?;

        if session.is_expired() {
            // Lazy cleanup: the expired row is useless to every token
            // derived from it.
            let _ = self.sessions.delete(session_id).await;
            return Err(AppError::authentication("Session has expired"));
        }

        let tokens = self.jwt_encoder.issue_pair(session_id, &claims.identity())?;

        info!(
            principal_id = %claims.principal_id(),
            session_id = %session_id,
            "Credentials refreshed"
        );

        Ok(tokens)
    }

    /// Revokes a session by deleting its record.
    ///
    /// Outstanding refresh tokens referencing it fail at their next use.
    /// Unexpired access tokens remain valid until their own expiry — an
    /// accepted staleness window, bounded by the access TTL.
    pub async fn revoke(&self, session_id: SessionId) -> Result<(), AppError> {
        let deleted = self.sessions.delete(session_id).await?;

        if deleted {
            info!(session_id = %session_id, "Session revoked");
        } else {
            warn!(session_id = %session_id, "Revoke for unknown session");
        }

        Ok(())
    }
}
