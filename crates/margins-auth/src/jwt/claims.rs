//! JWT claims structure used in access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use margins_core::types::id::{PrincipalId, SessionId};
use margins_entity::Identity;

/// JWT claims payload embedded in every token.
///
/// Both halves of a credential pair carry the same `sub`/`sid`/`name`;
/// only `exp` and `token_type` differ. The session id binds every derived
/// token to one revocable session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the principal ID.
    pub sub: PrincipalId,
    /// Session ID this token belongs to.
    pub sid: SessionId,
    /// Display name at the time of token issuance.
    pub name: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// JWT ID, unique per minted token.
    pub jti: Uuid,
    /// Token type: "access" or "refresh".
    pub token_type: TokenType,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token presented at the realtime handshake.
    Access,
    /// Long-lived refresh token for obtaining new pairs.
    Refresh,
}

impl Claims {
    /// Returns the principal ID from the subject claim.
    pub fn principal_id(&self) -> PrincipalId {
        self.sub
    }

    /// Returns the session ID.
    pub fn session_id(&self) -> SessionId {
        self.sid
    }

    /// Returns the display identity embedded at issuance.
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub, self.name.clone())
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
