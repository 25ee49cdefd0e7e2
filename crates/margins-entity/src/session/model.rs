//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use margins_core::types::id::{PrincipalId, SessionId};

/// A persisted session record.
///
/// Sessions are created when a principal logs in or registers and deleted
/// on explicit logout, revocation, or when found expired during a refresh.
/// The access/refresh credential pair is derived from the session and
/// never stored; deleting the session is the unit of revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier, embedded in every derived token.
    pub id: SessionId,
    /// The principal this session belongs to.
    pub principal_id: PrincipalId,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session expires (absolute timeout).
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
