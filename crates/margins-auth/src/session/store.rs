//! Session persistence interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use margins_core::result::AppResult;
use margins_core::types::id::{PrincipalId, SessionId};
use margins_entity::Session;

/// Persistence operations for session records.
///
/// The session manager is the only consumer of this interface; no other
/// component reads or writes session rows. The backing store is an
/// external collaborator (a database in a full deployment, an in-memory
/// map in tests and single-process installs).
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Finds a session by ID.
    async fn find(&self, id: SessionId) -> AppResult<Option<Session>>;

    /// Creates a new session record for the given principal.
    async fn create(
        &self,
        principal_id: PrincipalId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session>;

    /// Deletes a session record. Returns `true` if a record was deleted.
    async fn delete(&self, id: SessionId) -> AppResult<bool>;
}
