//! In-memory session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use margins_auth::session::store::SessionRepository;
use margins_core::result::AppResult;
use margins_core::types::id::{PrincipalId, SessionId};
use margins_entity::Session;

/// In-memory session store keyed by session ID.
#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    /// Session ID → session record.
    sessions: DashMap<SessionId, Session>,
}

impl MemorySessionRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Returns the number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns whether the repository is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn find(&self, id: SessionId) -> AppResult<Option<Session>> {
        Ok(self.sessions.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create(
        &self,
        principal_id: PrincipalId,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let session = Session {
            id: SessionId::new(),
            principal_id,
            created_at: Utc::now(),
            expires_at,
        };
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn delete(&self, id: SessionId) -> AppResult<bool> {
        Ok(self.sessions.remove(&id).is_some())
    }
}
