//! In-memory room membership.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;

use margins_core::result::AppResult;
use margins_core::types::id::{PrincipalId, RoomId};
use margins_realtime::collaborators::MembershipChecker;

/// In-memory membership table keyed by room.
#[derive(Debug, Default)]
pub struct MemoryMembership {
    /// Room ID → member principals.
    members: DashMap<RoomId, HashSet<PrincipalId>>,
}

impl MemoryMembership {
    /// Creates a new empty membership table.
    pub fn new() -> Self {
        Self {
            members: DashMap::new(),
        }
    }

    /// Grants a principal membership of a room.
    pub fn grant(&self, principal_id: PrincipalId, room_id: RoomId) {
        self.members.entry(room_id).or_default().insert(principal_id);
    }

    /// Removes a principal's membership of a room.
    pub fn retract(&self, principal_id: PrincipalId, room_id: RoomId) {
        if let Some(mut members) = self.members.get_mut(&room_id) {
            members.remove(&principal_id);
        }
    }
}

#[async_trait]
impl MembershipChecker for MemoryMembership {
    async fn is_member(&self, principal_id: PrincipalId, room_id: RoomId) -> AppResult<bool> {
        Ok(self
            .members
            .get(&room_id)
            .map(|members| members.contains(&principal_id))
            .unwrap_or(false))
    }
}
