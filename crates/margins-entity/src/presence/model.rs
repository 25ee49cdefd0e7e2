//! Ephemeral presence entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use margins_core::types::id::RoomId;

use crate::identity::Identity;

/// One connection's membership in one room.
///
/// Presence entries are ephemeral, in-memory, process-local state: created
/// when a connection joins a room, removed on leave or disconnect, never
/// persisted. A principal with several tabs or devices open holds several
/// independent entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceEntry {
    /// The connection this entry is tied to.
    pub connection_id: Uuid,
    /// The identity shown to other room members.
    pub identity: Identity,
    /// The room the connection has joined.
    pub room_id: RoomId,
    /// When the connection joined the room.
    pub joined_at: DateTime<Utc>,
}

impl PresenceEntry {
    /// Creates a new presence entry stamped with the current time.
    pub fn new(connection_id: Uuid, identity: Identity, room_id: RoomId) -> Self {
        Self {
            connection_id,
            identity,
            room_id,
            joined_at: Utc::now(),
        }
    }
}
