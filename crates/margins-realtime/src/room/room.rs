//! Single room with member tracking.

use margins_core::types::id::RoomId;
use margins_entity::{Identity, PresenceEntry};

use crate::connection::handle::ConnectionId;

/// A single room: the set of live connections viewing one document
/// instance. Entries are kept in join order, which is also the order of
/// the active-users snapshot sent to a joining connection.
#[derive(Debug, Clone)]
pub struct Room {
    /// Room identifier.
    pub id: RoomId,
    /// Presence entries in join order.
    pub entries: Vec<PresenceEntry>,
}

impl Room {
    /// Creates a new empty room.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            entries: Vec::new(),
        }
    }

    /// Adds a presence entry.
    pub fn add(&mut self, entry: PresenceEntry) {
        self.entries.push(entry);
    }

    /// Removes the entry for a connection, returning it if present.
    pub fn remove(&mut self, conn_id: ConnectionId) -> Option<PresenceEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.connection_id == conn_id)?;
        Some(self.entries.remove(idx))
    }

    /// Returns member identities in join order.
    pub fn member_identities(&self) -> Vec<Identity> {
        self.entries.iter().map(|e| e.identity.clone()).collect()
    }

    /// Returns member connection IDs, excluding the given connection.
    pub fn member_connections_except(&self, conn_id: ConnectionId) -> Vec<ConnectionId> {
        self.entries
            .iter()
            .filter(|e| e.connection_id != conn_id)
            .map(|e| e.connection_id)
            .collect()
    }

    /// Returns all member connection IDs.
    pub fn member_connections(&self) -> Vec<ConnectionId> {
        self.entries.iter().map(|e| e.connection_id).collect()
    }

    /// Returns member count.
    pub fn member_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the room has any members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
