//! Room registry — the single owner of the in-memory presence table.
//!
//! All presence state lives here and is only reachable through these
//! methods; no other component reads or writes the room/member maps.
//! Methods are synchronous: a handler that joins or leaves completes the
//! entire table mutation before any broadcast is sent, which is what
//! guarantees the leave-before-join ordering for a connection switching
//! rooms.

use dashmap::DashMap;
use tracing::debug;

use margins_core::types::id::RoomId;
use margins_entity::{Identity, PresenceEntry};

use crate::connection::handle::ConnectionId;

use super::room::Room;

/// A connection's departure from a room, with the broadcast recipient set.
#[derive(Debug, Clone)]
pub struct Departure {
    /// Room that was left.
    pub room_id: RoomId,
    /// Identity that left.
    pub identity: Identity,
    /// Remaining members to notify.
    pub recipients: Vec<ConnectionId>,
}

/// Result of a join: the implicit departure (if the connection was bound
/// elsewhere) strictly precedes the join in broadcast order.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// Departure from the previously bound room, if any.
    pub left: Option<Departure>,
    /// Room that was joined.
    pub room_id: RoomId,
    /// Identity that joined.
    pub identity: Identity,
    /// Other members to notify of the join.
    pub recipients: Vec<ConnectionId>,
    /// Full member list (join order, including the joiner), returned only
    /// to the joining connection.
    pub snapshot: Vec<Identity>,
}

/// Registry of all rooms and presence entries.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room ID → room.
    rooms: DashMap<RoomId, Room>,
    /// Connection ID → room it is bound to (reverse index).
    bindings: DashMap<ConnectionId, RoomId>,
}

impl RoomRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            bindings: DashMap::new(),
        }
    }

    /// Joins a connection to a room.
    ///
    /// The caller must have passed the membership check already. If the
    /// connection is currently bound to a room (including the same one),
    /// it is detached first and the outcome carries that departure — the
    /// caller must broadcast it before the join event.
    pub fn join(&self, conn_id: ConnectionId, room_id: RoomId, identity: Identity) -> JoinOutcome {
        let left = self.detach(conn_id);

        self.bindings.insert(conn_id, room_id);

        let entry = PresenceEntry::new(conn_id, identity.clone(), room_id);
        let mut room = self
            .rooms
            .entry(room_id)
            .or_insert_with(|| Room::new(room_id));
        room.add(entry);

        let recipients = room.member_connections_except(conn_id);
        let snapshot = room.member_identities();
        drop(room);

        debug!(
            conn_id = %conn_id,
            room_id = %room_id,
            members = snapshot.len(),
            "Connection joined room"
        );

        JoinOutcome {
            left,
            room_id,
            identity,
            recipients,
            snapshot,
        }
    }

    /// Removes a connection from whatever room it is in.
    ///
    /// Returns `None` for connections that never joined a room — those
    /// produce no broadcast.
    pub fn leave(&self, conn_id: ConnectionId) -> Option<Departure> {
        self.detach(conn_id)
    }

    /// Returns the room a connection is bound to.
    pub fn room_of(&self, conn_id: ConnectionId) -> Option<RoomId> {
        self.bindings.get(&conn_id).map(|entry| *entry.value())
    }

    /// Returns the other members of the caller's room, for activity relay.
    pub fn recipients(&self, conn_id: ConnectionId) -> Option<(RoomId, Vec<ConnectionId>)> {
        let room_id = self.room_of(conn_id)?;
        let room = self.rooms.get(&room_id)?;
        Some((room_id, room.member_connections_except(conn_id)))
    }

    /// Returns all member connections of a room (for broadcasts that
    /// include the actor, such as comment events).
    pub fn room_connections(&self, room_id: RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(&room_id)
            .map(|room| room.member_connections())
            .unwrap_or_default()
    }

    /// Returns the member identities of a room in join order.
    pub fn room_members(&self, room_id: RoomId) -> Vec<Identity> {
        self.rooms
            .get(&room_id)
            .map(|room| room.member_identities())
            .unwrap_or_default()
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Detaches a connection from its room, dropping the room when empty.
    fn detach(&self, conn_id: ConnectionId) -> Option<Departure> {
        let (_, room_id) = self.bindings.remove(&conn_id)?;

        let mut departure = None;
        if let Some(mut room) = self.rooms.get_mut(&room_id) {
            if let Some(entry) = room.remove(conn_id) {
                departure = Some(Departure {
                    room_id,
                    identity: entry.identity,
                    recipients: room.member_connections(),
                });
            }
            if room.is_empty() {
                drop(room);
                self.rooms.remove(&room_id);
            }
        }

        departure
    }
}
