//! Client and server event type definitions.
//!
//! The protocol is a closed, versioned set of tagged variants
//! discriminated by event name — never an open dictionary — so that
//! dispatch is exhaustiveness-checked at compile time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use margins_core::types::id::{CommentId, RoomId};
use margins_entity::{Comment, Identity, TextAnchor};

/// Events sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Join a document room (requires prior handshake auth).
    JoinRoom {
        /// Room to join.
        room_id: RoomId,
    },
    /// Leave the current room. No-op if not in a room.
    LeaveRoom {},
    /// Post a comment, optionally anchored to a text span.
    AddComment {
        /// Target room; defaults to the bound room.
        #[serde(default)]
        room_id: Option<RoomId>,
        /// Comment body.
        content: String,
        /// Text anchor; absent means a general discussion comment.
        #[serde(default)]
        text_anchor: Option<TextAnchor>,
        /// Parent comment for threaded replies.
        #[serde(default)]
        parent_id: Option<CommentId>,
    },
    /// Edit a comment. Only the original author may succeed.
    UpdateComment {
        /// Comment to edit.
        comment_id: CommentId,
        /// New body.
        content: String,
    },
    /// Best-effort, unordered activity notice.
    ActivityPing {
        /// Section currently being viewed.
        section: String,
        /// Free-form detail.
        #[serde(default)]
        detail: Option<String>,
    },
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Current room member list, sent only to the joining connection.
    ActiveUsers {
        /// Members in join order, including the recipient.
        users: Vec<Identity>,
    },
    /// A member joined the room (broadcast, excluding the actor).
    UserJoined {
        /// Who joined.
        user: Identity,
    },
    /// A member left the room (broadcast, excluding the actor).
    UserLeft {
        /// Who left.
        user: Identity,
    },
    /// A comment was posted (broadcast, including the actor).
    CommentAdded {
        /// The persisted comment.
        comment: Comment,
        /// The comment's author.
        author: Identity,
    },
    /// A comment was edited (broadcast, including the actor).
    CommentUpdated {
        /// The updated comment.
        comment: Comment,
        /// The comment's author.
        author: Identity,
    },
    /// Ephemeral activity notice (broadcast, excluding the actor).
    UserPresence {
        /// Who is active.
        identity: Identity,
        /// Section being viewed.
        section: String,
        /// Free-form detail.
        detail: Option<String>,
        /// When the activity was relayed.
        timestamp: DateTime<Utc>,
    },
    /// Scoped error, unicast to the originating connection.
    Error {
        /// Human-readable description.
        message: String,
    },
}

impl ServerEvent {
    /// Serializes the event for the wire.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
