//! Comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use margins_core::types::id::{CommentId, RoomId};

use crate::identity::Identity;

use super::anchor::TextAnchor;

/// A comment in a document room.
///
/// Comments carrying a [`TextAnchor`] attach to a span of the document
/// text and are grouped into markers; anchor-less comments belong to the
/// general discussion list. The author identity is denormalized onto the
/// comment so that marker participant lists can be derived from the
/// comment set alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment identifier.
    pub id: CommentId,
    /// The room (document instance) this comment belongs to.
    pub room_id: RoomId,
    /// The author's display identity.
    pub author: Identity,
    /// Comment body.
    pub content: String,
    /// Text span this comment is anchored to, if any.
    pub anchor: Option<TextAnchor>,
    /// Parent comment for threaded replies.
    pub parent_id: Option<CommentId>,
    /// When the comment was created.
    pub created_at: DateTime<Utc>,
    /// When the comment was last edited.
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Whether this comment attaches to a text span.
    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Data required to create a new comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    /// The room the comment is posted in.
    pub room_id: RoomId,
    /// The author's display identity.
    pub author: Identity,
    /// Comment body.
    pub content: String,
    /// Text span the comment is anchored to, if any.
    pub anchor: Option<TextAnchor>,
    /// Parent comment for threaded replies.
    pub parent_id: Option<CommentId>,
}
