//! Collaborator interfaces consumed by the gateway.
//!
//! Group membership and comment persistence belong to the surrounding
//! application; the gateway only depends on these seams.

use async_trait::async_trait;

use margins_core::result::AppResult;
use margins_core::types::id::{CommentId, PrincipalId, RoomId};
use margins_entity::{Comment, NewComment};

/// Answers whether a principal belongs to the group owning a room.
#[async_trait]
pub trait MembershipChecker: Send + Sync + 'static {
    /// Returns `true` if the principal may join the room.
    async fn is_member(&self, principal_id: PrincipalId, room_id: RoomId) -> AppResult<bool>;
}

/// Comment persistence operations.
#[async_trait]
pub trait CommentStore: Send + Sync + 'static {
    /// Persists a new comment and returns it with server-assigned fields.
    async fn create(&self, data: NewComment) -> AppResult<Comment>;

    /// Updates a comment's content.
    ///
    /// Fails with `Conflict` when `by` is not the original author and
    /// `NotFound` for unknown ids.
    async fn update(&self, id: CommentId, content: &str, by: PrincipalId) -> AppResult<Comment>;

    /// Lists all comments in a room.
    async fn list_by_room(&self, room_id: RoomId) -> AppResult<Vec<Comment>>;
}
