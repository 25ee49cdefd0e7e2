//! In-memory comment store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use margins_core::error::AppError;
use margins_core::result::AppResult;
use margins_core::types::id::{CommentId, PrincipalId, RoomId};
use margins_entity::{Comment, NewComment};
use margins_realtime::collaborators::CommentStore;

/// In-memory comment store keyed by comment ID.
#[derive(Debug, Default)]
pub struct MemoryCommentStore {
    /// Comment ID → comment.
    comments: DashMap<CommentId, Comment>,
}

impl MemoryCommentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            comments: DashMap::new(),
        }
    }

    /// Returns the number of stored comments.
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn create(&self, data: NewComment) -> AppResult<Comment> {
        let now = Utc::now();
        let comment = Comment {
            id: CommentId::new(),
            room_id: data.room_id,
            author: data.author,
            content: data.content,
            anchor: data.anchor,
            parent_id: data.parent_id,
            created_at: now,
            updated_at: now,
        };
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, id: CommentId, content: &str, by: PrincipalId) -> AppResult<Comment> {
        let mut entry = self
            .comments
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Comment not found"))?;

        if entry.author.principal_id != by {
            return Err(AppError::conflict("Only the author may edit a comment"));
        }

        entry.content = content.to_string();
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }

    async fn list_by_room(&self, room_id: RoomId) -> AppResult<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.value().room_id == room_id)
            .map(|entry| entry.value().clone())
            .collect();

        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}
