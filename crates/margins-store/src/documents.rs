//! In-memory document text source.

use async_trait::async_trait;
use dashmap::DashMap;

use margins_anchor::source::DocumentSource;
use margins_core::error::AppError;
use margins_core::result::AppResult;
use margins_core::types::id::RoomId;

/// In-memory flattened document text keyed by room.
#[derive(Debug, Default)]
pub struct MemoryDocumentSource {
    /// Room ID → flattened document text.
    documents: DashMap<RoomId, String>,
}

impl MemoryDocumentSource {
    /// Creates a new empty source.
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Stores (or replaces) the flattened text for a room's document.
    pub fn put(&self, room_id: RoomId, text: impl Into<String>) {
        self.documents.insert(room_id, text.into());
    }
}

#[async_trait]
impl DocumentSource for MemoryDocumentSource {
    async fn flattened_text(&self, room_id: RoomId) -> AppResult<String> {
        self.documents
            .get(&room_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("No document for room {room_id}")))
    }
}
