//! Document text source interface and room-aware resolution.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use margins_core::result::AppResult;
use margins_core::types::id::RoomId;
use margins_entity::TextAnchor;

use super::engine::{self, Resolution};

/// Supplies the flattened plain-text content of a room's document.
///
/// The document renderer and store are external; the anchor engine only
/// ever sees plain text. One room maps to one document instance.
#[async_trait]
pub trait DocumentSource: Send + Sync + 'static {
    /// Returns the flattened text of the room's document.
    async fn flattened_text(&self, room_id: RoomId) -> AppResult<String>;
}

/// Resolves anchors against a room's current document text.
#[derive(Clone)]
pub struct AnchorResolver {
    /// Document text supplier.
    source: Arc<dyn DocumentSource>,
}

impl std::fmt::Debug for AnchorResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorResolver").finish()
    }
}

impl AnchorResolver {
    /// Creates a resolver over the given document source.
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self { source }
    }

    /// Creates an anchor for a selection in the room's current text.
    pub async fn create_in_room(
        &self,
        room_id: RoomId,
        start: usize,
        end: usize,
    ) -> AppResult<TextAnchor> {
        let text = self.source.flattened_text(room_id).await?;
        engine::create_anchor(&text, start, end)
    }

    /// Re-resolves an anchor against the room's current text.
    ///
    /// `Ok(None)` means the anchored text no longer exists; the comment
    /// should be shown as a positionless discussion item.
    pub async fn resolve_in_room(
        &self,
        room_id: RoomId,
        anchor: &TextAnchor,
    ) -> AppResult<Option<Resolution>> {
        let text = self.source.flattened_text(room_id).await?;
        let resolution = engine::resolve(&text, anchor);

        if resolution.is_none() {
            debug!(
                room_id = %room_id,
                selected = %anchor.selected_text,
                "Anchor no longer resolvable"
            );
        }

        Ok(resolution)
    }
}
