//! Marker type — the visual grouping unit for co-anchored comments.

use serde::{Deserialize, Serialize};

use margins_entity::{Comment, Identity, TextAnchor};

/// Grouping key for a marker: the anchored offset pair.
///
/// The derived `Ord` (start, then end) is also the placement order for
/// markers whose anchors overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnchorKey {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
}

impl From<&TextAnchor> for AnchorKey {
    fn from(anchor: &TextAnchor) -> Self {
        Self {
            start: anchor.start_offset,
            end: anchor.end_offset,
        }
    }
}

/// All comments sharing one anchor, as a single visual unit.
///
/// Comments are held in creation order (id as tiebreak), which makes the
/// derived participant list stable regardless of how the input was
/// ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    /// The shared offset pair.
    pub key: AnchorKey,
    /// Representative anchor (taken from the earliest comment).
    pub anchor: TextAnchor,
    /// Comments in creation order.
    pub comments: Vec<Comment>,
}

impl Marker {
    /// Distinct participant identities in first-appearance order among
    /// the marker's comments. Used to render compact avatar stacks.
    pub fn participants(&self) -> Vec<Identity> {
        let mut seen = Vec::new();
        for comment in &self.comments {
            if !seen
                .iter()
                .any(|i: &Identity| i.principal_id == comment.author.principal_id)
            {
                seen.push(comment.author.clone());
            }
        }
        seen
    }

    /// The most recently created comment, used as a preview.
    pub fn latest_comment(&self) -> Option<&Comment> {
        self.comments.last()
    }

    /// Number of comments in the group.
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}
