//! Durable reference to a span of document text.

use serde::{Deserialize, Serialize};

/// A durable reference to a contiguous run of characters within one
/// rendering of a document.
///
/// `start_offset`/`end_offset` are **character** offsets into the
/// document's flattened text at the time the anchor was created. The
/// creation-time invariant `selected_text == document[start..end]` may
/// become false after the document is edited; resolution then falls back
/// to a substring search for `selected_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnchor {
    /// The exact text that was selected.
    pub selected_text: String,
    /// Character offset of the selection start (inclusive).
    pub start_offset: usize,
    /// Character offset of the selection end (exclusive).
    pub end_offset: usize,
    /// Fixed-size window of surrounding characters captured at creation
    /// time. A fallback re-anchoring signal only, never authoritative.
    pub context: String,
}

impl TextAnchor {
    /// The `(start, end)` offset pair this anchor was created with.
    pub fn span(&self) -> (usize, usize) {
        (self.start_offset, self.end_offset)
    }

    /// Selection length in characters.
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// Whether the anchored span is empty. Anchors are validated non-empty
    /// at creation, so this only returns true for hand-built values.
    pub fn is_empty(&self) -> bool {
        self.end_offset <= self.start_offset
    }
}
