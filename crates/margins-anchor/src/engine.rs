//! Anchor creation and two-tier resolution.
//!
//! All offsets are **character** offsets into the document's flattened
//! text — the same indexing clients use for selections — never byte
//! offsets. Multi-byte text therefore goes through explicit char-to-byte
//! translation before slicing.

use margins_core::error::AppError;
use margins_entity::TextAnchor;

/// Context window captured around a selection, in characters per side.
pub const CONTEXT_WINDOW: usize = 32;

/// A re-resolved anchor position in the current document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The original offsets still hold the selected text.
    Exact {
        /// Start character offset (inclusive).
        start: usize,
        /// End character offset (exclusive).
        end: usize,
    },
    /// The offsets drifted; the selected text was found elsewhere by
    /// substring search (first occurrence).
    Approximate {
        /// Start character offset of the match.
        start: usize,
        /// End character offset of the match.
        end: usize,
    },
}

impl Resolution {
    /// The resolved `(start, end)` character span.
    pub fn span(&self) -> (usize, usize) {
        match *self {
            Self::Exact { start, end } | Self::Approximate { start, end } => (start, end),
        }
    }

    /// Whether the original offsets were still valid.
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact { .. })
    }
}

/// Captures an anchor for the selection `[start, end)` of `document`.
///
/// Rejects inverted or out-of-bounds ranges and selections that trim to
/// nothing. The captured context window is symmetric around the selection
/// and clamped to the document bounds.
pub fn create_anchor(document: &str, start: usize, end: usize) -> Result<TextAnchor, AppError> {
    if start >= end {
        return Err(AppError::validation("Selection range is empty or inverted"));
    }

    let char_count = document.chars().count();
    if end > char_count {
        return Err(AppError::validation(format!(
            "Selection end {end} exceeds document length {char_count}"
        )));
    }

    let selected_text =
        char_slice(document, start, end).ok_or_else(|| AppError::validation("Invalid selection range"))?;

    if selected_text.trim().is_empty() {
        return Err(AppError::validation("Selection must not be empty"));
    }

    let context_start = start.saturating_sub(CONTEXT_WINDOW);
    let context_end = (end + CONTEXT_WINDOW).min(char_count);
    let context = char_slice(document, context_start, context_end)
        .ok_or_else(|| AppError::validation("Invalid selection range"))?;

    Ok(TextAnchor {
        selected_text: selected_text.to_string(),
        start_offset: start,
        end_offset: end,
        context: context.to_string(),
    })
}

/// Re-resolves an anchor against the current document text.
///
/// Tier 1: does the original offset range still hold the selected text?
/// Tier 2: substring search for the first occurrence of the selected text
/// anywhere in the document. Returns `None` when the text is gone
/// entirely — callers should render such comments as positionless
/// discussion items, never drop them.
pub fn resolve(document: &str, anchor: &TextAnchor) -> Option<Resolution> {
    if anchor.selected_text.is_empty() {
        return None;
    }

    if let Some(slice) = char_slice(document, anchor.start_offset, anchor.end_offset) {
        if slice == anchor.selected_text {
            return Some(Resolution::Exact {
                start: anchor.start_offset,
                end: anchor.end_offset,
            });
        }
    }

    // Fallback: first occurrence wins, even when the phrase repeats.
    let byte_idx = document.find(&anchor.selected_text)?;
    let start = document[..byte_idx].chars().count();
    let end = start + anchor.selected_text.chars().count();

    Some(Resolution::Approximate { start, end })
}

/// Translates a character offset into a byte offset.
fn byte_offset(text: &str, char_offset: usize) -> Option<usize> {
    if char_offset == 0 {
        return Some(0);
    }
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == char_offset {
            return Some(idx);
        }
        count += 1;
    }
    // One-past-the-end is a valid slice boundary.
    if char_offset == count {
        Some(text.len())
    } else {
        None
    }
}

/// Slices `text` by character offsets, or `None` when out of bounds.
fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let byte_start = byte_offset(text, start)?;
    let byte_end = byte_offset(text, end)?;
    text.get(byte_start..byte_end)
}
