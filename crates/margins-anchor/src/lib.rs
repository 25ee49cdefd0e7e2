//! # margins-anchor
//!
//! Anchors a text selection to character offsets inside a flattened
//! document and re-resolves anchors after the document changes.
//!
//! Resolution is two-tier: an exact offset check first, then a substring
//! search for the originally selected text. This is best-effort
//! re-anchoring, not operational transforms — passage edits are
//! infrequent and comments are advisory, not structural.

pub mod engine;
pub mod source;

pub use engine::{CONTEXT_WINDOW, Resolution, create_anchor, resolve};
pub use source::{AnchorResolver, DocumentSource};
