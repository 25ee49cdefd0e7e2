//! # margins-annotation
//!
//! Clusters comments that share a text anchor into single visual markers:
//! one marker per `(start_offset, end_offset)` pair, carrying the
//! creation-ordered comment list and the distinct participant identities.
//!
//! Grouping is a pure function of the comment set and is recomputed
//! wholesale whenever any comment changes — markers are derived values,
//! never stored.

pub mod grouping;
pub mod marker;

pub use grouping::group_by_anchor;
pub use marker::{AnchorKey, Marker};
