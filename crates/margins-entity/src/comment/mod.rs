//! Comment entity and its text anchor.

pub mod anchor;
pub mod model;

pub use anchor::TextAnchor;
pub use model::{Comment, NewComment};
