//! Presence entry entity.

pub mod model;

pub use model::PresenceEntry;
