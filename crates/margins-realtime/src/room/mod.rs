//! Room-based presence tracking.

pub mod registry;
pub mod room;

pub use registry::{Departure, JoinOutcome, RoomRegistry};
pub use room::Room;
