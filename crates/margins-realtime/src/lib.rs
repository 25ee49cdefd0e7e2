//! # margins-realtime
//!
//! Real-time WebSocket gateway for Margins. Provides:
//!
//! - Connection management with handshake-time JWT authentication
//! - Room-based presence tracking with join/leave broadcasts
//! - Comment relay into the persistence collaborator and back out to rooms
//! - Ephemeral activity relay ("now viewing section X")
//! - Per-handler fault isolation (a failed operation never drops the
//!   connection)

pub mod collaborators;
pub mod connection;
pub mod gateway;
pub mod message;
pub mod room;
pub mod server;

pub use collaborators::{CommentStore, MembershipChecker};
pub use connection::authenticator::GatewayAuthenticator;
pub use connection::pool::ConnectionPool;
pub use gateway::Gateway;
pub use room::registry::RoomRegistry;
pub use server::RealtimeServer;
