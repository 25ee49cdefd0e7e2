//! Connection lifecycle: handles, pooling, and handshake authentication.

pub mod authenticator;
pub mod handle;
pub mod pool;

pub use authenticator::{AuthenticatedConnection, GatewayAuthenticator};
pub use handle::{ConnectionHandle, ConnectionId};
pub use pool::ConnectionPool;
