//! # margins-store
//!
//! `dashmap`-backed in-memory implementations of the Margins collaborator
//! interfaces: session repository, comment store, membership checker, and
//! document source.
//!
//! These are the deployment story for a single-process install and the
//! fixtures for integration tests. A database-backed implementation would
//! slot in behind the same traits.

pub mod comments;
pub mod documents;
pub mod membership;
pub mod sessions;

pub use comments::MemoryCommentStore;
pub use documents::MemoryDocumentSource;
pub use membership::MemoryMembership;
pub use sessions::MemorySessionRepository;
