//! Integration tests for the Margins realtime core.
//!
//! The gateway is transport-independent, so these tests drive it directly
//! through its event entry point with in-memory collaborators — no
//! sockets involved.

mod helpers;

mod anchor_test;
mod annotation_flow_test;
mod auth_test;
