//! Display identity carried in credentials and presence broadcasts.

use serde::{Deserialize, Serialize};

use margins_core::types::id::PrincipalId;

/// The public identity of an authenticated principal.
///
/// This is the projection of a group member that other room members are
/// allowed to see; it is embedded in credentials at issue time and
/// broadcast in presence events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The principal this identity belongs to.
    pub principal_id: PrincipalId,
    /// Human-readable display name.
    pub display_name: String,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(principal_id: PrincipalId, display_name: impl Into<String>) -> Self {
        Self {
            principal_id,
            display_name: display_name.into(),
        }
    }
}
