//! Session lifetime configuration.

use serde::{Deserialize, Serialize};

/// Persisted session configuration.
///
/// Sessions are the unit of revocation: refresh tokens are only honored
/// while their session row exists and has not passed `lifetime_days`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute session lifetime in days.
    #[serde(default = "default_lifetime")]
    pub lifetime_days: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_days: default_lifetime(),
        }
    }
}

fn default_lifetime() -> u64 {
    14
}
