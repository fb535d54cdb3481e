//! Login flow configuration.

use serde::{Deserialize, Serialize};

/// Default wait for the browser callback, in seconds.
const fn default_callback_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// How long `bitcompass login` waits for the browser to call back.
    #[serde(default = "default_callback_timeout_secs")]
    pub callback_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            callback_timeout_secs: default_callback_timeout_secs(),
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub const fn callback_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.callback_timeout_secs)
    }
}
