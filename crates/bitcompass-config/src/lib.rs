//! # bitcompass-config
//!
//! Layered configuration loading for bitcompass using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`BITCOMPASS_*` prefix, `__` as separator)
//! 2. Project-level `.bitcompass/config.toml`
//! 3. User-level `~/.config/bitcompass/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `BITCOMPASS_SUPABASE_URL` -> `supabase_url` and
//! `BITCOMPASS_AUTH__CALLBACK_TIMEOUT_SECS` -> `auth.callback_timeout_secs`.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use bitcompass_config::BitcompassConfig;
//!
//! let config = BitcompassConfig::load_with_dotenv().expect("config");
//! if config.is_backend_configured() {
//!     println!("backend: {}", config.supabase_base_url());
//! }
//! ```

mod auth;
mod error;
mod general;

pub use auth::AuthConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix for every configuration key.
pub const ENV_PREFIX: &str = "BITCOMPASS_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BitcompassConfig {
    /// Base URL of the bitcompass web app (hosts the CLI sign-in page).
    #[serde(default)]
    pub api_url: String,

    /// Hosted backend project URL (e.g. `https://abc.supabase.co`).
    #[serde(default)]
    pub supabase_url: String,

    /// Public anon key sent as `apikey` on every backend request.
    #[serde(default)]
    pub supabase_anon_key: String,

    /// Override for the credential file location. Empty = `~/.bitcompass/token.json`.
    #[serde(default)]
    pub credentials_path: String,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub general: GeneralConfig,
}

impl BitcompassConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed into the schema.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed into the schema.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".bitcompass/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// True when both the backend URL and anon key are set.
    #[must_use]
    pub fn is_backend_configured(&self) -> bool {
        !self.supabase_url.trim().is_empty() && !self.supabase_anon_key.trim().is_empty()
    }

    /// Backend URL without a trailing slash.
    #[must_use]
    pub fn supabase_base_url(&self) -> &str {
        self.supabase_url.trim().trim_end_matches('/')
    }

    /// Web app URL for the browser sign-in flow.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] if unset, or
    /// [`ConfigError::InvalidValue`] if it is not an `http(s)://` URL.
    pub fn require_api_url(&self) -> Result<&str, ConfigError> {
        let url = self.api_url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(ConfigError::NotConfigured {
                field: "api_url".into(),
                env_var: format!("{ENV_PREFIX}API_URL"),
            });
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "api_url".into(),
                reason: format!("'{url}' must start with http:// or https://"),
            });
        }
        Ok(url)
    }

    /// Custom credential file path, if configured.
    #[must_use]
    pub fn credentials_path_override(&self) -> Option<PathBuf> {
        let path = self.credentials_path.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bitcompass").join("config.toml"))
    }

    /// Load `.env` from the crate/workspace root or the current directory.
    ///
    /// Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_unconfigured() {
        let config = BitcompassConfig::default();
        assert!(!config.is_backend_configured());
        assert!(config.credentials_path_override().is_none());
        assert_eq!(config.general.default_limit, 20);
        assert_eq!(config.auth.callback_timeout_secs, 120);
    }

    #[test]
    fn backend_requires_url_and_key() {
        let mut config = BitcompassConfig {
            supabase_url: "https://abc.supabase.co/".into(),
            ..Default::default()
        };
        assert!(!config.is_backend_configured());

        config.supabase_anon_key = "anon".into();
        assert!(config.is_backend_configured());
        assert_eq!(config.supabase_base_url(), "https://abc.supabase.co");
    }

    #[test]
    fn require_api_url_reports_missing_env_var() {
        let config = BitcompassConfig::default();
        let err = config.require_api_url().unwrap_err();
        assert!(err.to_string().contains("BITCOMPASS_API_URL"));
    }

    #[test]
    fn require_api_url_rejects_bare_host() {
        let config = BitcompassConfig {
            api_url: "bitcompass.example".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.require_api_url(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn require_api_url_strips_trailing_slash() {
        let config = BitcompassConfig {
            api_url: "https://app.example.com/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.require_api_url().expect("valid"),
            "https://app.example.com"
        );
    }
}
