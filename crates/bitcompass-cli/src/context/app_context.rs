use std::sync::Arc;

use anyhow::Context;
use bitcompass_auth::{AuthClient, CredentialStore, FileCredentialStore};
use bitcompass_config::BitcompassConfig;
use bitcompass_rules::RulesClient;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: BitcompassConfig,
    pub store: Arc<dyn CredentialStore>,
}

impl AppContext {
    /// Resolve the credential file from config and wrap it in a store.
    pub fn init(config: BitcompassConfig) -> anyhow::Result<Self> {
        let store = FileCredentialStore::from_config(&config)
            .context("failed to resolve the credential file location")?;
        tracing::debug!(path = %store.path().display(), "using credential file");
        Ok(Self::with_store(config, Arc::new(store)))
    }

    #[must_use]
    pub fn with_store(config: BitcompassConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self { config, store }
    }

    /// Auth API client, `None` when the backend is not configured.
    #[must_use]
    pub fn auth_client(&self) -> Option<AuthClient> {
        AuthClient::from_config(&self.config)
    }

    /// Rules client, or an error naming the settings to fill in.
    pub fn rules_client(&self) -> anyhow::Result<RulesClient> {
        RulesClient::from_config(&self.config).ok_or_else(|| {
            anyhow::anyhow!(
                "backend is not configured: set BITCOMPASS_SUPABASE_URL and BITCOMPASS_SUPABASE_ANON_KEY"
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use bitcompass_auth::MemoryCredentialStore;

    use super::*;

    #[test]
    fn rules_client_requires_backend_config() {
        let ctx = AppContext::with_store(
            BitcompassConfig::default(),
            Arc::new(MemoryCredentialStore::new()),
        );
        let err = ctx.rules_client().unwrap_err();
        assert!(err.to_string().contains("BITCOMPASS_SUPABASE_URL"));
        assert!(ctx.auth_client().is_none());
    }

    #[test]
    fn clients_available_when_configured() {
        let config = BitcompassConfig {
            supabase_url: "https://abc.supabase.co".into(),
            supabase_anon_key: "anon".into(),
            ..Default::default()
        };
        let ctx = AppContext::with_store(config, Arc::new(MemoryCredentialStore::new()));
        assert!(ctx.rules_client().is_ok());
        assert!(ctx.auth_client().is_some());
    }
}
