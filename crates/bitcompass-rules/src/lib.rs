//! # bitcompass-rules
//!
//! Client for the backend `rules` table (REST interface).
//!
//! Every request carries the project anon key and the user's access token, so
//! row-level security on the backend decides what each user can read and
//! write. The client is only constructible when the backend is configured:
//! [`RulesClient::from_config`] returns `None` otherwise and every consumer
//! has to handle that case.

mod error;
mod http;
mod query;

pub use error::RulesError;
pub use query::{MAX_LIMIT, RuleFilter};

use bitcompass_core::{NewRule, Rule};

use crate::http::check_response;

/// HTTP client for the `rules` table.
#[derive(Debug, Clone)]
pub struct RulesClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RulesClient {
    /// Build a client when both the backend URL and anon key are configured.
    #[must_use]
    pub fn from_config(config: &bitcompass_config::BitcompassConfig) -> Option<Self> {
        if !config.is_backend_configured() {
            tracing::debug!("backend not configured; rules client unavailable");
            return None;
        }
        Some(Self::new(
            config.supabase_base_url(),
            config.supabase_anon_key.trim(),
        ))
    }

    #[must_use]
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bitcompass/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_else(|error| {
                tracing::warn!(%error, "custom HTTP client failed to build; using defaults");
                reqwest::Client::new()
            });
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn table_url(&self, query: &str) -> String {
        format!("{}/rest/v1/rules?{query}", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder, access_token: &str) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    /// Newest rules first, optionally restricted to one kind.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if the request fails, the backend rejects the
    /// session, or the response cannot be parsed.
    pub async fn list(&self, access_token: &str, filter: RuleFilter) -> Result<Vec<Rule>, RulesError> {
        let url = self.table_url(&query::list_query(filter));
        tracing::debug!(%url, "listing rules");
        let resp = self.authed(self.http.get(&url), access_token).send().await?;
        Ok(check_response(resp).await?.json().await?)
    }

    /// Case-insensitive substring search over title, description and body.
    ///
    /// A blank term behaves like [`Self::list`].
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if the request fails, the backend rejects the
    /// session, or the response cannot be parsed.
    pub async fn search(
        &self,
        access_token: &str,
        term: &str,
        filter: RuleFilter,
    ) -> Result<Vec<Rule>, RulesError> {
        if term.trim().is_empty() {
            return self.list(access_token, filter).await;
        }
        let url = self.table_url(&query::search_query(term, filter));
        tracing::debug!(%url, "searching rules");
        let resp = self.authed(self.http.get(&url), access_token).send().await?;
        Ok(check_response(resp).await?.json().await?)
    }

    /// Fetch one rule by id. `None` if it does not exist or is not visible.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if the request fails, the backend rejects the
    /// session, or the response cannot be parsed.
    pub async fn get(&self, access_token: &str, id: &str) -> Result<Option<Rule>, RulesError> {
        let url = self.table_url(&query::id_query(id));
        let resp = self.authed(self.http.get(&url), access_token).send().await?;
        let rows: Vec<Rule> = check_response(resp).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a rule owned by the session's user and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Validation`] for blank title/body, otherwise any
    /// transport, session or backend error.
    pub async fn create(&self, access_token: &str, rule: &NewRule) -> Result<Rule, RulesError> {
        rule.validate()?;
        let url = format!("{}/rest/v1/rules", self.base_url);
        let resp = self
            .authed(self.http.post(&url), access_token)
            .header("Prefer", "return=representation")
            .json(rule)
            .send()
            .await?;
        let rows: Vec<Rule> = check_response(resp).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| RulesError::Api {
            status: 200,
            message: "insert returned no row (check row-level security policies)".into(),
        })
    }

    /// Delete a rule by id. Deleting an invisible or missing row is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if the request fails or the backend rejects it.
    pub async fn delete(&self, access_token: &str, id: &str) -> Result<(), RulesError> {
        let url = format!(
            "{}/rest/v1/rules?id=eq.{}",
            self.base_url,
            urlencoding::encode(id.trim())
        );
        let resp = self.authed(self.http.delete(&url), access_token).send().await?;
        check_response(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bitcompass_config::BitcompassConfig;
    use bitcompass_core::RuleKind;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn from_config_is_none_without_backend() {
        assert!(RulesClient::from_config(&BitcompassConfig::default()).is_none());

        let only_url = BitcompassConfig {
            supabase_url: "https://abc.supabase.co".into(),
            ..Default::default()
        };
        assert!(RulesClient::from_config(&only_url).is_none());

        let only_key = BitcompassConfig {
            supabase_anon_key: "anon".into(),
            ..Default::default()
        };
        assert!(RulesClient::from_config(&only_key).is_none());
    }

    #[test]
    fn from_config_builds_table_url() {
        let config = BitcompassConfig {
            supabase_url: "https://abc.supabase.co/".into(),
            supabase_anon_key: " anon ".into(),
            ..Default::default()
        };
        let client = RulesClient::from_config(&config).expect("configured");
        assert_eq!(client.anon_key, "anon");
        assert_eq!(
            client.table_url(&query::list_query(RuleFilter::new(Some(RuleKind::Rule), 3))),
            "https://abc.supabase.co/rest/v1/rules?select=*&order=created_at.desc&limit=3&kind=eq.rule"
        );
    }

    #[tokio::test]
    async fn create_validates_before_sending() {
        // Unroutable base URL: reaching the network would surface as Http, not Validation.
        let client = RulesClient::new("http://127.0.0.1:9", "anon");
        let payload = NewRule {
            kind: RuleKind::Rule,
            title: String::new(),
            description: String::new(),
            body: "body".into(),
            context: None,
            examples: None,
            technologies: None,
        };
        let err = client.create("token", &payload).await.unwrap_err();
        assert!(matches!(err, RulesError::Validation(_)));
    }
}
