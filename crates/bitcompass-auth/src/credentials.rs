use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subset of the backend user profile cached next to the tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A cached authentication session.
///
/// Created on login, overwritten on refresh or re-login, deleted on logout.
/// Only the credential store reads or writes the persisted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which `access_token` expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<CredentialUser>,
}

impl StoredCredentials {
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: None,
            user: None,
        }
    }

    #[must_use]
    pub fn with_expires_at(mut self, expires_at: Option<i64>) -> Self {
        self.expires_at = expires_at;
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.user = email.map(|email| CredentialUser { email: Some(email) });
        self
    }

    /// Whether the record carries a usable-looking access token.
    #[must_use]
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Stored email, if the record has a non-empty one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|user| user.email.as_deref())
            .filter(|email| !email.is_empty())
    }

    #[must_use]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// True if `expires_at` is known and falls within `buffer_secs` of now.
    ///
    /// Records without `expires_at` are never considered near expiry.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.expires_at_utc().is_some_and(|expires_at| {
            expires_at <= Utc::now() + chrono::TimeDelta::seconds(buffer_secs)
        })
    }
}
