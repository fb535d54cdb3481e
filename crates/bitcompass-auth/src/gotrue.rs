//! Client for the hosted backend's auth API (`/auth/v1`).
//!
//! Only the three calls the CLI needs: password sign-in, refresh-token
//! exchange, and the current-user lookup used to fill in a missing email.

use serde::Deserialize;

use crate::credentials::{CredentialUser, StoredCredentials};
use crate::error::AuthError;

/// Auth API client bound to one backend project.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<UserResponse>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    email: Option<String>,
}

impl TokenResponse {
    fn into_credentials(self, now: i64) -> StoredCredentials {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.and_then(|secs| now.checked_add(secs)));
        StoredCredentials::new(self.access_token, self.refresh_token)
            .with_expires_at(expires_at)
            .with_email(self.user.and_then(|u| u.email))
    }
}

impl AuthClient {
    /// Build a client when the backend URL and anon key are configured.
    #[must_use]
    pub fn from_config(config: &bitcompass_config::BitcompassConfig) -> Option<Self> {
        if !config.is_backend_configured() {
            return None;
        }
        Some(Self::new(
            config.supabase_base_url(),
            config.supabase_anon_key.trim(),
        ))
    }

    #[must_use]
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    /// Exchange email + password for a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` on rejected credentials, `AuthError::Http` on
    /// transport failure.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<StoredCredentials, AuthError> {
        let resp = self
            .http
            .post(self.endpoint("token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = check_response(resp).await?.json().await?;
        let mut creds = token.into_credentials(chrono::Utc::now().timestamp());
        if creds.email().is_none() {
            creds = creds.with_email(Some(email.to_string()));
        }
        Ok(creds)
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the refresh token was revoked or expired,
    /// `AuthError::Http` on transport failure.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<StoredCredentials, AuthError> {
        let resp = self
            .http
            .post(self.endpoint("token?grant_type=refresh_token"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let token: TokenResponse = check_response(resp).await?.json().await?;
        Ok(token.into_credentials(chrono::Utc::now().timestamp()))
    }

    /// Fetch the profile behind an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the token is rejected, `AuthError::Http`
    /// on transport failure.
    pub async fn get_user(&self, access_token: &str) -> Result<CredentialUser, AuthError> {
        let resp = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let user: UserResponse = check_response(resp).await?.json().await?;
        Ok(CredentialUser { email: user.email })
    }
}

/// Map non-success auth responses to [`AuthError::Api`].
///
/// The auth API reports errors as `error_description`, `msg` or `message`
/// depending on the endpoint; the first one present wins.
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AuthError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| value[*key].as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
