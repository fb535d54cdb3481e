use base64::Engine as _;

use crate::credentials::StoredCredentials;
use crate::error::AuthError;
use crate::gotrue::AuthClient;
use crate::token_store::CredentialStore;

/// Sessions expiring within this window are refreshed before use.
pub const EXPIRY_BUFFER_SECS: i64 = 60;

/// Load the stored session and refresh it if it is about to expire.
///
/// Presence is all `is_logged_in` checks; this is the point where freshness
/// matters, right before a real API call. A refreshed session is saved back
/// to `store`, keeping the cached email when the refresh response has none.
/// Without an auth client, or without a refresh token, the stored session is
/// returned as-is and the backend decides.
///
/// # Errors
///
/// Returns `AuthError::NotAuthenticated` when no session is stored, or the
/// refresh/save error when a needed refresh fails.
pub async fn ensure_fresh(
    store: &dyn CredentialStore,
    client: Option<&AuthClient>,
) -> Result<StoredCredentials, AuthError> {
    let creds = store
        .load()
        .filter(StoredCredentials::has_access_token)
        .ok_or(AuthError::NotAuthenticated)?;

    if !creds.is_near_expiry(EXPIRY_BUFFER_SECS) {
        return Ok(creds);
    }

    let Some(client) = client else {
        tracing::warn!("session is near expiry but the backend is not configured; using it anyway");
        return Ok(creds);
    };
    if creds.refresh_token.is_empty() {
        tracing::warn!("session is near expiry and has no refresh token; run `bitcompass login`");
        return Ok(creds);
    }

    tracing::debug!(expires_at = ?creds.expires_at_utc(), "refreshing session");
    let mut refreshed = client.refresh_session(&creds.refresh_token).await?;
    if refreshed.email().is_none() {
        refreshed.user.clone_from(&creds.user);
    }
    if refreshed.refresh_token.is_empty() {
        refreshed.refresh_token.clone_from(&creds.refresh_token);
    }
    store.save(&refreshed)?;
    Ok(refreshed)
}

/// Decode the JWT `exp` claim without verifying the signature.
///
/// Used to fill in `expires_at` when a login callback does not carry it.
///
/// # Errors
///
/// Returns `AuthError::Other` if the JWT format is invalid or the `exp` claim
/// is missing or cannot be parsed.
pub fn decode_expiry(jwt: &str) -> Result<i64, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::Other("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| AuthError::Other(format!("base64 decode failed: {e}")))?;
    let value: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|e| AuthError::Other(format!("JSON parse failed: {e}")))?;
    value["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::Other("missing exp claim".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_store::MemoryCredentialStore;

    fn make_jwt(payload: &str) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.{}",
            engine.encode(r#"{"alg":"HS256"}"#),
            engine.encode(payload),
            engine.encode("fake_sig")
        )
    }

    #[test]
    fn decode_expiry_valid_jwt() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let jwt = make_jwt(&format!(r#"{{"sub":"user_123","exp":{exp}}}"#));
        assert_eq!(decode_expiry(&jwt).expect("decodes"), exp);
    }

    #[test]
    fn decode_expiry_invalid_format() {
        let err = decode_expiry("not-a-jwt").unwrap_err();
        assert!(err.to_string().contains("invalid JWT format"));
    }

    #[test]
    fn decode_expiry_missing_exp_claim() {
        let err = decode_expiry(&make_jwt(r#"{"sub":"user_123"}"#)).unwrap_err();
        assert!(err.to_string().contains("missing exp claim"));
    }

    #[test]
    fn decode_expiry_bad_base64() {
        let err = decode_expiry("header.!!!invalid!!!.signature").unwrap_err();
        assert!(err.to_string().contains("base64 decode failed"));
    }

    #[tokio::test]
    async fn ensure_fresh_without_session_is_not_authenticated() {
        let store = MemoryCredentialStore::new();
        let err = ensure_fresh(&store, None).await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn ensure_fresh_rejects_empty_token() {
        let store = MemoryCredentialStore::with_credentials(StoredCredentials::new("", "r"));
        assert!(matches!(
            ensure_fresh(&store, None).await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn ensure_fresh_returns_valid_session_untouched() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let creds = StoredCredentials::new("t", "r").with_expires_at(Some(exp));
        let store = MemoryCredentialStore::with_credentials(creds.clone());
        // The client points nowhere: a refresh attempt would fail the test.
        let client = AuthClient::new("http://127.0.0.1:9", "anon");

        let fresh = ensure_fresh(&store, Some(&client)).await.expect("fresh");
        assert_eq!(fresh, creds);
    }

    /// One-shot auth backend on a loopback port. The join handle yields the
    /// request URL and body it received.
    fn mock_backend(
        status: u16,
        body: &'static str,
    ) -> (String, std::thread::JoinHandle<(String, String)>) {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("bind");
        let port = server.server_addr().to_ip().expect("ip addr").port();
        let handle = std::thread::spawn(move || {
            let mut request = server.recv().expect("request");
            let mut sent = String::new();
            std::io::Read::read_to_string(request.as_reader(), &mut sent).expect("request body");
            let url = request.url().to_string();
            request
                .respond(tiny_http::Response::from_string(body).with_status_code(status))
                .expect("respond");
            (url, sent)
        });
        (format!("http://127.0.0.1:{port}"), handle)
    }

    #[tokio::test]
    async fn ensure_fresh_refreshes_near_expiry() {
        let (base_url, backend) =
            mock_backend(200, r#"{"access_token":"new","expires_in":3600}"#);
        let client = AuthClient::new(&base_url, "anon");
        let store = MemoryCredentialStore::with_credentials(
            StoredCredentials::new("old", "r1")
                .with_expires_at(Some(chrono::Utc::now().timestamp() + 10))
                .with_email(Some("a@b.com".into())),
        );

        let fresh = ensure_fresh(&store, Some(&client)).await.expect("refreshed");
        assert_eq!(fresh.access_token, "new");
        assert_eq!(fresh.refresh_token, "r1");
        assert_eq!(fresh.email(), Some("a@b.com"));
        assert!(!fresh.is_near_expiry(EXPIRY_BUFFER_SECS));
        assert_eq!(store.load(), Some(fresh));

        let (url, sent) = backend.join().expect("backend thread");
        assert_eq!(url, "/auth/v1/token?grant_type=refresh_token");
        assert!(sent.contains(r#""refresh_token":"r1""#));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stored_session() {
        let (base_url, backend) = mock_backend(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#,
        );
        let client = AuthClient::new(&base_url, "anon");
        let creds = StoredCredentials::new("old", "r1").with_expires_at(Some(0));
        let store = MemoryCredentialStore::with_credentials(creds.clone());

        let err = ensure_fresh(&store, Some(&client)).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Api { status: 400, ref message } if message == "Invalid Refresh Token"
        ));
        assert_eq!(store.load(), Some(creds));
        backend.join().expect("backend thread");
    }

    #[tokio::test]
    async fn ensure_fresh_without_client_keeps_expired_session() {
        let creds = StoredCredentials::new("t", "r").with_expires_at(Some(0));
        let store = MemoryCredentialStore::with_credentials(creds.clone());

        let fresh = ensure_fresh(&store, None).await.expect("returned as-is");
        assert_eq!(fresh, creds);
    }
}
