//! Shared HTTP response helpers for the rules client.
//!
//! Centralizes status-code checks (401 session rejection, 429 rate limiting
//! with `Retry-After` parsing, non-success → [`RulesError::Api`]) so request
//! code stays focused on query construction and response mapping.

use crate::error::RulesError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **401 Unauthorized** → [`RulesError::Unauthorized`]
/// - **429 Too Many Requests** → [`RulesError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`RulesError::Api`] with status code and the
///   backend's `message` field (or the raw body).
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, RulesError> {
    if resp.status() == 401 {
        return Err(RulesError::Unauthorized);
    }
    if resp.status() == 429 {
        let retry_after = parse_retry_after(&resp);
        return Err(RulesError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(RulesError::Api {
            status,
            message: api_message(&body),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

/// REST errors arrive as `{"code": ..., "message": ..., "details": ...}`.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
