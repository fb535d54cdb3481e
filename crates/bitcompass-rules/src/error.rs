//! Rules client error types.

use thiserror::Error;

/// Errors that can occur when reading or writing the `rules` table.
#[derive(Debug, Error)]
pub enum RulesError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the access token (expired or revoked).
    #[error("session rejected by the backend: run `bitcompass login` again")]
    Unauthorized,

    /// The backend returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The payload was rejected before sending.
    #[error(transparent)]
    Validation(#[from] bitcompass_core::CoreError),

    /// The backend returned a 429 Too Many Requests response.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },
}
