use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not logged in: run `bitcompass login` first")]
    NotAuthenticated,

    #[error("{0} is not configured")]
    NotConfigured(String),

    #[error("browser login failed: {0}")]
    BrowserFlowFailed(String),

    #[error("auth API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("credential store error: {0}")]
    TokenStore(String),

    #[error("{0}")]
    Other(String),
}
