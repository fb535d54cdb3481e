//! # bitcompass-auth
//!
//! Session handling for the bitcompass CLI.
//!
//! Provides the cached session record ([`StoredCredentials`]), the
//! [`CredentialStore`] persistence seam (JSON file at `~/.bitcompass/token.json`
//! in production, in-memory for tests), browser login (`tiny_http` + `open`),
//! password login and refresh against the backend auth API, and
//! [`refresh::ensure_fresh`] for callers about to hit the backend.

pub mod browser_flow;
pub mod credentials;
pub mod error;
pub mod gotrue;
pub mod refresh;
pub mod token_store;

pub use credentials::{CredentialUser, StoredCredentials};
pub use error::AuthError;
pub use gotrue::AuthClient;
pub use token_store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};

/// Require a stored session, without checking its freshness.
///
/// # Errors
///
/// Returns `AuthError::NotAuthenticated` if no record with a non-empty access
/// token is stored.
pub fn require_session(store: &dyn CredentialStore) -> Result<StoredCredentials, AuthError> {
    store
        .load()
        .filter(StoredCredentials::has_access_token)
        .ok_or(AuthError::NotAuthenticated)
}

/// Clear stored credentials.
///
/// # Errors
///
/// Returns `AuthError::TokenStore` if an existing record cannot be removed.
pub fn logout(store: &dyn CredentialStore) -> Result<(), AuthError> {
    store.clear()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_session_follows_is_logged_in() {
        let store = MemoryCredentialStore::new();
        assert!(matches!(require_session(&store), Err(AuthError::NotAuthenticated)));

        store.save(&StoredCredentials::new("t", "r")).expect("save");
        assert_eq!(require_session(&store).expect("session").access_token, "t");
        assert!(store.is_logged_in());

        logout(&store).expect("logout");
        assert!(!store.is_logged_in());
    }
}
