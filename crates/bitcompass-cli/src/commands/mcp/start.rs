use std::future::Future;

use bitcompass_auth::{AuthError, CredentialStore};

/// Handle `bitcompass mcp start`.
///
/// The server takes over stdout, so nothing is printed here. `bootstrap` is
/// only invoked when a session is stored.
pub async fn handle<F, Fut>(store: &dyn CredentialStore, bootstrap: F) -> anyhow::Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    if !store.is_logged_in() {
        return Err(AuthError::NotAuthenticated.into());
    }
    bootstrap().await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use bitcompass_auth::{MemoryCredentialStore, StoredCredentials};

    use super::*;

    #[tokio::test]
    async fn logged_out_never_bootstraps() {
        let invoked = AtomicBool::new(false);
        let err = handle(&MemoryCredentialStore::new(), || async {
            invoked.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(!invoked.load(Ordering::SeqCst));
        assert!(matches!(
            err.downcast_ref::<AuthError>(),
            Some(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn logged_in_awaits_bootstrap() {
        let invoked = AtomicBool::new(false);
        let store = MemoryCredentialStore::with_credentials(StoredCredentials::new("t", "r"));
        handle(&store, || async {
            invoked.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
        .expect("bootstrap result");

        assert!(invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn bootstrap_errors_propagate() {
        let store = MemoryCredentialStore::with_credentials(StoredCredentials::new("t", "r"));
        let err = handle(&store, || async { Err(anyhow::anyhow!("transport closed")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "transport closed");
    }
}
