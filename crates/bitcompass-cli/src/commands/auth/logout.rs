use bitcompass_auth::CredentialStore;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::{TextView, output};
use crate::ui::{Tone, paint};

#[derive(Debug, Serialize)]
struct LogoutResponse {
    logged_out: bool,
}

impl TextView for LogoutResponse {
    fn text(&self) -> String {
        format!("{} Logged out.", paint(Tone::Green, "✓"))
    }
}

/// Handle `bitcompass logout`. Clearing an absent session still succeeds.
pub fn handle(store: &dyn CredentialStore, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&run(store)?, flags.format)
}

fn run(store: &dyn CredentialStore) -> anyhow::Result<LogoutResponse> {
    bitcompass_auth::logout(store)?;
    Ok(LogoutResponse { logged_out: true })
}

#[cfg(test)]
mod tests {
    use bitcompass_auth::{MemoryCredentialStore, StoredCredentials};

    use super::*;

    #[test]
    fn logout_clears_session() {
        let store = MemoryCredentialStore::with_credentials(StoredCredentials::new("t", "r"));
        assert!(store.is_logged_in());

        assert!(run(&store).expect("logout").logged_out);
        assert!(!store.is_logged_in());
    }

    #[test]
    fn logout_when_logged_out_succeeds() {
        let store = MemoryCredentialStore::new();
        assert!(run(&store).expect("logout").logged_out);
        assert!(run(&store).expect("second logout").logged_out);
    }
}
