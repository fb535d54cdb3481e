use bitcompass_auth::{AuthError, CredentialStore};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::{TextView, output};
use crate::ui::{Tone, paint};

const EMAIL_UNAVAILABLE: &str =
    "Logged in, but the account email is unavailable. Run `bitcompass login` to refresh the session.";

#[derive(Debug, Serialize)]
struct WhoamiResponse {
    logged_in: bool,
    email: Option<String>,
    expires_at: Option<String>,
    note: Option<String>,
}

impl TextView for WhoamiResponse {
    fn text(&self) -> String {
        match (&self.email, &self.note) {
            (Some(email), _) => email.clone(),
            (None, Some(note)) => format!("{} {note}", paint(Tone::Yellow, "warning:")),
            (None, None) => String::new(),
        }
    }
}

/// Handle `bitcompass whoami`.
///
/// Fails with `NotAuthenticated` when no session is stored. Expiry is not
/// checked and the backend is not contacted.
pub fn handle(store: &dyn CredentialStore, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&run(store)?, flags.format)
}

fn run(store: &dyn CredentialStore) -> Result<WhoamiResponse, AuthError> {
    let creds = bitcompass_auth::require_session(store)?;
    let email = creds.email().map(str::to_string);
    let note = email.is_none().then(|| EMAIL_UNAVAILABLE.to_string());
    Ok(WhoamiResponse {
        logged_in: true,
        email,
        expires_at: creds.expires_at_utc().map(|at| at.to_rfc3339()),
        note,
    })
}

#[cfg(test)]
mod tests {
    use bitcompass_auth::{MemoryCredentialStore, StoredCredentials};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn logged_out_is_not_authenticated() {
        let err = run(&MemoryCredentialStore::new()).unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
        assert!(err.to_string().contains("bitcompass login"));
    }

    #[test]
    fn empty_access_token_is_not_authenticated() {
        let store = MemoryCredentialStore::with_credentials(StoredCredentials::new("", "r"));
        assert!(matches!(run(&store), Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn prints_stored_email() {
        let store = MemoryCredentialStore::with_credentials(
            StoredCredentials::new("t", "r").with_email(Some("a@b.com".into())),
        );
        let response = run(&store).expect("logged in");
        assert_eq!(response.email.as_deref(), Some("a@b.com"));
        assert_eq!(response.note, None);
        assert_eq!(response.text(), "a@b.com");
    }

    #[test]
    fn missing_email_suggests_refresh() {
        let store = MemoryCredentialStore::with_credentials(StoredCredentials::new("t", "r"));
        let response = run(&store).expect("logged in");
        assert!(response.logged_in);
        assert_eq!(response.email, None);
        let text = response.text();
        assert!(text.contains("email is unavailable"));
        assert!(text.contains("bitcompass login"));
    }

    #[test]
    fn expired_session_still_reports_identity() {
        let store = MemoryCredentialStore::with_credentials(
            StoredCredentials::new("t", "r")
                .with_expires_at(Some(1))
                .with_email(Some("a@b.com".into())),
        );
        let response = run(&store).expect("presence is enough");
        assert_eq!(response.expires_at.as_deref(), Some("1970-01-01T00:00:01+00:00"));
    }
}
