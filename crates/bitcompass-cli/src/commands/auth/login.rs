use std::io::{BufRead, IsTerminal};

use anyhow::Context;
use bitcompass_auth::{AuthClient, StoredCredentials};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::LoginArgs;
use crate::context::AppContext;
use crate::output::{TextView, output};
use crate::progress::Progress;
use crate::ui::{Tone, paint};

const PASSWORD_ENV: &str = "BITCOMPASS_PASSWORD";

#[derive(Debug, Serialize)]
struct LoginResponse {
    logged_in: bool,
    email: Option<String>,
    expires_at: Option<String>,
}

impl TextView for LoginResponse {
    fn text(&self) -> String {
        let check = paint(Tone::Green, "✓");
        match &self.email {
            Some(email) => format!("{check} Logged in as {email}"),
            None => format!("{check} Logged in"),
        }
    }
}

/// Handle `bitcompass login`.
///
/// Browser flow by default, password flow with `--email`. The session is
/// saved only after the backend accepted it.
pub async fn handle(args: &LoginArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let auth = ctx.auth_client();

    let creds = match &args.email {
        Some(email) => {
            let auth = auth.as_ref().ok_or_else(|| {
                anyhow::anyhow!(
                    "password login requires BITCOMPASS_SUPABASE_URL and BITCOMPASS_SUPABASE_ANON_KEY"
                )
            })?;
            let password = read_password(email)?;
            let progress = Progress::spinner("Signing in...");
            let result = auth.sign_in_with_password(email.trim(), &password).await;
            finish(&progress, result.is_ok());
            result?
        }
        None => {
            let api_url = ctx.config.require_api_url()?;
            let progress = Progress::spinner("Waiting for browser login...");
            let result =
                bitcompass_auth::browser_flow::login(api_url, ctx.config.auth.callback_timeout())
                    .await;
            finish(&progress, result.is_ok());
            result?
        }
    };

    let creds = with_profile_email(creds, auth.as_ref()).await;
    ctx.store
        .save(&creds)
        .context("failed to save credentials")?;
    tracing::info!(email = ?creds.email(), "logged in");

    output(&response(&creds), flags.format)
}

fn finish(progress: &Progress, ok: bool) {
    if ok {
        progress.finish_clear();
    } else {
        progress.finish_err("Login failed");
    }
}

/// Fill in the email from the user endpoint when the session lacks one.
async fn with_profile_email(creds: StoredCredentials, auth: Option<&AuthClient>) -> StoredCredentials {
    if creds.email().is_some() {
        return creds;
    }
    let Some(auth) = auth else {
        return creds;
    };
    match auth.get_user(&creds.access_token).await {
        Ok(user) => creds.with_email(user.email),
        Err(error) => {
            tracing::debug!(%error, "could not fetch account email");
            creds
        }
    }
}

fn response(creds: &StoredCredentials) -> LoginResponse {
    LoginResponse {
        logged_in: true,
        email: creds.email().map(str::to_string),
        expires_at: creds.expires_at_utc().map(|at| at.to_rfc3339()),
    }
}

/// Password from the environment, an interactive prompt, or piped stdin.
fn read_password(email: &str) -> anyhow::Result<String> {
    if let Ok(value) = std::env::var(PASSWORD_ENV)
        && !value.is_empty()
    {
        return Ok(value);
    }
    if std::io::stdin().is_terminal() {
        return dialoguer::Password::new()
            .with_prompt(format!("Password for {email}"))
            .interact()
            .context("failed to read password");
    }
    read_password_line(std::io::stdin().lock())
}

fn read_password_line(mut reader: impl BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        anyhow::bail!("no password provided on stdin (or set {PASSWORD_ENV})");
    }
    Ok(password.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn password_line_strips_only_line_ending() {
        let password = read_password_line(Cursor::new(" s3cret \r\nnext")).expect("password");
        assert_eq!(password, " s3cret ");
    }

    #[test]
    fn empty_stdin_is_an_error() {
        let err = read_password_line(Cursor::new("")).unwrap_err();
        assert!(err.to_string().contains(PASSWORD_ENV));
    }

    #[test]
    fn response_reports_email_and_expiry() {
        let creds = StoredCredentials::new("t", "r")
            .with_expires_at(Some(1_700_000_000))
            .with_email(Some("a@b.com".into()));
        let resp = response(&creds);
        assert_eq!(resp.email.as_deref(), Some("a@b.com"));
        assert_eq!(resp.expires_at.as_deref(), Some("2023-11-14T22:13:20+00:00"));
        assert!(resp.text().ends_with("Logged in as a@b.com"));
    }

    #[tokio::test]
    async fn profile_lookup_skipped_without_client() {
        let creds = with_profile_email(StoredCredentials::new("t", "r"), None).await;
        assert_eq!(creds.email(), None);
    }
}
