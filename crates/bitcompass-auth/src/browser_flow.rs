use crate::credentials::StoredCredentials;
use crate::error::AuthError;

const HTML_OK: &str =
    "<html><body><h1>Logged in to bitcompass</h1><p>You can close this tab.</p></body></html>";
const HTML_WAITING: &str =
    "<html><body><h1>Waiting for authentication…</h1><p>Redirecting, please wait.</p></body></html>";
const HTML_STATE_MISMATCH: &str =
    "<html><body><h1>Login failed</h1><p>State mismatch. Check the CLI output.</p></body></html>";

/// Result of inspecting one callback query string.
#[derive(Debug, PartialEq, Eq)]
enum Callback {
    /// Tokens present and the state nonce matched.
    Session(StoredCredentials),
    /// Tokens present but the state nonce is missing or wrong.
    StateMismatch,
    /// No tokens yet (intermediate redirect); keep waiting.
    Pending,
}

/// Execute the browser-based login flow.
///
/// 1. Start `tiny_http` on `127.0.0.1:0` (random port)
/// 2. Open the browser at `{api_url}/auth/cli` with a loopback `redirect_uri`
/// 3. Wait for the callback carrying the session (in `spawn_blocking`, since
///    `tiny_http::recv` blocks)
///
/// The caller persists the returned session.
///
/// # Errors
///
/// Returns `AuthError::BrowserFlowFailed` if the server cannot bind, the
/// state nonce does not match, or the callback times out.
pub async fn login(api_url: &str, timeout: std::time::Duration) -> Result<StoredCredentials, AuthError> {
    let server = tiny_http::Server::http("127.0.0.1:0")
        .map_err(|e| AuthError::BrowserFlowFailed(format!("failed to bind: {e}")))?;
    let port = server
        .server_addr()
        .to_ip()
        .map(|a| a.port())
        .ok_or_else(|| AuthError::BrowserFlowFailed("no port".into()))?;

    let state = new_state_nonce()?;
    let sign_in_url = sign_in_url(api_url, port, &state);

    eprintln!("Opening browser to: {sign_in_url}");
    if let Err(error) = open::that(&sign_in_url) {
        eprintln!("Failed to open browser: {error}");
        eprintln!("Open the URL above manually, then return here.");
    }

    tokio::task::spawn_blocking(move || wait_for_callback(&server, timeout, &state))
        .await
        .map_err(|e| AuthError::BrowserFlowFailed(format!("spawn_blocking join: {e}")))?
}

/// Random 16-byte hex nonce for CSRF protection.
fn new_state_nonce() -> Result<String, AuthError> {
    let mut nonce_bytes = [0u8; 16];
    getrandom::fill(&mut nonce_bytes)
        .map_err(|e| AuthError::BrowserFlowFailed(format!("failed to generate CSRF nonce: {e}")))?;
    Ok(nonce_bytes.iter().map(|b| format!("{b:02x}")).collect())
}

fn sign_in_url(api_url: &str, port: u16, state: &str) -> String {
    let redirect_uri = format!("http://127.0.0.1:{port}/callback");
    format!(
        "{}/auth/cli?redirect_uri={}&state={}",
        api_url.trim_end_matches('/'),
        urlencoding::encode(&redirect_uri),
        urlencoding::encode(state)
    )
}

/// Block until the callback server receives a request carrying a session.
///
/// Requests outside `/callback?` (favicon, preflight) get a 204 and are
/// ignored, as are callbacks that do not carry tokens yet.
fn wait_for_callback(
    server: &tiny_http::Server,
    timeout: std::time::Duration,
    expected_state: &str,
) -> Result<StoredCredentials, AuthError> {
    let deadline = std::time::Instant::now() + timeout;
    let timed_out = || {
        AuthError::BrowserFlowFailed(format!(
            "browser callback timed out after {}s",
            timeout.as_secs()
        ))
    };

    loop {
        let remaining = deadline.saturating_duration_since(std::time::Instant::now());
        if remaining.is_zero() {
            return Err(timed_out());
        }

        let request = match server.recv_timeout(remaining) {
            Ok(Some(req)) => req,
            Ok(None) => return Err(timed_out()),
            Err(e) => return Err(AuthError::BrowserFlowFailed(format!("recv error: {e}"))),
        };

        let url = request.url().to_string();
        let Some(query) = url.strip_prefix("/callback?") else {
            let _ = request.respond(tiny_http::Response::from_string("").with_status_code(204));
            continue;
        };

        match parse_callback(query, expected_state)? {
            Callback::Session(creds) => {
                let _ = request.respond(html_response(HTML_OK));
                return Ok(creds);
            }
            Callback::StateMismatch => {
                let _ = request.respond(html_response(HTML_STATE_MISMATCH));
                return Err(AuthError::BrowserFlowFailed(
                    "state mismatch, possible CSRF".into(),
                ));
            }
            Callback::Pending => {
                let _ = request.respond(html_response(HTML_WAITING));
            }
        }
    }
}

fn html_response(body: &str) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let response = tiny_http::Response::from_string(body);
    match tiny_http::Header::from_bytes("Content-Type", "text/html; charset=utf-8") {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

/// Extract the session from a callback query string.
///
/// `expires_at` falls back to the access token's `exp` claim.
fn parse_callback(query: &str, expected_state: &str) -> Result<Callback, AuthError> {
    let mut access_token = None;
    let mut refresh_token = String::new();
    let mut expires_at = None;
    let mut email = None;
    let mut state = None;

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = urlencoding::decode(value)
            .map_err(|e| AuthError::BrowserFlowFailed(format!("URL decode: {e}")))?
            .into_owned();
        match key {
            "access_token" => access_token = Some(value),
            "refresh_token" => refresh_token = value,
            "expires_at" => expires_at = value.parse::<i64>().ok(),
            "email" => email = Some(value).filter(|e| !e.is_empty()),
            "state" => state = Some(value),
            _ => {}
        }
    }

    let Some(access_token) = access_token.filter(|t| !t.is_empty()) else {
        return Ok(Callback::Pending);
    };
    if state.as_deref() != Some(expected_state) {
        return Ok(Callback::StateMismatch);
    }

    let expires_at = expires_at.or_else(|| crate::refresh::decode_expiry(&access_token).ok());
    Ok(Callback::Session(
        StoredCredentials::new(access_token, refresh_token)
            .with_expires_at(expires_at)
            .with_email(email),
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sign_in_url_encodes_redirect() {
        let url = sign_in_url("https://app.example.com/", 4321, "abc");
        assert_eq!(
            url,
            "https://app.example.com/auth/cli?redirect_uri=http%3A%2F%2F127.0.0.1%3A4321%2Fcallback&state=abc"
        );
    }

    #[test]
    fn state_nonce_is_32_hex_chars() {
        let nonce = new_state_nonce().expect("nonce");
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(nonce, new_state_nonce().expect("nonce"));
    }

    #[test]
    fn parse_callback_builds_session() {
        let query = "access_token=tok&refresh_token=ref&expires_at=1900000000&email=a%40b.com&state=s1";
        let expected = StoredCredentials::new("tok", "ref")
            .with_expires_at(Some(1_900_000_000))
            .with_email(Some("a@b.com".into()));
        assert_eq!(parse_callback(query, "s1").expect("parse"), Callback::Session(expected));
    }

    #[test]
    fn parse_callback_without_tokens_keeps_waiting() {
        assert_eq!(parse_callback("code=xyz&state=s1", "s1").expect("parse"), Callback::Pending);
        assert_eq!(parse_callback("access_token=&state=s1", "s1").expect("parse"), Callback::Pending);
    }

    #[test]
    fn parse_callback_rejects_wrong_or_missing_state() {
        assert_eq!(
            parse_callback("access_token=tok&state=other", "s1").expect("parse"),
            Callback::StateMismatch
        );
        assert_eq!(
            parse_callback("access_token=tok", "s1").expect("parse"),
            Callback::StateMismatch
        );
    }

    #[test]
    fn parse_callback_without_expiry_or_jwt_leaves_it_unset() {
        let Callback::Session(creds) = parse_callback("access_token=opaque&state=s1", "s1").expect("parse")
        else {
            panic!("expected a session");
        };
        assert_eq!(creds.expires_at, None);
        assert_eq!(creds.refresh_token, "");
        assert!(creds.email().is_none());
    }
}
