use bitcompass_auth::CredentialStore;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::{TextView, output};
use crate::ui::{Tone, paint};

const READY: &str = "Logged in. The MCP server can start (`bitcompass mcp start`).";
const NOT_READY: &str = "Not logged in. Run `bitcompass login` before starting the MCP server.";

#[derive(Debug, Serialize)]
struct McpStatusResponse {
    logged_in: bool,
    message: &'static str,
}

impl TextView for McpStatusResponse {
    fn text(&self) -> String {
        if self.logged_in {
            format!("{} {}", paint(Tone::Green, "✓"), self.message)
        } else {
            format!("{} {}", paint(Tone::Yellow, "!"), self.message)
        }
    }
}

/// Handle `bitcompass mcp status`. Both states exit successfully.
pub fn handle(store: &dyn CredentialStore, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&status(store), flags.format)
}

fn status(store: &dyn CredentialStore) -> McpStatusResponse {
    let logged_in = store.is_logged_in();
    McpStatusResponse {
        logged_in,
        message: if logged_in { READY } else { NOT_READY },
    }
}
