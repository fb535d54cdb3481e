use clap::{Args, Subcommand};

use crate::cli::subcommands::{McpCommands, RulesCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Log in via browser (or --email for password login).
    Login(LoginArgs),
    /// Clear stored credentials.
    Logout,
    /// Show the logged-in account.
    Whoami,
    /// MCP server for AI agents.
    Mcp {
        #[command(subcommand)]
        action: McpCommands,
    },
    /// Read rules and solutions.
    Rules {
        #[command(subcommand)]
        action: RulesCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct LoginArgs {
    /// Log in with email and password instead of the browser.
    /// The password is read from BITCOMPASS_PASSWORD, a prompt, or stdin.
    #[arg(long)]
    pub email: Option<String>,
}
