use clap::Subcommand;

/// MCP server commands.
#[derive(Clone, Debug, Subcommand)]
pub enum McpCommands {
    /// Serve MCP over stdio (requires login).
    Start,
    /// Report whether the MCP server can start.
    Status,
}
