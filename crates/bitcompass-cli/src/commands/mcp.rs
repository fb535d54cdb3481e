mod start;
mod status;

use std::sync::Arc;

use bitcompass_mcp::BitcompassServer;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::McpCommands;
use crate::context::AppContext;

/// Handle `bitcompass mcp`.
pub async fn handle(
    action: &McpCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        McpCommands::Start => {
            start::handle(ctx.store.as_ref(), || {
                BitcompassServer::from_config(&ctx.config, Arc::clone(&ctx.store)).serve_stdio()
            })
            .await
        }
        McpCommands::Status => status::handle(ctx.store.as_ref(), flags),
    }
}
