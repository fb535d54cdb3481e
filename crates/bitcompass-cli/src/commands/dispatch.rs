use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Login(args) => commands::auth::login::handle(&args, ctx, flags).await,
        Commands::Logout => commands::auth::logout::handle(ctx.store.as_ref(), flags),
        Commands::Whoami => commands::auth::whoami::handle(ctx.store.as_ref(), flags),
        Commands::Mcp { action } => commands::mcp::handle(&action, ctx, flags).await,
        Commands::Rules { action } => commands::rules::handle(&action, ctx, flags).await,
    }
}
