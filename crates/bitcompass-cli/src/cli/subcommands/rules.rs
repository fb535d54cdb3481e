use bitcompass_core::RuleKind;
use clap::Subcommand;

/// Rule and solution commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RulesCommands {
    /// List the newest entries.
    List {
        /// Only "rule" or "solution" entries.
        #[arg(long)]
        kind: Option<RuleKind>,
    },
    /// Search title, description and body.
    Search {
        query: String,
        /// Only "rule" or "solution" entries.
        #[arg(long)]
        kind: Option<RuleKind>,
    },
    /// Get an entry by ID.
    Get { id: String },
    /// Delete one of your entries by ID.
    Delete { id: String },
}
