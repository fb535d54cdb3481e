use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{ColorMode, GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `bitcompass` binary.
#[derive(Debug, Parser)]
#[command(
    name = "bitcompass",
    version,
    about = "bitcompass - shared rules and solutions for you and your AI agents"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: text, json, raw
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorMode,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use bitcompass_core::RuleKind;
    use clap::{CommandFactory, Parser};

    use super::subcommands::{McpCommands, RulesCommands};
    use super::{Cli, ColorMode, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "bitcompass",
            "--format",
            "json",
            "--limit",
            "10",
            "--verbose",
            "whoami",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["bitcompass", "logout", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Logout));
    }

    #[test]
    fn defaults_are_text_and_auto_color() {
        let cli = Cli::try_parse_from(["bitcompass", "whoami"]).expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.format, OutputFormat::Text);
        assert_eq!(flags.color, ColorMode::Auto);
        assert_eq!(flags.limit, None);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["bitcompass", "--format", "xml", "whoami"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn login_accepts_optional_email() {
        let cli = Cli::try_parse_from(["bitcompass", "login", "--email", "a@b.com"])
            .expect("cli should parse");
        match cli.command {
            Commands::Login(args) => assert_eq!(args.email.as_deref(), Some("a@b.com")),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["bitcompass", "login"]).expect("cli should parse");
        assert!(matches!(cli.command, Commands::Login(ref args) if args.email.is_none()));
    }

    #[test]
    fn mcp_requires_an_action() {
        assert!(Cli::try_parse_from(["bitcompass", "mcp"]).is_err());

        let cli = Cli::try_parse_from(["bitcompass", "mcp", "start"]).expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Mcp {
                action: McpCommands::Start
            }
        ));
        let cli = Cli::try_parse_from(["bitcompass", "mcp", "status"]).expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Mcp {
                action: McpCommands::Status
            }
        ));
    }

    #[test]
    fn rules_search_parses_kind() {
        let cli = Cli::try_parse_from([
            "bitcompass",
            "rules",
            "search",
            "tokio runtime",
            "--kind",
            "solutions",
        ])
        .expect("cli should parse");
        match cli.command {
            Commands::Rules {
                action: RulesCommands::Search { query, kind },
            } => {
                assert_eq!(query, "tokio runtime");
                assert_eq!(kind, Some(RuleKind::Solution));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rules_delete_takes_an_id() {
        let cli = Cli::try_parse_from(["bitcompass", "rules", "delete", "r-1"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Rules {
                action: RulesCommands::Delete { ref id }
            } if id == "r-1"
        ));
        assert!(Cli::try_parse_from(["bitcompass", "rules", "delete"]).is_err());
    }

    #[test]
    fn rules_list_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["bitcompass", "rules", "list", "--kind", "snippet"]).is_err());
    }
}
