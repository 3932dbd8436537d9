use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `vestry` binary.
#[derive(Debug, Parser)]
#[command(
    name = "vestry",
    version,
    about = "Vestry - church module, agent and bundle subscriptions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Church to act for (overrides --user and config)
    #[arg(long, global = true)]
    pub church: Option<String>,

    /// User whose profile selects the church
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Local database path (overrides store.path)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            church: self.church.clone(),
            user: self.user.clone(),
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, GlobalFlags, OutputFormat};
    use crate::cli::subcommands::{BundleCommands, ModuleCommands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "vestry", "--format", "table", "--limit", "10", "--verbose", "status",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["vestry", "billing", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Billing));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["vestry", "--format", "xml", "status"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn tenant_flags_are_copied() {
        let cli = Cli::try_parse_from([
            "vestry",
            "module",
            "list",
            "--church",
            "chr-1",
            "--db",
            "/tmp/v.db",
        ])
        .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.church.as_deref(), Some("chr-1"));
        assert_eq!(flags.db.as_deref(), Some("/tmp/v.db"));
        assert!(flags.user.is_none());
        assert!(matches!(
            cli.command,
            Commands::Module {
                action: ModuleCommands::List
            }
        ));
    }

    #[test]
    fn subscribe_takes_many_names() {
        let cli = Cli::try_parse_from(["vestry", "bundle", "subscribe", "care", "growth"])
            .expect("cli should parse");
        let Commands::Bundle {
            action: BundleCommands::Subscribe { ids },
        } = cli.command
        else {
            panic!("expected bundle subscribe");
        };
        assert_eq!(ids, vec!["care", "growth"]);
    }

    #[test]
    fn subscribe_requires_at_least_one_name() {
        assert!(Cli::try_parse_from(["vestry", "module", "subscribe"]).is_err());
    }
}
