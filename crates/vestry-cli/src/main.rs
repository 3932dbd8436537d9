use anyhow::Context;
use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("vestry error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    let config = bootstrap::load_config()?;
    context::warn_unconfigured(&config);

    let command = cli.command;
    let mut ctx = context::AppContext::init(config, &flags, command_needs_tenant(&command))
        .await
        .context("failed to initialize vestry application context")?;

    commands::dispatch::dispatch(command, &mut ctx, &flags).await
}

/// Catalog commands are global, `tenant register` creates the church, and
/// `onboard` finds the church through the user's profile.
fn command_needs_tenant(command: &cli::Commands) -> bool {
    use crate::cli::subcommands::TenantCommands;

    match command {
        cli::Commands::Catalog { .. } | cli::Commands::Onboard(_) => false,
        cli::Commands::Tenant { action } => !matches!(action, TenantCommands::Register { .. }),
        cli::Commands::Module { .. }
        | cli::Commands::Agent { .. }
        | cli::Commands::Bundle { .. }
        | cli::Commands::Status
        | cli::Commands::Billing
        | cli::Commands::Audit(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::command_needs_tenant;
    use crate::cli::Cli;

    fn needs_tenant(args: &[&str]) -> bool {
        let cli = Cli::try_parse_from(args).expect("args should parse");
        command_needs_tenant(&cli.command)
    }

    #[test]
    fn catalog_and_registration_skip_tenant() {
        assert!(!needs_tenant(&["vestry", "catalog", "modules"]));
        assert!(!needs_tenant(&[
            "vestry", "tenant", "register", "--name", "Grace", "--user", "u1"
        ]));
        assert!(!needs_tenant(&["vestry", "onboard", "--user", "u1", "--dry-run"]));
    }

    #[test]
    fn church_scoped_commands_need_tenant() {
        assert!(needs_tenant(&["vestry", "status"]));
        assert!(needs_tenant(&["vestry", "tenant", "show"]));
        assert!(needs_tenant(&["vestry", "bundle", "savings"]));
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("VESTRY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
