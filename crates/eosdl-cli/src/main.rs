//! CLI entry point - the composition root.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use eosdl_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};
use eosdl_download::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialise logging")
}

/// Cancel `token` on the first Ctrl-C.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling downloads");
            token.cancel();
        }
    });
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose)?;

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let config = CliConfig {
        token: cli.token,
        base_url: cli.base_url,
    };
    let ctx = bootstrap(config, cancel)?;
    debug!("CLI context ready");

    match cli.command {
        Commands::Info { command } => handlers::info::execute(&ctx, command).await?,
        Commands::Get(args) => handlers::get::execute(&ctx, args).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before parsing so ARISTA_TOKEN can come from it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(err.downcast_ref::<CliError>().map_or(1, CliError::exit_code))
        }
    }
}
