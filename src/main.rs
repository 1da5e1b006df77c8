use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ebb::app::AppContext;
use ebb::cli::{commands, Cli, Commands};
use ebb::config::Config;
use ebb::daemon::{Daemon, DaemonConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ebb=info")))
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config, cli.db)?;

    match cli.command {
        Commands::Run => {
            commands::run_cycle(&ctx).await?;
        }
        Commands::Import { path, resume } => {
            commands::import(&ctx, &path, resume).await?;
        }
        Commands::Sync => {
            commands::sync(&ctx).await?;
        }
        Commands::Retire => {
            commands::retire(&ctx).await?;
        }
        Commands::Repair {
            min_followers,
            start_id,
        } => {
            commands::repair(&ctx, min_followers, start_id).await?;
        }
        Commands::Status => {
            commands::status(&ctx)?;
        }
        Commands::Daemon {
            interval,
            no_initial_run,
        } => {
            let interval_secs =
                DaemonConfig::parse_interval(&interval).map_err(anyhow::Error::msg)?;
            let daemon = Daemon::new(
                Arc::new(ctx),
                DaemonConfig {
                    interval_secs,
                    run_on_start: !no_initial_run,
                },
            );
            daemon.run().await?;
        }
    }

    Ok(())
}
