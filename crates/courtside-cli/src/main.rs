mod analyze;
mod auth;
mod collect;
mod report;

#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "courtside",
    about = "Reddit NBA discussion collection and word analysis"
)]
pub(crate) struct Cli {
    /// Log level used when `RUST_LOG` is unset (overrides `COURTSIDE_LOG_LEVEL`)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Analyse the titles of a community's newest posts
    Recent(collect::RecentArgs),
    /// Search posts by keyword and analyse their comment threads
    Comments(collect::CommentsArgs),
    /// Print how much of an exported word count each term group takes
    Share(report::ShareArgs),
    /// Draw a text bar chart from an exported word count
    Chart(report::ChartArgs),
}

impl Commands {
    fn needs_reddit(&self) -> bool {
        matches!(self, Self::Recent(_) | Self::Comments(_))
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

async fn run(command: Commands, config: Option<&courtside_core::AppConfig>) -> anyhow::Result<()> {
    match command {
        Commands::Recent(args) => {
            let config = config.ok_or_else(|| anyhow::anyhow!("configuration not loaded"))?;
            collect::run_recent(config, &args).await
        }
        Commands::Comments(args) => {
            let config = config.ok_or_else(|| anyhow::anyhow!("configuration not loaded"))?;
            collect::run_comments(config, &args).await
        }
        Commands::Share(args) => report::run_share(&args),
        Commands::Chart(args) => report::run_chart(&args),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Offline commands work without Reddit credentials.
    let config = if cli.command.needs_reddit() {
        Some(courtside_core::load_app_config()?)
    } else {
        None
    };

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    init_tracing(&level)?;

    tokio::select! {
        result = run(cli.command, config.as_ref()) => result,
        () = shutdown_signal() => {
            tracing::warn!("interrupted; collection abandoned");
            anyhow::bail!("interrupted")
        }
    }
}
