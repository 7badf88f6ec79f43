//! LottoMind CLI
//!
//! Syncs the La Primitiva history and prints recommendations.

mod display;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use lottomind::config::{AppConfig, LoggingConfig};
use lottomind::repository::DrawRepository;
use lottomind::strategy::{frequency_table, LottoEngines, StrategyKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lottomind", version, about = "La Primitiva history and recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show what the local history contains
    Status,

    /// Fetch draws newer than the last stored one
    Sync,

    /// Rebuild the whole history from the first year
    Backfill,

    /// Ball frequencies and lags
    Stats {
        /// Number of balls to list
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Recommend a ticket
    Predict {
        /// Run a single strategy instead of the full ensemble
        #[arg(short, long)]
        strategy: Option<StrategyKind>,

        /// Use the stored history as is
        #[arg(long)]
        skip_sync: bool,
    },
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_logging(&config.logging);

    info!("🚀 LottoMind starting");
    info!(config = %config.digest(), "Configuration loaded");

    let repository = DrawRepository::from_config(&config)?;

    match cli.command {
        Command::Status => {
            let dataset = repository.load()?;
            display::display_status(&dataset);
        }
        Command::Sync => {
            let outcome = repository.incremental_sync().await?;
            println!("{}", outcome);
        }
        Command::Backfill => {
            let pb = display::backfill_progress();
            let outcome = repository
                .full_backfill(|fraction, label| display::update_progress(&pb, fraction, label))
                .await?;
            pb.finish_with_message("Backfill finished");
            println!("{}", outcome);
        }
        Command::Stats { top } => {
            let dataset = repository.load()?;
            if dataset.is_empty() {
                bail!("History is empty, run `lottomind sync` first");
            }
            display::display_status(&dataset);
            display::display_stats(&frequency_table(&dataset), top);
        }
        Command::Predict {
            strategy,
            skip_sync,
        } => {
            if !skip_sync {
                let outcome = repository.incremental_sync().await?;
                if outcome.is_failed() {
                    warn!("{}", outcome.message());
                }
                println!("{}", outcome);
            }

            let dataset = repository.load()?;
            if dataset.is_empty() {
                bail!("History is empty, nothing to predict from");
            }

            let mut engines = LottoEngines::new(dataset, config.strategy.clone());
            match strategy {
                Some(kind) => {
                    let result = engines.run(kind)?;
                    display::display_single(kind, &result);
                }
                None => {
                    let report = engines.run_all()?;
                    display::display_ensemble(&report);
                }
            }
        }
    }

    Ok(())
}
