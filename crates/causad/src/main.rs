//! causad — the Causagrid daemon.
//!
//! Single binary assembling the coordination core:
//! - record store (redb)
//! - fleet manager control loop
//! - periodic daily-summary generation
//!
//! Worker processes themselves run under an external supervisor; they
//! coordinate with causad only through the shared store.
//!
//! # Usage
//!
//! ```text
//! causad run --data-dir /var/lib/causagrid --fuero CIV --fuero COM
//! ```

mod resources;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};

use causagrid_autoscale::AutoscalingManager;
use causagrid_queue::{EligibilitySelector, SelectorConfig};
use causagrid_state::StateStore;
use causagrid_state::period::{business_date, now_epoch, previous_date};
use causagrid_stats::SummaryBuilder;

#[derive(Parser)]
#[command(name = "causad", about = "Causagrid daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the fleet manager and summary loops.
    Run {
        /// Data directory for persistent state.
        #[arg(long, default_value = "/var/lib/causagrid")]
        data_dir: PathBuf,

        /// Control-loop interval in seconds.
        #[arg(long, default_value = "60")]
        check_interval: u64,

        /// Summary-generation interval in seconds.
        #[arg(long, default_value = "900")]
        summary_interval: u64,

        /// Fuero to manage; repeat for several.
        #[arg(long = "fuero")]
        fueros: Vec<String>,

        /// Worker type the statistics report under.
        #[arg(long, default_value = "app-update")]
        worker_type: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,causad=debug,causagrid=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            data_dir,
            check_interval,
            summary_interval,
            fueros,
            worker_type,
        } => run(data_dir, check_interval, summary_interval, fueros, worker_type).await,
    }
}

async fn run(
    data_dir: PathBuf,
    check_interval: u64,
    summary_interval: u64,
    fueros: Vec<String>,
    worker_type: String,
) -> anyhow::Result<()> {
    info!("causad starting");

    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("causagrid.redb");
    let state = StateStore::open(&db_path)?;
    info!(path = ?db_path, "record store opened");

    let fueros = if fueros.is_empty() {
        vec!["CIV".to_string(), "COM".to_string(), "CNT".to_string(), "CSS".to_string()]
    } else {
        fueros
    };

    let manager_state = state.get_or_create_manager(now_epoch())?;
    info!(
        fueros = ?fueros,
        max_workers = manager_state.config.max_workers,
        scale_threshold = manager_state.config.scale_threshold,
        "manager state loaded"
    );

    let selector = EligibilitySelector::new(
        state.clone(),
        SelectorConfig {
            update_threshold_hours: manager_state.config.update_threshold_hours,
            ..SelectorConfig::default()
        },
    );

    // Worker counts flow through the store: the external supervisor
    // reports them into the manager record, causad only reads back.
    let count_state = state.clone();
    let manager = AutoscalingManager::new(
        state.clone(),
        selector,
        fueros,
        worker_type.clone(),
    )
    .with_worker_count_fn(Box::new(move |fuero| {
        count_state
            .get_manager()
            .ok()
            .flatten()
            .and_then(|m| m.current.workers.get(fuero).copied())
            .unwrap_or(0)
    }))
    .with_resource_fn(Box::new(resources::sample));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let manager_shutdown = shutdown_rx.clone();
    let summary_shutdown = shutdown_rx.clone();

    let manager_handle = tokio::spawn(async move {
        manager
            .run(Duration::from_secs(check_interval), manager_shutdown)
            .await;
    });

    let builder = SummaryBuilder::new(state.clone());
    let summary_handle = tokio::spawn(async move {
        run_summary_loop(
            builder,
            worker_type,
            Duration::from_secs(summary_interval),
            summary_shutdown,
        )
        .await;
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    let _ = manager_handle.await;
    let _ = summary_handle.await;

    info!("causad stopped");
    Ok(())
}

/// Regenerate the running day's summary on an interval. Each tick also
/// regenerates the previous day's, so reports that arrived after
/// midnight still land in the closed day.
async fn run_summary_loop(
    builder: SummaryBuilder,
    worker_type: String,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(interval_secs = interval.as_secs(), "summary loop started");
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let now = now_epoch();
                let today = business_date(now);
                for date in [previous_date(&today), today] {
                    if let Err(e) = builder.generate(&date, &worker_type, now) {
                        error!(%date, error = %e, "summary generation failed");
                    }
                }
            }
            _ = shutdown.changed() => {
                info!("summary loop shutting down");
                break;
            }
        }
    }
}
