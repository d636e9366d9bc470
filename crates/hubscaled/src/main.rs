//! hubscaled — the hub capacity scaling daemon.
//!
//! Two jobs over the same decision engine:
//! - `up` — long-running watch loop that evaluates the scale-up threshold
//!   on an interval, guarded by a single-flight lease.
//! - `down` — one evaluation cycle in the scale-down direction; an external
//!   scheduler (cron) owns the cadence.
//!
//! # Usage
//!
//! ```text
//! hubscaled up --config hubscale.toml --data-dir /var/lib/hubscale
//! hubscaled down --config hubscale.toml
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use hubscale_control::ArmHubClient;
use hubscale_core::{HubscaleConfig, ScaleDirection};
use hubscale_engine::{RunOutcome, ScaleDriver, WatchLoop};
use hubscale_notify::MailClient;
use hubscale_state::LeaseStore;

#[derive(Parser)]
#[command(name = "hubscaled", about = "Message hub capacity scaling daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scale-up watch loop.
    Up {
        /// Path to the hubscale.toml config file.
        #[arg(long, default_value = "hubscale.toml")]
        config: PathBuf,

        /// Data directory for the single-flight lease database.
        #[arg(long, default_value = "/var/lib/hubscale")]
        data_dir: PathBuf,

        /// Run a single scale-up cycle and exit, skipping the lease.
        #[arg(long)]
        once: bool,
    },
    /// Run one scale-down evaluation cycle.
    Down {
        /// Path to the hubscale.toml config file.
        #[arg(long, default_value = "hubscale.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hubscaled=debug,hubscale=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Up {
            config,
            data_dir,
            once,
        } => run_up(&config, &data_dir, once).await,
        Command::Down { config } => run_down(&config).await,
    }
}

/// Assemble the driver for one direction from the config file.
fn build_driver(
    config: &HubscaleConfig,
    threshold_percent: u8,
) -> anyhow::Result<ScaleDriver<ArmHubClient, ArmHubClient, MailClient>> {
    let client_secret = config.auth.client_secret()?;
    let arm = ArmHubClient::new(&config.hub, &config.auth, client_secret);

    let notifier = match &config.notify {
        Some(notify) => Some(MailClient::new(notify, notify.api_key()?)),
        None => None,
    };

    Ok(ScaleDriver::new(
        arm.clone(),
        arm,
        notifier,
        config.hub.name.clone(),
        threshold_percent,
    ))
}

async fn run_up(config_path: &Path, data_dir: &Path, once: bool) -> anyhow::Result<()> {
    let config = HubscaleConfig::from_file(config_path)?;
    let driver = build_driver(&config, config.scale_up.threshold_percent)?;

    if once {
        let outcome = driver.run_once(ScaleDirection::Up).await?;
        log_outcome(ScaleDirection::Up, &outcome);
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)?;
    let lease = LeaseStore::open(&data_dir.join("hubscale.redb"))?;
    info!(?data_dir, "lease store opened");

    let holder = format!("hubscaled-{}", std::process::id());
    let watch_loop = WatchLoop::new(driver, lease, holder, config.scale_up.interval());

    // Graceful shutdown on Ctrl-C.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    watch_loop.run(shutdown_rx).await?;
    info!("hubscaled stopped");
    Ok(())
}

async fn run_down(config_path: &Path) -> anyhow::Result<()> {
    let config = HubscaleConfig::from_file(config_path)?;
    let driver = build_driver(&config, config.scale_down.threshold_percent)?;

    let outcome = driver.run_once(ScaleDirection::Down).await?;
    log_outcome(ScaleDirection::Down, &outcome);
    Ok(())
}

fn log_outcome(direction: ScaleDirection, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoAction { usage, limit } => {
            info!(%direction, usage, limit, "run complete: no action")
        }
        RunOutcome::AtBoundary { capacity } => {
            info!(%direction, %capacity, "run complete: already at the tier boundary")
        }
        RunOutcome::Scaled { from, to } => {
            info!(%direction, %from, %to, "run complete: capacity changed")
        }
    }
}
