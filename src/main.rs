//! Backup pruner entry point.
//!
//! One-shot job: load configuration, open the backup store, build a fresh
//! decider tree, compute the prune list, and delete it unless dry-run is
//! active.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use common::config::Configuration;
use common::storage::create_object_store;
use pruner::decider::build_decider;
use pruner::job::PruneJob;

#[derive(Parser, Debug)]
#[command(author, version, about = "Retention pruner for blob-stored backup archives", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force dry-run mode regardless of configuration
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Default)]
enum Command {
    /// Run the prune job once (default)
    #[default]
    Run,
    /// Show the effective configuration and exit
    Config {
        #[arg(long, help = "Show configuration in JSON format")]
        json: bool,
    },
    /// Validate the configuration and exit
    Validate,
}

fn init_logging(args: &Args) {
    let level = if args.quiet {
        "warn"
    } else if args.verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn display_config(config: &Configuration, json: bool) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration to JSON")?;
        println!("{json}");
    } else {
        println!("Backup pruner configuration:");
        println!("============================");
        println!("Storage DSN: {}", config.storage.dsn);
        println!("Dry run: {}", config.prune.dry_run);
        println!("Decider: {:?}", config.prune.decider);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let config = match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration file");
            Configuration::load_from_path(path).context("Failed to load configuration")?
        }
        None => Configuration::load().context("Failed to load configuration")?,
    };

    match args.command.clone().unwrap_or_default() {
        Command::Config { json } => return display_config(&config, json),
        Command::Validate => {
            config.validate().context("Configuration is invalid")?;
            println!("Configuration is valid");
            return Ok(());
        }
        Command::Run => {}
    }

    config.validate().context("Configuration is invalid")?;

    // The CLI flag can only force dry-run on, never switch deletion on
    // behind a config that asked for a dry run.
    let dry_run = args.dry_run || config.prune.dry_run;

    let mut decider =
        build_decider(&config.prune.decider).context("Failed to build retention decider")?;
    let object_store =
        create_object_store(&config.storage).context("Failed to open backup storage")?;

    let job = PruneJob::new(object_store, dry_run);
    let report = job
        .run(decider.as_mut())
        .await
        .context("Prune run failed")?;

    if report.dry_run && !report.pruned.is_empty() {
        tracing::info!(
            pruned = report.pruned.len(),
            "Re-run with dry-run disabled to delete these backups"
        );
    }

    Ok(())
}
