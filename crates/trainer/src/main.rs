//! Lendtree Trainer CLI
//!
//! Offline trainer for producing the approval classifier artifacts without
//! going through the HTTP service.

use anyhow::{Context, Result};
use clap::Parser;
use lendtree_model::ModelStore;
use lendtree_trainer::{train_from_csv, FEATURE_COLUMNS, TARGET_COLUMN};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "lendtree-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train the loan-approval decision tree from a CSV export", long_about = None)]
struct Args {
    /// Input CSV dataset path (must carry the feature and approval columns)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the model artifacts
    #[arg(short, long, default_value = "ml_model")]
    output: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Lendtree Trainer v{}", env!("CARGO_PKG_VERSION"));
    info!("  Features: {}", FEATURE_COLUMNS.join(", "));
    info!("  Target:   {}", TARGET_COLUMN);

    // Train
    info!("Loading dataset from: {}", args.input.display());
    let trained = train_from_csv(&args.input).context("Training failed")?;

    info!(
        "Trained on {} samples ({} skipped): depth {}, {} leaves",
        trained.meta.samples_used,
        trained.meta.rows_skipped,
        trained.tree.depth(),
        trained.tree.leaf_count()
    );

    // Save artifacts
    let store = ModelStore::new(&args.output);
    store
        .save(&trained.tree, &trained.meta)
        .context("Failed to write model artifacts")?;

    info!("✓ Model saved to {}", store.dir().display());

    Ok(())
}
