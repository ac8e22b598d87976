//! Hestia offline trainer CLI
//!
//! Trains the house-price model from a CSV dataset, optionally generating a
//! synthetic one first.

use anyhow::{Context, Result};
use clap::Parser;
use hestia_model::GbdtParams;
use hestia_trainer::{run, TrainOptions};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hestia-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train the house-price model from a CSV dataset", long_about = None)]
struct Args {
    /// Input CSV dataset path
    #[arg(short, long, default_value = "data/house_data.csv")]
    data: PathBuf,

    /// Output model artifact path
    #[arg(short, long, default_value = "models/house_price_model.json")]
    model: PathBuf,

    /// Generate a synthetic dataset at the data path before training
    #[arg(long)]
    generate: bool,

    /// Number of synthetic samples to generate
    #[arg(long, default_value = "1000")]
    samples: usize,

    /// Number of boosting trees
    #[arg(long, default_value = "300")]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "8")]
    max_depth: usize,

    /// Learning rate
    #[arg(long, default_value = "0.05")]
    learning_rate: f64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

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
        .context("failed to set tracing subscriber")?;

    info!("Hestia trainer v{}", env!("CARGO_PKG_VERSION"));

    let options = TrainOptions {
        data_path: args.data,
        model_path: args.model,
        n_samples: args.samples,
        generate_sample: args.generate,
        params: GbdtParams {
            n_trees: args.trees,
            max_depth: args.max_depth,
            learning_rate: args.learning_rate,
            ..GbdtParams::default()
        },
    };

    let report = run(&options).context("training failed")?;

    info!("training complete");
    info!("  RMSE: {:.2}", report.metrics.rmse);
    info!("  MAE: {:.2}", report.metrics.mae);
    info!("  R2: {:.4}", report.metrics.r2_score);
    info!("  features: {:?}", report.feature_names);
    info!("  model: {}", report.model_path);

    Ok(())
}
