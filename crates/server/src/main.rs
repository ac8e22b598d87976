//! Hestia prediction service entrypoint

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hestia_server::{start_server, AppState};

#[derive(Parser, Debug)]
#[command(name = "hestia-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "House price estimation HTTP service", long_about = None)]
struct Args {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Listen port
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Model artifact path
    #[arg(short, long, default_value = "models/house_price_model.json")]
    model: PathBuf,

    /// Default training data path for `/train`
    #[arg(short, long, default_value = "data/house_data.csv")]
    data: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
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

    info!("Hestia server v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::new(&args.model, &args.data).shared();

    let addr = format!("{}:{}", args.host, args.port);
    info!("listening on {addr}");

    start_server(state, &addr).await
}
