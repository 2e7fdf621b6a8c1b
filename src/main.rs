//! Repodoc - Main Entry Point
//!
//! Reads configuration from the environment, runs the selected pipeline and
//! writes every artifact once the whole run has succeeded.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repodoc::backend::{GatedBackend, OpenAiClient};
use repodoc::chunkers::{counter_for, ChunkPacker};
use repodoc::pipeline::{generate_to_disk, RunContext};
use repodoc::processing::FileFilter;
use repodoc::types::DocGenConfig;

#[tokio::main]
async fn main() {
    // Load configuration
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        error!(error = format!("{e:#}"), "Documentation run failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "repodoc=info".into()),
    );
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn run() -> Result<()> {
    let config = DocGenConfig::from_env().context("invalid configuration")?;

    info!("Starting repodoc v{}", env!("CARGO_PKG_VERSION"));
    info!(
        mode = ?config.mode,
        src_dir = %config.src_dir.display(),
        output_dir = %config.output_dir.display(),
        cost_model = ?config.cost_model,
        budget = config.max_chunk_cost(),
        "Configuration loaded"
    );

    // Initialize components
    let client = OpenAiClient::from_config(&config)?;
    let backend = GatedBackend::from_config(client, &config);
    let filter = FileFilter::with_defaults()?;
    let packer = ChunkPacker::new(counter_for(config.cost_model)?, config.max_chunk_cost());

    let ctx = RunContext {
        config: &config,
        backend: &backend,
        filter: &filter,
        packer: &packer,
        base: Path::new("."),
    };
    generate_to_disk(&ctx).await?;
    Ok(())
}
