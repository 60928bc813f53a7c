//! sealpostd — long-running stamp-and-dispatch watcher for a PDF drop
//! folder. Exits only on interrupt.

use clap::Parser;
use sp_core::config::SealpostConfig;
use sp_pdf::PdfEngine;
use sp_pipeline::DocumentPipeline;
use sp_router::RoutingTable;
use sp_watcher::Scheduler;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sealpostd",
    about = "Watches a drop folder, stamps and normalizes incoming PDFs, \
             then routes them by filename identifier"
)]
struct Args {
    /// Directory to watch for incoming PDF documents
    watch_dir: PathBuf,

    /// TOML configuration file (overlay assets, routing table, intervals)
    #[arg(long)]
    config: PathBuf,

    /// Override the poll interval in seconds
    #[arg(long)]
    interval: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = SealpostConfig::load(&args.config)?;
    if let Some(secs) = args.interval {
        config.watch.poll_interval_secs = secs;
    }

    let table = RoutingTable::new(config.routing.clone());
    table.ensure_destinations()?;

    let pipeline = DocumentPipeline::new(config, table, Arc::new(PdfEngine::new()));
    let mut scheduler = Scheduler::new(&args.watch_dir, pipeline);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping");
            let _ = shutdown_tx.send(true);
        }
    });

    scheduler.run(shutdown_rx).await;
    Ok(())
}
