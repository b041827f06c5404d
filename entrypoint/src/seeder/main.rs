use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use metrics::{Metrics, put_metric};
use mimalloc::MiMalloc;
use seeds::{SeedConfig, SeedUrlGenerator};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};
use utils::{errors::DriverError, logger::configure_logger, streams::open_output};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Writes the crawl's start URLs, one per line.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Seed config (JSON); defaults to $PATENT_SEEDS_CONFIG, then the bundled vocabulary
    #[arg(long)]
    config: Option<PathBuf>,
    /// Destination file, stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
    /// Push the generated URL count to the OTLP endpoint
    #[arg(long)]
    emit_metrics: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    configure_logger();

    let args = Args::parse();
    let emit_metrics = args.emit_metrics;

    let result = run(args).await;

    if emit_metrics {
        metrics::shutdown();
    }

    match result {
        Ok(count) => {
            info!("Wrote {count} seed URLs");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Seed generation failed: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<usize, DriverError> {
    let config = match &args.config {
        Some(path) => SeedConfig::from_path(path)?,
        None => SeedConfig::load()?,
    };

    let urls = SeedUrlGenerator::new(config).generate()?;

    let mut output = open_output(args.output.as_deref()).await?;

    for url in &urls {
        output.write_all(format!("{url}\n").as_bytes()).await?;
    }

    output.flush().await?;

    if args.emit_metrics {
        put_metric!(Metrics::SeedUrlGenerated, urls.len() as u64);
    }

    Ok(urls.len())
}
