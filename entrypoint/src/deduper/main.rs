use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use dedupe::{DuplicateFilter, EmptyKeyPolicy, FilterStats};
use mimalloc::MiMalloc;
use tracing::{error, info};
use utils::{
    errors::DriverError,
    logger::configure_logger,
    pipeline::dedupe_stream,
    streams::{open_input, open_output, parse_threshold},
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Drops duplicate patent records from a JSON lines stream.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// JSON lines file of extracted records, stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    /// Where accepted records are written, stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
    /// Also drop records whose title is at least this similar (0.9 works well)
    /// to an accepted title
    #[arg(long, value_parser = parse_threshold)]
    similarity_threshold: Option<f64>,
    /// Never treat a missing id or title as a duplicate key
    #[arg(long)]
    exempt_empty_keys: bool,
    /// Push outcome counters to the OTLP endpoint
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
        Ok(stats) => {
            info!("Deduplication complete: {stats}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Deduplication failed: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<FilterStats, DriverError> {
    let policy = if args.exempt_empty_keys {
        EmptyKeyPolicy::Exempt
    } else {
        EmptyKeyPolicy::Deduplicate
    };

    let input = open_input(args.input.as_deref()).await?;
    let mut output = open_output(args.output.as_deref()).await?;
    let filter = DuplicateFilter::new().with_empty_key_policy(policy);

    dedupe_stream(
        input,
        &mut output,
        filter,
        args.similarity_threshold,
        args.emit_metrics,
    )
    .await
}
