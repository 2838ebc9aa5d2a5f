//! Background extraction CLI tool
//!
//! Command-line host for the extraction processor: reads uploads from disk,
//! runs the batch and writes masked PNGs, overlays and the ZIP archive.

use super::{config::CliConfigBuilder, progress::BarProgressReporter};
use crate::{
    processor::ExtractionProcessor,
    services::{ConsoleProgressReporter, ProgressReporter, UploadIOService},
    tracing_config::{init_cli_tracing, spans, TracingFormat},
    types::{FileOutcome, Upload},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Batch background removal through the remove.bg API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "bg-extract")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image files, processed in the given order
    #[arg(value_name = "INPUT", required = true)]
    pub input: Vec<PathBuf>,

    /// Output directory for masked images, overlays and the archive
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// remove.bg API key
    #[arg(long, env = "REMOVE_BG_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Removal service endpoint
    #[arg(long, env = "REMOVE_BG_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Output size requested from the service
    #[arg(long, value_enum, default_value_t = CliOutputSize::Auto)]
    pub size: CliOutputSize,

    /// Display width of the resized images and overlay
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Overlay opacity (0.0 = original, 1.0 = masked)
    #[arg(long, default_value_t = 0.5)]
    pub opacity: f32,

    /// Maximum removal requests in flight
    #[arg(short = 'j', long, default_value_t = 1)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Also write overlay_<file>.png previews
    #[arg(long)]
    pub overlays: bool,

    /// Skip writing the ZIP archive
    #[arg(long)]
    pub no_archive: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log every pipeline stage of every file
    #[arg(long)]
    pub progress: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliOutputSize {
    Auto,
    Preview,
    Full,
}

/// What a CLI run wrote and skipped
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Uploads that produced a masked image (fallbacks included)
    pub processed: usize,
    /// Inputs that could not be read or decoded
    pub skipped: usize,
    /// Uploads whose masked image is the original
    pub fallbacks: usize,
    /// Every file written, in write order
    pub written: Vec<PathBuf>,
    pub archive: Option<PathBuf>,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose, TracingFormat::Console)
        .context("Failed to initialize tracing subscriber")?;

    let summary = run(&cli).await?;
    if summary.processed == 0 {
        anyhow::bail!("No input could be processed");
    }
    Ok(())
}

/// Run the CLI against the remove.bg service
pub async fn run(cli: &Cli) -> Result<RunSummary> {
    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
    let processor =
        ExtractionProcessor::new(config).context("Failed to create extraction processor")?;
    run_with_processor(cli, processor).await
}

/// Run the CLI with an already constructed processor
pub async fn run_with_processor(cli: &Cli, processor: ExtractionProcessor) -> Result<RunSummary> {
    let start_time = Instant::now();
    let mut summary = RunSummary::default();

    info!("Starting background extraction");
    info!(
        "Service: {}, display width: {}, concurrency: {}",
        processor.service_name(),
        processor.config().display_width,
        processor.config().max_concurrent_requests
    );

    let uploads = read_uploads(&cli.input, &mut summary);
    if uploads.is_empty() {
        warn!("None of the inputs could be read");
        return Ok(summary);
    }

    let bar = (uploads.len() > 1)
        .then(|| Arc::new(BarProgressReporter::new(uploads.len(), cli.progress)));
    let reporter: Arc<dyn ProgressReporter> = match &bar {
        Some(bar) => Arc::clone(bar) as Arc<dyn ProgressReporter>,
        None => Arc::new(ConsoleProgressReporter::new(cli.progress)),
    };
    let processor = processor.with_progress_reporter(reporter);

    let span = spans::batch_processing(uploads.len(), processor.service_name());
    let report = processor
        .process_batch(&uploads)
        .instrument(span)
        .await
        .context("Batch processing failed")?;

    if let Some(bar) = &bar {
        bar.finish(report.processed_count(), report.skipped_count());
    }

    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Processed(processed) => {
                let _guard = spans::output_writing(processed.file_name()).entered();
                if let Some(message) = &processed.service_error {
                    warn!(
                        "⚠️  {}: {}. Saved the original image instead",
                        processed.file_name(),
                        message
                    );
                    summary.fallbacks += 1;
                }

                let path = UploadIOService::write_masked(
                    &cli.output,
                    processed.file_name(),
                    &processed.masked_png,
                )
                .with_context(|| format!("Failed to save {}", processed.download_name))?;
                summary.written.push(path);

                if cli.overlays {
                    let path = UploadIOService::write_overlay(
                        &cli.output,
                        processed.file_name(),
                        &processed.overlay.image,
                    )
                    .with_context(|| format!("Failed to save overlay of {}", processed.file_name()))?;
                    summary.written.push(path);
                }
                summary.processed += 1;
            },
            FileOutcome::DecodeFailed { file_name, .. } => {
                warn!("Skipped {}", file_name);
                summary.skipped += 1;
            },
        }
    }

    if !cli.no_archive && report.processed_count() > 0 {
        let path = UploadIOService::write_output(&cli.output, &report.archive_name, &report.archive)
            .context("Failed to save archive")?;
        info!("📦 Archive written to {}", path.display());
        summary.written.push(path.clone());
        summary.archive = Some(path);
    }

    let total_time = start_time.elapsed();
    info!("📊 Batch summary:");
    info!("  ├─ Files processed: {}", summary.processed);
    info!("  ├─ Files skipped: {}", summary.skipped);
    info!("  ├─ Fallbacks: {}", summary.fallbacks);
    info!("  └─ Total time: {:.2}s", total_time.as_secs_f64());

    Ok(summary)
}

/// Read inputs in order; unreadable paths are logged and counted as skipped
fn read_uploads(inputs: &[PathBuf], summary: &mut RunSummary) -> Vec<Upload> {
    let mut uploads = Vec::with_capacity(inputs.len());
    for path in inputs {
        match UploadIOService::read_upload(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                error!("❌ Could not process {}: {}", path.display(), e);
                summary.skipped += 1;
            },
        }
    }
    uploads
}
