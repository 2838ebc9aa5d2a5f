#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # Background Extraction Library
//!
//! Batch object extraction on top of the remove.bg HTTP API. Every upload is
//! normalized to 24-bit RGB, sent to the removal service, flattened onto
//! black, resized for display, blended into an overlay preview and finally
//! packaged into a ZIP archive of masked PNGs.
//!
//! ## Features
//!
//! - **Any input format**: JPEG, PNG, WebP, BMP, TIFF and GIF uploads are accepted
//! - **Graceful fallback**: removal service failures keep the original image
//! - **Ordered batches**: bounded concurrency, results always in upload order
//! - **Pluggable service**: anything implementing `RemovalService` can replace the HTTP client
//! - **CLI Integration**: Optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bg_extract::{extract_objects, ExtractConfig, Upload};
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Reads REMOVE_BG_API_KEY from the environment
//! let config = ExtractConfig::from_env()?;
//!
//! let uploads = vec![Upload::new("cat.jpg", std::fs::read("cat.jpg")?)];
//! let report = extract_objects(&uploads, &config).await?;
//!
//! for outcome in &report.outcomes {
//!     if let Some(message) = outcome.error_message() {
//!         eprintln!("{}: {}", outcome.file_name(), message);
//!     }
//! }
//! std::fs::write(&report.archive_name, &report.archive)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): Command-line interface and progress reporting
//! - `webp-support` (default): WebP input support
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! bg-extract = { version = "0.1", default-features = false }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod processor;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod utils;

use tokio::io::AsyncRead;

// Public API exports
pub use config::{ApiKey, ExtractConfig, ExtractConfigBuilder, OutputSize};
pub use error::{ExtractError, Result};
pub use processor::ExtractionProcessor;
pub use services::{
    ArchivePackager, ConsoleProgressReporter, ImageNormalizer, NoOpProgressReporter,
    ProcessingStage, ProgressReporter, ProgressTracker, ProgressUpdate, RemovalService,
    RemoveBgClient, UploadIOService,
};
pub use types::{
    BatchReport, DisplayPair, FileOutcome, MaskOrigin, MaskedImage, OverlayResult,
    ProcessedImage, ProcessingTimings, SourceImage, Upload,
};
pub use utils::{AlphaPostProcessor, ImageResizer, OverlayCompositor};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Run a batch of uploads through the remove.bg service
///
/// Convenience wrapper around `ExtractionProcessor::new` and
/// `ExtractionProcessor::process_batch`.
///
/// # Errors
/// - Invalid configuration or missing API key
/// - Contract violations during processing
/// - Archive encoding failure
pub async fn extract_objects(uploads: &[Upload], config: &ExtractConfig) -> Result<BatchReport> {
    let processor = ExtractionProcessor::new(config.clone())?;
    processor.process_batch(uploads).await
}

/// Process a single upload read from an async stream
///
/// ```rust,no_run
/// use bg_extract::{extract_from_reader, ExtractConfig};
/// use tokio::fs::File;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = ExtractConfig::from_env()?;
/// let file = File::open("portrait.png").await?;
/// let processed = extract_from_reader("portrait.png", file, &config).await?;
/// std::fs::write(&processed.download_name, &processed.masked_png)?;
/// # Ok(())
/// # }
/// ```
pub async fn extract_from_reader<R: AsyncRead + Unpin>(
    file_name: &str,
    mut reader: R,
    config: &ExtractConfig,
) -> Result<ProcessedImage> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer)
        .await
        .map_err(|e| ExtractError::processing(format!("Failed to read from stream: {}", e)))?;

    let processor = ExtractionProcessor::new(config.clone())?;
    processor.process_upload(&Upload::new(file_name, buffer)).await
}
