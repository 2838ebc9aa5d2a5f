//! Progress reporting service
//!
//! This module separates progress reporting concerns from business logic,
//! allowing different hosts to implement their own progress handling.
//! Reporters are shared across files that may be processed concurrently, so
//! every event carries the file it belongs to.

use crate::types::ProcessingTimings;
use instant::Instant;

/// Progress stages of one upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Decoding and converting the upload
    Normalizing,
    /// Waiting for the removal service
    RemovingBackground,
    /// Flattening the alpha channel of the cut-out
    PostProcessing,
    /// Scaling original and masked images for display
    Resizing,
    /// Blending the overlay preview
    Compositing,
    /// Encoding the masked PNG for download
    Encoding,
    /// Upload finished (possibly with the fallback image)
    Completed,

    // Batch stages
    /// Starting a batch
    BatchInitialization,
    /// Writing the batch archive
    Archiving,
    /// Batch finished
    BatchFinalization,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Normalizing => "Normalizing upload",
            ProcessingStage::RemovingBackground => "Removing background",
            ProcessingStage::PostProcessing => "Post-processing alpha channel",
            ProcessingStage::Resizing => "Resizing for display",
            ProcessingStage::Compositing => "Compositing overlay",
            ProcessingStage::Encoding => "Encoding masked image",
            ProcessingStage::Completed => "Processing completed",
            ProcessingStage::BatchInitialization => "Initializing batch",
            ProcessingStage::Archiving => "Packaging archive",
            ProcessingStage::BatchFinalization => "Finalizing batch",
        }
    }

    /// Get the typical progress percentage for this stage
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingStage::Normalizing => 5,
            ProcessingStage::RemovingBackground => 15,
            ProcessingStage::PostProcessing => 80,
            ProcessingStage::Resizing => 85,
            ProcessingStage::Compositing => 92,
            ProcessingStage::Encoding => 97,
            ProcessingStage::Completed => 100,
            ProcessingStage::BatchInitialization => 0,
            ProcessingStage::Archiving => 98,
            ProcessingStage::BatchFinalization => 100,
        }
    }
}

/// Progress update for one file
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current processing stage
    pub stage: ProcessingStage,
    /// File the update belongs to (empty for batch stages)
    pub file_name: String,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human-readable stage description
    pub description: String,
    /// Elapsed time since the file started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    /// Create a new progress update
    #[must_use]
    pub fn new(stage: ProcessingStage, file_name: &str, start_time: Instant) -> Self {
        Self {
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            file_name: file_name.to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Trait for reporting progress during extraction
pub trait ProgressReporter: Send + Sync {
    /// Report a stage transition
    fn report_progress(&self, update: ProgressUpdate);

    /// Report a finished file with its timings
    fn report_completion(&self, file_name: &str, timings: &ProcessingTimings);

    /// Report a per-file error
    fn report_error(&self, stage: ProcessingStage, file_name: &str, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _file_name: &str, _timings: &ProcessingTimings) {}

    fn report_error(&self, _stage: ProcessingStage, _file_name: &str, _error: &str) {}
}

/// Console progress reporter that logs through `log`
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// # Arguments
    /// * `verbose` - Whether to log every stage and detailed timings
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            log::info!(
                "[{}%] {}: {} ({}ms elapsed)",
                update.progress,
                update.file_name,
                update.description,
                update.elapsed_ms
            );
        } else {
            log::debug!("[{}%] {}: {}", update.progress, update.file_name, update.description);
        }
    }

    fn report_completion(&self, file_name: &str, timings: &ProcessingTimings) {
        log::info!("✅ {} processed in {}ms", file_name, timings.total_ms);

        if self.verbose {
            log::info!("  📊 Detailed timings:");
            log::info!("    • Normalize: {}ms", timings.normalize_ms);
            log::info!("    • Removal service: {}ms", timings.removal_ms);
            log::info!("    • Post-processing: {}ms", timings.postprocess_ms);
            log::info!("    • Display + overlay: {}ms", timings.display_ms);
        }
    }

    fn report_error(&self, stage: ProcessingStage, file_name: &str, error: &str) {
        log::error!("❌ {} failed during {}: {}", file_name, stage.description(), error);
    }
}

/// Per-file progress tracker
pub struct ProgressTracker<'a> {
    reporter: &'a dyn ProgressReporter,
    file_name: &'a str,
    start_time: Instant,
    current_stage: Option<ProcessingStage>,
}

impl<'a> ProgressTracker<'a> {
    #[must_use]
    pub fn new(reporter: &'a dyn ProgressReporter, file_name: &'a str) -> Self {
        Self {
            reporter,
            file_name,
            start_time: Instant::now(),
            current_stage: None,
        }
    }

    /// Report progress for a specific stage
    pub fn report_stage(&mut self, stage: ProcessingStage) {
        self.current_stage = Some(stage);
        self.reporter
            .report_progress(ProgressUpdate::new(stage, self.file_name, self.start_time));
    }

    /// Report an error at the current stage
    pub fn report_error(&self, error: &str) {
        let stage = self.current_stage.unwrap_or(ProcessingStage::Normalizing);
        self.reporter.report_error(stage, self.file_name, error);
    }

    /// Report the finished file
    pub fn report_completion(&mut self, timings: &ProcessingTimings) {
        self.report_stage(ProcessingStage::Completed);
        self.reporter.report_completion(self.file_name, timings);
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    #[must_use]
    pub fn current_stage(&self) -> Option<ProcessingStage> {
        self.current_stage
    }
}
