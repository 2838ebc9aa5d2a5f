//! Progress bar reporter for multi-file batches

use crate::{
    services::{ConsoleProgressReporter, ProcessingStage, ProgressReporter, ProgressUpdate},
    types::ProcessingTimings,
};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives an indicatif bar and forwards events to the console reporter
///
/// The bar advances once per upload: on completion, or on an error during
/// normalization (the upload is skipped).
pub(crate) struct BarProgressReporter {
    bar: ProgressBar,
    console: ConsoleProgressReporter,
}

impl BarProgressReporter {
    pub(crate) fn new(total: usize, verbose: bool) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self {
            bar,
            console: ConsoleProgressReporter::new(verbose),
        }
    }

    pub(crate) fn finish(&self, processed: usize, skipped: usize) {
        self.bar.finish_with_message(format!(
            "Completed! Processed: {processed}, Skipped: {skipped}"
        ));
    }
}

impl ProgressReporter for BarProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if update.stage == ProcessingStage::RemovingBackground {
            self.bar.set_message(update.file_name.clone());
        }
        self.console.report_progress(update);
    }

    fn report_completion(&self, file_name: &str, timings: &ProcessingTimings) {
        self.bar.inc(1);
        self.bar
            .suspend(|| self.console.report_completion(file_name, timings));
    }

    fn report_error(&self, stage: ProcessingStage, file_name: &str, error: &str) {
        if stage == ProcessingStage::Normalizing {
            self.bar.inc(1);
        }
        self.bar
            .suspend(|| self.console.report_error(stage, file_name, error));
    }
}
