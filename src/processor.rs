//! Extraction processor
//!
//! This module provides the `ExtractionProcessor` that drives every upload
//! through normalize → remove background → post-process → resize → overlay →
//! archive. Hosts (the CLI, tests, anything embedding the library) only talk
//! to this type.

use crate::{
    config::{validate_opacity, ExtractConfig},
    error::{ExtractError, Result},
    services::{
        ArchivePackager, ImageNormalizer, NoOpProgressReporter, ProcessingStage,
        ProgressReporter, ProgressTracker, ProgressUpdate, RemovalService, RemoveBgClient,
    },
    types::{
        encode_png, masked_file_name, BatchReport, DisplayPair, FileOutcome, MaskedImage,
        OverlayResult, ProcessedImage, ProcessingTimings, SourceImage, Upload,
    },
    utils::{AlphaPostProcessor, ImageResizer, OverlayCompositor},
};
use futures::stream::{self, StreamExt, TryStreamExt};
use image::DynamicImage;
use instant::Instant;
use log::{error, info, warn};
use std::sync::Arc;
use tracing::{debug as trace_debug, instrument};

/// Drives uploads through the extraction pipeline
pub struct ExtractionProcessor {
    config: ExtractConfig,
    service: Arc<dyn RemovalService>,
    reporter: Arc<dyn ProgressReporter>,
}

impl ExtractionProcessor {
    /// Create a processor backed by the remove.bg HTTP client
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Missing API key
    /// - HTTP client construction failure
    pub fn new(config: ExtractConfig) -> Result<Self> {
        config.validate()?;
        let client = RemoveBgClient::new(&config)?;
        Self::with_service(config, Arc::new(client))
    }

    /// Create a processor with an injected removal service
    pub fn with_service(config: ExtractConfig, service: Arc<dyn RemovalService>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            service,
            reporter: Arc::new(NoOpProgressReporter),
        })
    }

    /// Attach a progress reporter
    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Run the full pipeline for one upload
    ///
    /// Removal service failures do not fail the upload: the original image is
    /// substituted as the masked output and the error message is attached to
    /// the result.
    ///
    /// # Errors
    /// - `Decode` when the upload is not a readable image
    /// - Contract violations while resizing or compositing
    #[instrument(
        skip(self, upload),
        fields(file = %upload.file_name, bytes = upload.bytes.len(), service = %self.service.name())
    )]
    pub async fn process_upload(&self, upload: &Upload) -> Result<ProcessedImage> {
        let mut tracker = ProgressTracker::new(self.reporter.as_ref(), &upload.file_name);
        let mut timings = ProcessingTimings::default();
        let total_start = Instant::now();

        tracker.report_stage(ProcessingStage::Normalizing);
        let stage_start = Instant::now();
        let source = match ImageNormalizer::normalize(upload) {
            Ok(source) => source,
            Err(e) => {
                tracker.report_error(&e.to_string());
                return Err(e);
            },
        };
        timings.normalize_ms = stage_start.elapsed().as_millis() as u64;

        tracker.report_stage(ProcessingStage::RemovingBackground);
        let stage_start = Instant::now();
        let removal = self.service.remove_background(&source).await;
        timings.removal_ms = stage_start.elapsed().as_millis() as u64;

        let (masked, service_error) = match removal {
            Ok(cutout) => {
                tracker.report_stage(ProcessingStage::PostProcessing);
                let stage_start = Instant::now();
                trace_debug!(
                    transparent_pixels = AlphaPostProcessor::transparent_pixel_count(&cutout),
                    "Flattening cut-out"
                );
                let masked = MaskedImage::from_service(AlphaPostProcessor::flatten(cutout));
                timings.postprocess_ms = stage_start.elapsed().as_millis() as u64;
                (masked, None)
            },
            Err(e) if e.is_service_failure() => {
                let message = e.to_string();
                error!("{} ({}): using the original image", message, upload.file_name);
                tracker.report_error(&message);
                (MaskedImage::fallback(&source), Some(message))
            },
            Err(e) => return Err(e),
        };

        let stage_start = Instant::now();
        tracker.report_stage(ProcessingStage::Resizing);
        let display = Self::build_display_pair(&source, &masked, self.config.display_width)?;

        tracker.report_stage(ProcessingStage::Compositing);
        let overlay = Self::composite(&display, self.config.overlay_opacity)?;

        tracker.report_stage(ProcessingStage::Encoding);
        let masked_png = encode_png(&masked.image)?;
        timings.display_ms = stage_start.elapsed().as_millis() as u64;
        timings.total_ms = total_start.elapsed().as_millis() as u64;

        tracker.report_completion(&timings);

        Ok(ProcessedImage {
            download_name: masked_file_name(&source.file_name),
            source,
            masked,
            display,
            overlay,
            masked_png,
            service_error,
            timings,
        })
    }

    /// Resize original and masked images to the display width
    ///
    /// Both are resized independently, then the masked one is forced onto the
    /// original's display size so the pair always matches.
    pub fn build_display_pair(
        source: &SourceImage,
        masked: &MaskedImage,
        display_width: u32,
    ) -> Result<DisplayPair> {
        let original = DynamicImage::ImageRgb8(source.image.clone());
        let original_resized = ImageResizer::resize_to_width(&original, display_width)?.to_rgb8();
        let masked_resized = ImageResizer::resize_to_width(&masked.image, display_width)?;

        let (width, height) = original_resized.dimensions();
        let masked_resized = ImageResizer::resize_exact(&masked_resized, width, height);

        DisplayPair::new(original_resized, masked_resized)
    }

    /// Blend a display pair at `opacity`
    pub fn composite(display: &DisplayPair, opacity: f32) -> Result<OverlayResult> {
        let image = OverlayCompositor::blend(display.original(), display.masked(), opacity)?;
        Ok(OverlayResult { image, opacity })
    }

    /// Re-blend a processed upload at a different opacity
    pub fn overlay_at(processed: &ProcessedImage, opacity: f32) -> Result<OverlayResult> {
        validate_opacity(opacity)?;
        Self::composite(&processed.display, opacity)
    }

    /// Process one upload, turning decode failures into a skipped outcome
    async fn process_outcome(&self, upload: &Upload) -> Result<FileOutcome> {
        match self.process_upload(upload).await {
            Ok(processed) => Ok(FileOutcome::Processed(Box::new(processed))),
            Err(error @ ExtractError::Decode { .. }) => {
                error!("❌ {}", error);
                Ok(FileOutcome::DecodeFailed {
                    file_name: upload.file_name.clone(),
                    error,
                })
            },
            Err(e) => Err(e),
        }
    }

    /// Process a batch of uploads and package the archive
    ///
    /// Up to `max_concurrent_requests` uploads are in flight at once.
    /// Outcomes and archive entries always follow upload order. A failing
    /// upload never stops the others.
    ///
    /// # Errors
    /// - Contract violations (these abort the batch)
    /// - Archive encoding failure
    #[instrument(skip(self, uploads), fields(count = uploads.len()))]
    pub async fn process_batch(&self, uploads: &[Upload]) -> Result<BatchReport> {
        let batch_start = Instant::now();
        let limit = self.config.max_concurrent_requests.max(1);
        info!(
            "Processing {} upload(s) via {} ({} request(s) in flight)",
            uploads.len(),
            self.service.name(),
            limit
        );
        self.report_batch_stage(ProcessingStage::BatchInitialization, batch_start);

        let outcomes: Vec<FileOutcome> = stream::iter(uploads.iter().map(|u| self.process_outcome(u)))
            .buffered(limit)
            .try_collect()
            .await?;

        self.report_batch_stage(ProcessingStage::Archiving, batch_start);
        let mut packager = ArchivePackager::new();
        for processed in outcomes.iter().filter_map(FileOutcome::processed) {
            packager.add_masked(processed.file_name(), processed.masked_png.clone());
        }
        let archive = packager.finish()?;

        let report = BatchReport {
            outcomes,
            archive,
            archive_name: self.config.archive_name.clone(),
        };

        if report.skipped_count() > 0 || report.fallback_count() > 0 {
            warn!(
                "Batch finished with problems. Processed: {}, Skipped: {}, Fallbacks: {}",
                report.processed_count(),
                report.skipped_count(),
                report.fallback_count()
            );
        }
        info!(
            "Batch of {} upload(s) finished in {:.2}s",
            uploads.len(),
            batch_start.elapsed().as_secs_f64()
        );
        self.report_batch_stage(ProcessingStage::BatchFinalization, batch_start);

        Ok(report)
    }

    fn report_batch_stage(&self, stage: ProcessingStage, start: Instant) {
        self.reporter.report_progress(ProgressUpdate::new(stage, "", start));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MaskOrigin;
    use async_trait::async_trait;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    /// Service that cuts out the left half of the image
    struct HalfCutService;

    #[async_trait]
    impl RemovalService for HalfCutService {
        async fn remove_background(&self, source: &SourceImage) -> Result<RgbaImage> {
            let (width, _) = source.dimensions();
            Ok(RgbaImage::from_fn(width, source.image.height(), |x, y| {
                let Rgb([r, g, b]) = *source.image.get_pixel(x, y);
                Rgba([r, g, b, if x < width / 2 { 0 } else { 255 }])
            }))
        }

        fn name(&self) -> &str {
            "half-cut"
        }
    }

    fn upload(name: &str, width: u32, height: u32) -> Upload {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 150, 100]));
        Upload::new(name, encode_png(&DynamicImage::ImageRgb8(image)).unwrap())
    }

    fn processor(width: u32) -> ExtractionProcessor {
        let config = ExtractConfig::builder().display_width(width).build().unwrap();
        ExtractionProcessor::with_service(config, Arc::new(HalfCutService)).unwrap()
    }

    #[tokio::test]
    async fn test_process_upload_produces_display_pair() {
        let processed = processor(60)
            .process_upload(&upload("box.png", 30, 20))
            .await
            .unwrap();

        assert_eq!(processed.masked.origin, MaskOrigin::Service);
        assert_eq!(processed.display.dimensions(), (60, 40));
        assert_eq!(processed.overlay.image.dimensions(), (60, 40));
        assert_eq!(processed.download_name, "masked_box.png.png");
        assert!(processed.service_error.is_none());

        // Left half was transparent and is now opaque black
        let masked = processed.masked.image.to_rgba8();
        assert_eq!(masked.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(masked.get_pixel(29, 19), &Rgba([200, 150, 100, 255]));
    }

    #[tokio::test]
    async fn test_overlay_at_extremes() {
        let processed = processor(30)
            .process_upload(&upload("box.png", 30, 20))
            .await
            .unwrap();

        let original = ExtractionProcessor::overlay_at(&processed, 0.0).unwrap();
        assert_eq!(&original.image, processed.display.original());

        let masked = ExtractionProcessor::overlay_at(&processed, 1.0).unwrap();
        assert_eq!(masked.image, processed.display.masked().to_rgb8());

        assert!(ExtractionProcessor::overlay_at(&processed, 2.0).is_err());
    }

    #[test]
    fn test_display_pair_matches_for_odd_service_sizes() {
        // Service output one pixel taller than the source
        let source = ImageNormalizer::normalize(&upload("odd.png", 333, 100)).unwrap();
        let masked = MaskedImage::from_service(RgbaImage::new(333, 101));
        let pair = ExtractionProcessor::build_display_pair(&source, &masked, 800).unwrap();
        assert_eq!(pair.dimensions(), (800, 240));
        assert_eq!(pair.masked().to_rgb8().dimensions(), (800, 240));
    }

    #[test]
    fn test_processor_rejects_invalid_config() {
        let config = ExtractConfig {
            display_width: 0,
            ..ExtractConfig::default()
        };
        assert!(ExtractionProcessor::with_service(config, Arc::new(HalfCutService)).is_err());
    }

    #[test]
    fn test_http_processor_requires_key() {
        assert!(ExtractionProcessor::new(ExtractConfig::default()).is_err());
    }
}
