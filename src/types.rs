//! Data types flowing through the extraction pipeline

use crate::error::{ExtractError, Result};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage};
use std::io::Cursor;

/// Prefix of every masked output file name
pub const MASKED_PREFIX: &str = "masked_";

/// Name of the downloadable masked PNG for an upload
///
/// ```rust
/// assert_eq!(bg_extract::types::masked_file_name("cat.jpg"), "masked_cat.jpg.png");
/// ```
#[must_use]
pub fn masked_file_name(file_name: &str) -> String {
    format!("{}{}.png", MASKED_PREFIX, file_name)
}

/// Encode any image as PNG bytes
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// A single uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Original file name, used for output naming and error messages
    pub file_name: String,
    /// Raw file contents in any format
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new<S: Into<String>>(file_name: S, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Decoded upload in the canonical 24-bit representation
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub file_name: String,
    pub image: RgbImage,
    /// Lossless PNG encoding of `image`, sent to the removal service
    pub png: Vec<u8>,
}

impl SourceImage {
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Where a masked image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskOrigin {
    /// Removal service output after alpha post-processing
    Service,
    /// The unmodified original, substituted after a service failure
    Fallback,
}

/// Masked result for one upload
#[derive(Debug, Clone)]
pub struct MaskedImage {
    /// RGBA for service output, RGB for the fallback
    pub image: DynamicImage,
    pub origin: MaskOrigin,
}

impl MaskedImage {
    #[must_use]
    pub fn from_service(image: image::RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
            origin: MaskOrigin::Service,
        }
    }

    #[must_use]
    pub fn fallback(source: &SourceImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(source.image.clone()),
            origin: MaskOrigin::Fallback,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin == MaskOrigin::Fallback
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Display-sized original and masked images with identical dimensions
#[derive(Debug, Clone)]
pub struct DisplayPair {
    original: RgbImage,
    masked: DynamicImage,
}

impl DisplayPair {
    /// Pair two display images, enforcing matching dimensions
    pub fn new(original: RgbImage, masked: DynamicImage) -> Result<Self> {
        if original.dimensions() != masked.dimensions() {
            return Err(ExtractError::DimensionMismatch {
                expected: original.dimensions(),
                actual: masked.dimensions(),
            });
        }
        Ok(Self { original, masked })
    }

    #[must_use]
    pub fn original(&self) -> &RgbImage {
        &self.original
    }

    #[must_use]
    pub fn masked(&self) -> &DynamicImage {
        &self.masked
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.original.dimensions()
    }
}

/// Blend of a display pair at a given opacity
#[derive(Debug, Clone)]
pub struct OverlayResult {
    pub image: RgbImage,
    pub opacity: f32,
}

impl OverlayResult {
    /// Caption in the form the dashboard used, e.g. `Overlay (50%)`
    #[must_use]
    pub fn caption(&self) -> String {
        format!("Overlay ({:.0}%)", self.opacity * 100.0)
    }
}

/// Wall-clock timings for one upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingTimings {
    pub normalize_ms: u64,
    pub removal_ms: u64,
    pub postprocess_ms: u64,
    /// Resizing, overlay and PNG encoding
    pub display_ms: u64,
    pub total_ms: u64,
}

/// Everything produced for one successfully decoded upload
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub source: SourceImage,
    pub masked: MaskedImage,
    pub display: DisplayPair,
    pub overlay: OverlayResult,
    /// `masked_<file name>.png`
    pub download_name: String,
    /// PNG of the full-resolution masked image
    pub masked_png: Vec<u8>,
    /// Service failure message when the fallback was used
    pub service_error: Option<String>,
    pub timings: ProcessingTimings,
}

impl ProcessedImage {
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.source.file_name
    }

    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.masked.is_fallback()
    }
}

/// Structured per-file result handed to the host
#[derive(Debug)]
pub enum FileOutcome {
    Processed(Box<ProcessedImage>),
    DecodeFailed { file_name: String, error: ExtractError },
}

impl FileOutcome {
    #[must_use]
    pub fn file_name(&self) -> &str {
        match self {
            Self::Processed(processed) => processed.file_name(),
            Self::DecodeFailed { file_name, .. } => file_name,
        }
    }

    #[must_use]
    pub fn processed(&self) -> Option<&ProcessedImage> {
        match self {
            Self::Processed(processed) => Some(processed.as_ref()),
            Self::DecodeFailed { .. } => None,
        }
    }

    /// User-facing error message, if the file had any problem
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Processed(processed) => processed.service_error.clone(),
            Self::DecodeFailed { error, .. } => Some(error.to_string()),
        }
    }
}

/// Result of a whole batch
#[derive(Debug)]
pub struct BatchReport {
    /// One outcome per upload, in upload order
    pub outcomes: Vec<FileOutcome>,
    /// Finalized ZIP with one entry per processed upload
    pub archive: Vec<u8>,
    pub archive_name: String,
}

impl BatchReport {
    /// Uploads that produced output (including fallbacks)
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Processed(_)))
            .count()
    }

    /// Uploads skipped because they could not be decoded
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.processed_count()
    }

    /// Uploads whose masked output is the unmodified original
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(FileOutcome::processed)
            .filter(|p| p.used_fallback())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbaImage};

    #[test]
    fn test_masked_file_name() {
        assert_eq!(masked_file_name("photo.jpg"), "masked_photo.jpg.png");
        assert_eq!(masked_file_name("noext"), "masked_noext.png");
    }

    #[test]
    fn test_display_pair_rejects_mismatch() {
        let original = RgbImage::new(10, 5);
        let masked = DynamicImage::ImageRgba8(RgbaImage::new(10, 6));
        let err = DisplayPair::new(original, masked).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::DimensionMismatch {
                expected: (10, 5),
                actual: (10, 6)
            }
        ));
    }

    #[test]
    fn test_fallback_keeps_original_pixels() {
        let image = RgbImage::from_pixel(4, 4, Rgb([12, 34, 56]));
        let source = SourceImage {
            file_name: "a.png".into(),
            png: encode_png(&DynamicImage::ImageRgb8(image.clone())).unwrap(),
            image,
        };
        let masked = MaskedImage::fallback(&source);
        assert!(masked.is_fallback());
        assert_eq!(masked.image.to_rgb8(), source.image);
    }

    #[test]
    fn test_overlay_caption() {
        let overlay = OverlayResult {
            image: RgbImage::new(1, 1),
            opacity: 0.5,
        };
        assert_eq!(overlay.caption(), "Overlay (50%)");
    }

    #[test]
    fn test_encode_png_has_signature() {
        let png = encode_png(&DynamicImage::ImageRgb8(RgbImage::new(2, 2))).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
