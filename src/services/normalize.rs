//! Upload normalization service
//!
//! Every upload is decoded with content-based format detection, converted to
//! 24-bit RGB and round-tripped through PNG, so later stages always see the
//! same representation regardless of what was uploaded.

use crate::{
    error::{ExtractError, Result},
    types::{encode_png, SourceImage, Upload},
};
use image::DynamicImage;

/// Service for turning raw uploads into canonical images
pub struct ImageNormalizer;

impl ImageNormalizer {
    /// Normalize an upload
    ///
    /// # Errors
    /// - `ExtractError::Decode` when the bytes are not a readable image
    ///
    /// # Examples
    /// ```rust
    /// use bg_extract::{services::ImageNormalizer, types::{encode_png, Upload}};
    /// use image::{DynamicImage, RgbaImage};
    ///
    /// let png = encode_png(&DynamicImage::ImageRgba8(RgbaImage::new(4, 3))).unwrap();
    /// let source = ImageNormalizer::normalize(&Upload::new("a.png", png)).unwrap();
    /// assert_eq!(source.dimensions(), (4, 3));
    /// ```
    pub fn normalize(upload: &Upload) -> Result<SourceImage> {
        Self::normalize_bytes(&upload.file_name, &upload.bytes)
    }

    /// Normalize raw bytes, tagging errors with `file_name`
    pub fn normalize_bytes(file_name: &str, bytes: &[u8]) -> Result<SourceImage> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| ExtractError::decode(file_name, e))?;

        log::debug!(
            "Decoded {} ({}x{}, {:?})",
            file_name,
            decoded.width(),
            decoded.height(),
            decoded.color()
        );

        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
        let png = encode_png(&rgb)?;

        // Hand out what the canonical bytes decode to, not the in-memory copy
        let canonical = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
            .map_err(|e| ExtractError::decode(file_name, e))?
            .to_rgb8();

        Ok(SourceImage {
            file_name: file_name.to_string(),
            image: canonical,
            png,
        })
    }
}
