//! Alpha-blended overlay of original and masked display images

use crate::config::validate_opacity;
use crate::error::{ExtractError, Result};
use image::{DynamicImage, RgbImage};

/// Linear blend of two equally sized images
pub struct OverlayCompositor;

impl OverlayCompositor {
    /// Blend `masked` over `original` at `opacity`
    ///
    /// Each channel becomes `a + opacity * (b - a)`, truncated to `u8`. The
    /// masked image's alpha channel is dropped before blending, so opacity 0.0
    /// returns the original and 1.0 returns the masked RGB projection.
    ///
    /// # Errors
    /// - Images with different dimensions
    /// - Opacity outside 0.0-1.0 (or NaN)
    pub fn blend(original: &RgbImage, masked: &DynamicImage, opacity: f32) -> Result<RgbImage> {
        validate_opacity(opacity)?;

        let masked_rgb = masked.to_rgb8();
        if original.dimensions() != masked_rgb.dimensions() {
            return Err(ExtractError::DimensionMismatch {
                expected: original.dimensions(),
                actual: masked_rgb.dimensions(),
            });
        }

        let (width, height) = original.dimensions();
        let mut out = RgbImage::new(width, height);
        for ((dst, a), b) in out
            .pixels_mut()
            .zip(original.pixels())
            .zip(masked_rgb.pixels())
        {
            for channel in 0..3 {
                dst[channel] = Self::mix(a[channel], b[channel], opacity);
            }
        }

        Ok(out)
    }

    #[inline]
    fn mix(a: u8, b: u8, opacity: f32) -> u8 {
        let a = f32::from(a);
        let value = a + opacity * (f32::from(b) - a);
        value.clamp(0.0, 255.0) as u8
    }
}
