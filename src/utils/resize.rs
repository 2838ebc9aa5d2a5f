//! Aspect-preserving resize to a display width

use crate::error::{ExtractError, Result};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Resampling filter for display images (bicubic)
pub const DISPLAY_FILTER: FilterType = FilterType::CatmullRom;

/// Proportional image scaling
pub struct ImageResizer;

impl ImageResizer {
    /// Height for a target width, truncated after a floating-point multiply
    ///
    /// The ratio is computed first and then applied to the height, so results
    /// match `floor(height * (target / width))` bit for bit.
    ///
    /// # Errors
    /// - Target width or source width of zero
    pub fn scaled_height(width: u32, height: u32, target_width: u32) -> Result<u32> {
        if target_width == 0 {
            return Err(ExtractError::config_value_error(
                "target width",
                target_width,
                "1+",
                None,
            ));
        }
        if width == 0 {
            return Err(ExtractError::processing_stage_error(
                "resize",
                "source image has zero width",
                Some(&format!("{}x{}", width, height)),
            ));
        }

        let ratio = f64::from(target_width) / f64::from(width);
        let scaled = (f64::from(height) * ratio) as u32;

        // Extreme panoramas can truncate to zero rows
        Ok(scaled.max(1))
    }

    /// Resize to `target_width`, keeping the aspect ratio
    ///
    /// # Examples
    /// ```rust
    /// use bg_extract::utils::ImageResizer;
    /// use image::DynamicImage;
    ///
    /// let image = DynamicImage::new_rgb8(300, 200);
    /// let resized = ImageResizer::resize_to_width(&image, 600).unwrap();
    /// assert_eq!((resized.width(), resized.height()), (600, 400));
    /// ```
    pub fn resize_to_width(image: &DynamicImage, target_width: u32) -> Result<DynamicImage> {
        let (width, height) = image.dimensions();
        let target_height = Self::scaled_height(width, height, target_width)?;
        Ok(Self::resize_exact(image, target_width, target_height))
    }

    /// Resize to exact dimensions, ignoring aspect ratio
    ///
    /// Used to force the masked display image onto the original's size before
    /// blending.
    #[must_use]
    pub fn resize_exact(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        if image.dimensions() == (width, height) {
            return image.clone();
        }
        image.resize_exact(width, height, DISPLAY_FILTER)
    }
}
