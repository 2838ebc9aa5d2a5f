//! Alpha channel post-processing of removal service output

use image::RgbaImage;

/// Turns a transparent-background cut-out into an opaque silhouette
pub struct AlphaPostProcessor;

impl AlphaPostProcessor {
    /// Blacken fully transparent pixels, then make every pixel opaque
    ///
    /// Only pixels with alpha exactly 0 are blackened. Partially transparent
    /// edge pixels keep their color so the anti-aliased fringe survives.
    ///
    /// ```rust
    /// use bg_extract::utils::AlphaPostProcessor;
    /// use image::{Rgba, RgbaImage};
    ///
    /// let mut cutout = RgbaImage::from_pixel(2, 1, Rgba([200, 100, 50, 0]));
    /// cutout.put_pixel(1, 0, Rgba([200, 100, 50, 128]));
    ///
    /// let flattened = AlphaPostProcessor::flatten(cutout);
    /// assert_eq!(flattened.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    /// assert_eq!(flattened.get_pixel(1, 0), &Rgba([200, 100, 50, 255]));
    /// ```
    #[must_use]
    pub fn flatten(mut image: RgbaImage) -> RgbaImage {
        for pixel in image.pixels_mut() {
            if pixel[3] == 0 {
                pixel[0] = 0;
                pixel[1] = 0;
                pixel[2] = 0;
            }
            pixel[3] = u8::MAX;
        }
        image
    }

    /// Number of fully transparent pixels, logged before flattening
    #[must_use]
    pub fn transparent_pixel_count(image: &RgbaImage) -> usize {
        image.pixels().filter(|p| p[3] == 0).count()
    }
}
