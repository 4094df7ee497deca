//! Image preprocessing for OCR.
//!
//! Pages go through a fixed chain before recognition:
//! grayscale -> bilateral denoise -> min/max normalization -> adaptive threshold.
//! Each step assumes the previous one ran; the output is a binary image
//! (0 or 255) with the same dimensions as the input.

use image::{GrayImage, Luma, RgbImage};
use imageproc::filter::{bilateral_filter, gaussian_blur_f32};
use tracing::debug;

use crate::models::config::PreprocessConfig;

/// Image preprocessor for the OCR pipeline.
pub struct ImagePreprocessor {
    config: PreprocessConfig,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self::with_config(PreprocessConfig::default())
    }

    /// Create a preprocessor from configuration.
    pub fn with_config(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Run the full chain on one page.
    pub fn process(&self, image: &RgbImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let gray = image::imageops::grayscale(image);

        if !self.config.enabled || width == 0 || height == 0 {
            return gray;
        }

        let denoised = self.bilateral_filter(&gray);
        let normalized = normalize(&denoised);
        let binary = self.adaptive_threshold(&normalized);

        debug!("Preprocessed page {}x{}", width, height);
        binary
    }

    /// Edge-preserving smoothing, weighted by spatial distance and by
    /// intensity difference.
    pub fn bilateral_filter(&self, image: &GrayImage) -> GrayImage {
        bilateral_filter(
            image,
            self.config.bilateral_diameter.max(1),
            self.config.bilateral_sigma_color.max(f32::EPSILON),
            self.config.bilateral_sigma_space.max(f32::EPSILON),
        )
    }

    /// Binarize against a Gaussian-weighted local mean.
    pub fn adaptive_threshold(&self, image: &GrayImage) -> GrayImage {
        let block = block_size(self.config.threshold_block_size);
        let sigma = 0.3 * ((block as f32 - 1.0) * 0.5 - 1.0) + 0.8;
        let local_mean = gaussian_blur_f32(image, sigma);
        let c = self.config.threshold_c;

        let (width, height) = image.dimensions();
        let mut result = GrayImage::new(width, height);

        for (x, y, pixel) in image.enumerate_pixels() {
            let threshold = local_mean.get_pixel(x, y)[0] as i32 - c;
            let output = if pixel[0] as i32 > threshold { 255 } else { 0 };
            result.put_pixel(x, y, Luma([output]));
        }

        result
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Stretch intensities to the full 0..=255 range.
pub fn normalize(image: &GrayImage) -> GrayImage {
    let (min, max) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max <= min {
        return image.clone();
    }

    let range = (max - min) as f32;
    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        let stretched = (pixel[0] - min) as f32 * 255.0 / range;
        pixel[0] = stretched.round() as u8;
    }
    result
}

/// Odd block size, at least 3.
fn block_size(requested: u32) -> u32 {
    let block = requested.max(3);
    if block % 2 == 0 { block + 1 } else { block }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use pretty_assertions::assert_eq;

    fn receipt_like(width: u32, height: u32) -> RgbImage {
        // Light paper with a dark horizontal stroke in the middle
        RgbImage::from_fn(width, height, |_, y| {
            if y >= height / 2 - 2 && y <= height / 2 + 2 {
                Rgb([30, 30, 30])
            } else {
                Rgb([200, 195, 190])
            }
        })
    }

    #[test]
    fn test_output_is_binary_same_size() {
        let image = receipt_like(64, 40);
        let out = ImagePreprocessor::new().process(&image);

        assert_eq!(out.dimensions(), (64, 40));
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_stroke_is_black_paper_is_white() {
        let image = receipt_like(64, 40);
        let out = ImagePreprocessor::new().process(&image);

        assert_eq!(out.get_pixel(32, 20)[0], 0);
        assert_eq!(out.get_pixel(32, 2)[0], 255);
    }

    #[test]
    fn test_normalize_stretches_range() {
        let image = GrayImage::from_fn(4, 1, |x, _| Luma([100 + x as u8 * 10]));
        let out = normalize(&image);

        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(3, 0)[0], 255);
    }

    #[test]
    fn test_normalize_flat_image_unchanged() {
        let image = GrayImage::from_pixel(3, 3, Luma([77]));
        assert_eq!(normalize(&image), image);
    }

    #[test]
    fn test_bilateral_keeps_edges() {
        let image = GrayImage::from_fn(20, 20, |x, _| if x < 10 { Luma([0]) } else { Luma([255]) });
        let out = ImagePreprocessor::new().bilateral_filter(&image);

        assert!(out.get_pixel(8, 10)[0] < 20);
        assert!(out.get_pixel(11, 10)[0] > 235);
    }

    #[test]
    fn test_bilateral_flat_page_unchanged() {
        for value in [0, 128] {
            let image = GrayImage::from_pixel(6, 6, Luma([value]));
            assert_eq!(ImagePreprocessor::new().bilateral_filter(&image), image);
        }
    }

    #[test]
    fn test_disabled_is_grayscale_only() {
        let config = PreprocessConfig {
            enabled: false,
            ..PreprocessConfig::default()
        };
        let out = ImagePreprocessor::with_config(config).process(&receipt_like(8, 8));
        assert_eq!(out.get_pixel(0, 0)[0], image::imageops::grayscale(&receipt_like(8, 8)).get_pixel(0, 0)[0]);
    }

    #[test]
    fn test_block_size_is_odd() {
        assert_eq!(block_size(31), 31);
        assert_eq!(block_size(30), 31);
        assert_eq!(block_size(1), 3);
    }
}
