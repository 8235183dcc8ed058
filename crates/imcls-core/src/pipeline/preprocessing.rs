//! Image preprocessing for the classifiers.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;
use tracing::debug;

use crate::error::{ClassifyError, Result};
use crate::models::config::ResampleFilter;

/// Pixel bytes are centered on this value and scaled by it, mapping
/// 0..=255 onto -1.0..=1.0.
const NORMALIZATION_OFFSET: f32 = 127.5;

/// Turns a decoded image into the NHWC tensor the Keras classifiers expect.
#[derive(Debug, Clone, Copy)]
pub struct ImagePreprocessor {
    filter: FilterType,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with bilinear resampling.
    pub fn new() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }

    /// Set the resampling filter.
    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter.into();
        self
    }

    /// Stretch the image to `size` x `size` RGB and normalize it into a
    /// `[1, size, size, 3]` tensor.
    pub fn preprocess(&self, image: &DynamicImage, size: u32) -> Result<Array4<f32>> {
        if size == 0 {
            return Err(ClassifyError::InvalidInput("target size must be positive".to_string()));
        }

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ClassifyError::InvalidInput(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }
        debug!("Original image size: {}x{}, target {}x{}", width, height, size, size);

        // Aspect ratio is not preserved
        let rgb = image.resize_exact(size, size, self.filter).to_rgb8();

        let side = size as usize;
        let tensor = Array4::from_shape_fn((1, side, side, 3), |(_, y, x, c)| {
            normalize_channel(rgb.get_pixel(x as u32, y as u32)[c])
        });

        Ok(tensor)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a channel byte onto [-1, 1].
pub fn normalize_channel(value: u8) -> f32 {
    (value as f32 - NORMALIZATION_OFFSET) / NORMALIZATION_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_channel_bounds() {
        assert_eq!(normalize_channel(0), -1.0);
        assert_eq!(normalize_channel(255), 1.0);
        assert!(normalize_channel(127).abs() < 0.01);
        assert!(normalize_channel(128).abs() < 0.01);
    }

    #[test]
    fn test_output_shape_for_each_geometry() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([1, 2, 3])));
        let preprocessor = ImagePreprocessor::new();

        for size in [224u32, 299] {
            let tensor = preprocessor.preprocess(&image, size).unwrap();
            let side = size as usize;
            assert_eq!(tensor.shape(), &[1, side, side, 3]);
        }
    }

    #[test]
    fn test_values_in_range() {
        let mut img = RgbImage::new(31, 17);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 8) as u8, (y * 15) as u8, ((x + y) * 5) as u8]);
        }
        let tensor = ImagePreprocessor::new()
            .with_filter(ResampleFilter::Lanczos3)
            .preprocess(&DynamicImage::ImageRgb8(img), 64)
            .unwrap();

        assert!(tensor.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_channel_order_is_rgb() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([255, 0, 255])));
        let tensor = ImagePreprocessor::new()
            .with_filter(ResampleFilter::Nearest)
            .preprocess(&image, 4)
            .unwrap();

        assert_eq!(tensor[[0, 2, 3, 0]], 1.0);
        assert_eq!(tensor[[0, 2, 3, 1]], -1.0);
        assert_eq!(tensor[[0, 2, 3, 2]], 1.0);
    }

    #[test]
    fn test_alpha_is_dropped() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(5, 5, Rgba([0, 0, 0, 0])));
        let tensor = ImagePreprocessor::new().preprocess(&image, 5).unwrap();

        assert_eq!(tensor.shape(), &[1, 5, 5, 3]);
        assert!(tensor.iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_zero_size_is_invalid() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        assert!(matches!(
            ImagePreprocessor::new().preprocess(&image, 0),
            Err(ClassifyError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_image_is_invalid() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            ImagePreprocessor::new().preprocess(&image, 224),
            Err(ClassifyError::InvalidInput(_))
        ));
    }
}
