use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::buffer::{PixelBuffer, sample_len};
use crate::error::CoreError;
use crate::params::sanitize_scale;

/// Raw output of a rasterizer, not yet checked against what was requested.
#[derive(Debug, Clone)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u8>,
}

/// Draws a source buffer into a target resolution.
///
/// The resampling kernel is entirely up to the implementation; the
/// [`Sampler`] only checks that the output has the requested shape.
pub trait Rasterizer {
    fn name(&self) -> &str;
    fn rasterize(&self, source: &PixelBuffer, width: u32, height: u32) -> Raster;
}

/// Rasterizer backed by `image::imageops::resize`.
pub struct ImageRasterizer {
    pub filter: FilterType,
}

impl Default for ImageRasterizer {
    fn default() -> Self {
        // Bilinear, what a 2D canvas does when drawing a scaled image.
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl Rasterizer for ImageRasterizer {
    fn name(&self) -> &str {
        "image"
    }

    fn rasterize(&self, source: &PixelBuffer, width: u32, height: u32) -> Raster {
        let Some(src) = RgbaImage::from_raw(source.width(), source.height(), source.samples().to_vec())
        else {
            return Raster {
                width: 0,
                height: 0,
                samples: Vec::new(),
            };
        };
        let out = imageops::resize(&src, width, height, self.filter);
        let (width, height) = out.dimensions();
        Raster {
            width,
            height,
            samples: out.into_raw(),
        }
    }
}

/// Rescales buffers by a factor using a [`Rasterizer`].
pub struct Sampler<R = ImageRasterizer> {
    rasterizer: R,
}

impl Default for Sampler<ImageRasterizer> {
    fn default() -> Self {
        Self::new(ImageRasterizer::default())
    }
}

impl<R: Rasterizer> Sampler<R> {
    pub fn new(rasterizer: R) -> Self {
        Self { rasterizer }
    }

    /// Resample `source` by `scale` (sanitized into `[0.01, 1.0]`).
    ///
    /// Target dimensions are `round(dim * scale)`, never below 1. A scale of
    /// exactly 1.0, or a zero-area source, hands the source back untouched.
    pub fn resample(&self, source: PixelBuffer, scale: f64) -> Result<PixelBuffer, CoreError> {
        Ok(self.scaled(&source, scale)?.unwrap_or(source))
    }

    /// Borrowing form of [`Sampler::resample`]: `None` when the source
    /// would come back unchanged.
    pub fn scaled(&self, source: &PixelBuffer, scale: f64) -> Result<Option<PixelBuffer>, CoreError> {
        let scale = sanitize_scale(Some(scale));
        if scale == 1.0 || source.is_empty() {
            return Ok(None);
        }

        let (width, height) = target_dimensions(source.width(), source.height(), scale);
        debug!(
            rasterizer = self.rasterizer.name(),
            from_w = source.width(),
            from_h = source.height(),
            width,
            height,
            "resampling"
        );

        let raster = self.rasterizer.rasterize(source, width, height);
        if raster.width != width
            || raster.height != height
            || raster.samples.len() != sample_len(width, height)
        {
            return Err(CoreError::Dimension {
                expected_w: width,
                expected_h: height,
                actual_w: raster.width,
                actual_h: raster.height,
                actual_len: raster.samples.len(),
            });
        }
        PixelBuffer::new(width, height, raster.samples).map(Some)
    }
}

/// `round(width * scale)` x `round(height * scale)`, each at least 1.
pub fn target_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scaled = |d: u32| ((d as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a buffer one pixel too narrow.
    struct ShortRasterizer;

    impl Rasterizer for ShortRasterizer {
        fn name(&self) -> &str {
            "short"
        }

        fn rasterize(&self, _source: &PixelBuffer, width: u32, height: u32) -> Raster {
            let width = width - 1;
            Raster {
                width,
                height,
                samples: vec![0; sample_len(width, height)],
            }
        }
    }

    /// Claims the right dimensions but truncates the samples.
    struct TruncatingRasterizer;

    impl Rasterizer for TruncatingRasterizer {
        fn name(&self) -> &str {
            "truncating"
        }

        fn rasterize(&self, _source: &PixelBuffer, width: u32, height: u32) -> Raster {
            Raster {
                width,
                height,
                samples: vec![0; 3],
            }
        }
    }

    // -- target dimensions --

    #[test]
    fn half_scale_halves_dimensions() {
        assert_eq!(target_dimensions(4, 4, 0.5), (2, 2));
        assert_eq!(target_dimensions(160, 120, 0.5), (80, 60));
    }

    #[test]
    fn dimensions_round_to_nearest() {
        assert_eq!(target_dimensions(5, 3, 0.5), (3, 2));
        assert_eq!(target_dimensions(10, 10, 0.33), (3, 3));
    }

    #[test]
    fn dimensions_never_reach_zero() {
        assert_eq!(target_dimensions(4, 4, 0.01), (1, 1));
        assert_eq!(target_dimensions(1000, 1, 0.01), (10, 1));
    }

    // -- resample --

    #[test]
    fn half_scale_on_4x4_yields_2x2() {
        let src = PixelBuffer::filled(4, 4, [200, 100, 50, 255]);
        let out = Sampler::default().resample(src, 0.5).unwrap();
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(out.samples().len(), 16);
    }

    #[test]
    fn uniform_colour_survives_resampling() {
        let src = PixelBuffer::filled(8, 6, [12, 34, 56, 255]);
        let out = Sampler::default().resample(src, 0.25).unwrap();
        assert_eq!(out, PixelBuffer::filled(2, 2, [12, 34, 56, 255]));
    }

    #[test]
    fn unit_scale_is_passthrough() {
        let src = PixelBuffer::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let out = Sampler::new(ShortRasterizer).resample(src.clone(), 1.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn scaled_borrows_and_skips_unit_scale() {
        let src = PixelBuffer::filled(4, 4, [9, 9, 9, 255]);
        let sampler = Sampler::default();
        assert_eq!(sampler.scaled(&src, 1.0).unwrap(), None);
        let out = sampler.scaled(&src, 0.5).unwrap().unwrap();
        assert_eq!(out, PixelBuffer::filled(2, 2, [9, 9, 9, 255]));
        assert_eq!(src.dimensions(), (4, 4));
    }

    #[test]
    fn out_of_range_scale_is_clamped() {
        let src = PixelBuffer::filled(4, 4, [0, 0, 0, 255]);
        let out = Sampler::default().resample(src, 3.0).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
    }

    #[test]
    fn wrong_dimensions_from_rasterizer_fail() {
        let src = PixelBuffer::filled(4, 4, [0, 0, 0, 255]);
        let err = Sampler::new(ShortRasterizer).resample(src, 0.5).unwrap_err();
        assert_eq!(
            err,
            CoreError::Dimension {
                expected_w: 2,
                expected_h: 2,
                actual_w: 1,
                actual_h: 2,
                actual_len: 8,
            }
        );
    }

    #[test]
    fn wrong_sample_count_from_rasterizer_fails() {
        let src = PixelBuffer::filled(4, 4, [0, 0, 0, 255]);
        let err = Sampler::new(TruncatingRasterizer)
            .resample(src, 0.5)
            .unwrap_err();
        assert!(matches!(err, CoreError::Dimension { actual_len: 3, .. }));
    }
}
