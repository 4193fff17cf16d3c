use image::RgbaImage;

use crate::error::CoreError;

/// Number of samples per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

pub const CHANNEL_R: usize = 0;
pub const CHANNEL_G: usize = 1;
pub const CHANNEL_B: usize = 2;
pub const CHANNEL_A: usize = 3;

/// An owned, immutable grid of RGBA8 samples.
///
/// `samples.len() == width * height * 4` holds for every value of this type;
/// the only way in is through a checked constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, CoreError> {
        let expected = sample_len(width, height);
        if samples.len() != expected {
            return Err(CoreError::InvalidBuffer {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// A buffer where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        let samples = rgba.repeat(pixels);
        Self {
            width,
            height,
            samples,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// RGBA quadruple at `(x, y)`, or `None` outside the grid.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * CHANNELS;
        let p = &self.samples[i..i + CHANNELS];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Iterate pixels in row-major order as 4-byte slices.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.samples.chunks_exact(CHANNELS)
    }
}

pub(crate) fn sample_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * CHANNELS
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            samples: img.into_raw(),
        }
    }
}

impl TryFrom<PixelBuffer> for RgbaImage {
    type Error = CoreError;

    fn try_from(buf: PixelBuffer) -> Result<Self, Self::Error> {
        let (width, height) = buf.dimensions();
        let actual = buf.samples.len();
        RgbaImage::from_raw(width, height, buf.samples).ok_or(CoreError::InvalidBuffer {
            width,
            height,
            expected: sample_len(width, height),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn new_rejects_wrong_length() {
        let err = PixelBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidBuffer {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15,
            }
        );
    }

    #[test]
    fn new_accepts_exact_length() {
        let buf = PixelBuffer::new(3, 1, vec![7; 12]).unwrap();
        assert_eq!(buf.dimensions(), (3, 1));
        assert_eq!(buf.pixel_count(), 3);
    }

    #[test]
    fn zero_area_buffer_is_empty() {
        let buf = PixelBuffer::new(0, 5, Vec::new()).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.pixel_count(), 0);
    }

    #[test]
    fn pixel_lookup_is_row_major() {
        let samples = (0u8..16).collect();
        let buf = PixelBuffer::new(2, 2, samples).unwrap();
        assert_eq!(buf.pixel(1, 0), Some([4, 5, 6, 7]));
        assert_eq!(buf.pixel(0, 1), Some([8, 9, 10, 11]));
        assert_eq!(buf.pixel(2, 0), None);
    }

    #[test]
    fn rgba_image_conversion_keeps_samples() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
        let buf = PixelBuffer::from(img);
        assert_eq!(buf, PixelBuffer::filled(3, 2, [10, 20, 30, 40]));

        let back = RgbaImage::try_from(buf).unwrap();
        assert_eq!(back.get_pixel(2, 1), &Rgba([10, 20, 30, 40]));
    }
}
