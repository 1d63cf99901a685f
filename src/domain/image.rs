//! Raw drawing snapshots.
//!
//! A [`RawImage`] is an owned copy of the canvas at capture time. Later strokes
//! on the live canvas never reach a snapshot that is already being processed.

use image::{DynamicImage, GrayImage, RgbaImage};

use crate::core::errors::{DigitError, DigitResult};

/// An owned grid of 8-bit pixels with 1 to 4 interleaved channels.
///
/// Channel layouts: 1 = gray, 2 = gray + alpha, 3 = RGB, 4 = RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl RawImage {
    /// Creates a snapshot from interleaved pixel bytes.
    ///
    /// Zero-area images are accepted here; the preprocessor rejects them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if `channels` is not in `1..=4` or if `data`
    /// does not hold exactly `width * height * channels` bytes.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> DigitResult<Self> {
        if !(1..=4).contains(&channels) {
            return Err(DigitError::invalid_image(format!(
                "unsupported channel count {channels}, expected 1 to 4"
            )));
        }

        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(DigitError::invalid_image(format!(
                "pixel buffer holds {} bytes, expected {} for {}x{}x{}",
                data.len(),
                expected,
                width,
                height,
                channels
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Creates an image where every sample of every channel equals `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> DigitResult<Self> {
        let len = width as usize * height as usize * channels as usize;
        Self::new(width, height, channels, vec![value; len])
    }

    /// Creates a single-channel image from a grayscale buffer.
    pub fn from_gray(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            channels: 1,
            data: image.as_raw().clone(),
        }
    }

    /// Creates a four-channel image from an RGBA buffer.
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            channels: 4,
            data: image.as_raw().clone(),
        }
    }

    /// Copies any decoded image into a snapshot.
    ///
    /// 8-bit layouts are copied as-is; deeper or floating-point images are
    /// converted to RGBA8 first.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        let (width, height, channels, data) = match image {
            DynamicImage::ImageLuma8(buf) => (buf.width(), buf.height(), 1, buf.as_raw().clone()),
            DynamicImage::ImageLumaA8(buf) => {
                (buf.width(), buf.height(), 2, buf.as_raw().clone())
            }
            DynamicImage::ImageRgb8(buf) => (buf.width(), buf.height(), 3, buf.as_raw().clone()),
            DynamicImage::ImageRgba8(buf) => {
                (buf.width(), buf.height(), 4, buf.as_raw().clone())
            }
            other => {
                let rgba = other.to_rgba8();
                (rgba.width(), rgba.height(), 4, rgba.into_raw())
            }
        };

        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of interleaved channels per pixel.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// True when the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The interleaved pixel bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The channel samples of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        &self.data[start..start + c]
    }
}

impl From<&DynamicImage> for RawImage {
    fn from(image: &DynamicImage) -> Self {
        Self::from_dynamic(image)
    }
}

impl From<DynamicImage> for RawImage {
    fn from(image: DynamicImage) -> Self {
        Self::from_dynamic(&image)
    }
}
