//! Drawing-to-tensor preprocessing.
//!
//! [`DigitPreprocessor`] chains the three stages a digit model expects:
//!
//! 1. collapse each pixel to one intensity ([`extract_channel`]),
//! 2. bilinear resample to the model's input size ([`resize_bilinear`]),
//! 3. divide by 255 and optionally invert ([`NormalizeImage`]),
//!
//! and wraps the result as a `[1, h, w, 1]` [`NormalizedTensor`]. All
//! intermediate buffers are owned locally and dropped on every return path.

use tracing::debug;

use crate::core::config::{ConfigValidator, PreprocessConfig};
use crate::core::constants::DEFAULT_TARGET_SIZE;
use crate::core::errors::DigitResult;
use crate::domain::{NormalizedTensor, RawImage};
use crate::processors::channel::extract_channel;
use crate::processors::normalization::NormalizeImage;
use crate::processors::resize::resize_bilinear;
use crate::processors::types::{ChannelReduction, Polarity, SamplingGrid};

/// Converts raw drawings into normalized model input.
#[derive(Debug, Clone)]
pub struct DigitPreprocessor {
    target_size: (u32, u32),
    channel: ChannelReduction,
    sampling: SamplingGrid,
    normalize: NormalizeImage,
}

impl DigitPreprocessor {
    /// Creates a preprocessor producing `target_size` (height, width) tensors
    /// with the default channel rule, sampling grid and polarity.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either target dimension is zero.
    pub fn new(target_size: (u32, u32)) -> DigitResult<Self> {
        Self::from_config(&PreprocessConfig {
            target_size,
            ..PreprocessConfig::default()
        })
    }

    /// Creates a preprocessor from a validated configuration.
    pub fn from_config(config: &PreprocessConfig) -> DigitResult<Self> {
        config.validate()?;
        Ok(Self {
            target_size: config.target_size,
            channel: config.channel,
            sampling: config.sampling,
            normalize: NormalizeImage::for_digits(config.polarity),
        })
    }

    /// Target size as (height, width).
    pub fn target_size(&self) -> (u32, u32) {
        self.target_size
    }

    pub fn channel(&self) -> ChannelReduction {
        self.channel
    }

    pub fn sampling(&self) -> SamplingGrid {
        self.sampling
    }

    pub fn polarity(&self) -> Polarity {
        self.normalize.polarity
    }

    /// Converts a snapshot into a `[1, target_h, target_w, 1]` tensor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if the snapshot has zero area.
    pub fn preprocess(&self, image: &RawImage) -> DigitResult<NormalizedTensor> {
        let (out_h, out_w) = (self.target_size.0 as usize, self.target_size.1 as usize);
        let (in_h, in_w) = (image.height() as usize, image.width() as usize);

        let plane = extract_channel(image, self.channel)?;
        let mut resized = resize_bilinear(&plane, in_h, in_w, out_h, out_w, self.sampling)?;
        drop(plane);
        self.normalize.apply(&mut resized);

        debug!(
            "Preprocessed {}x{}x{} drawing into [1, {}, {}, 1] tensor",
            in_w,
            in_h,
            image.channels(),
            out_h,
            out_w
        );

        NormalizedTensor::from_plane(out_h, out_w, resized)
    }
}

impl Default for DigitPreprocessor {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            channel: ChannelReduction::default(),
            sampling: SamplingGrid::default(),
            normalize: NormalizeImage::default(),
        }
    }
}

/// Converts a snapshot into a `[1, h, w, 1]` tensor using the default rules.
///
/// `target_size` is (height, width). See [`DigitPreprocessor`] for the
/// configurable variant.
pub fn preprocess(image: &RawImage, target_size: (u32, u32)) -> DigitResult<NormalizedTensor> {
    DigitPreprocessor::new(target_size)?.preprocess(image)
}
