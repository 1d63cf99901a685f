//! Intensity normalization for digit model input.
//!
//! This module maps resampled intensities from the native `0..=255` pixel range
//! into `[0, 1]`, optionally flipping polarity for models trained on dark
//! strokes over a light background.

use rayon::prelude::*;

use crate::core::constants::PIXEL_MAX;
use crate::processors::types::Polarity;

/// Slices shorter than this are normalized on the calling thread.
const PARALLEL_THRESHOLD: usize = 16 * 1024;

/// Normalizes intensities for model input.
///
/// Each value becomes `clamp(v / 255, 0, 1)`, then `1 - v` when the
/// polarity is inverted.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Whether the normalized value is flipped
    pub polarity: Polarity,
}

impl NormalizeImage {
    /// Creates the normalization the digit models expect, with the given polarity.
    pub fn for_digits(polarity: Polarity) -> Self {
        Self { polarity }
    }

    /// Normalizes a single sample.
    #[inline]
    pub fn normalize_value(&self, value: f32) -> f32 {
        let v = (value / PIXEL_MAX).clamp(0.0, 1.0);
        match self.polarity {
            Polarity::Preserve => v,
            Polarity::Inverted => 1.0 - v,
        }
    }

    /// Normalizes samples in place.
    pub fn apply(&self, values: &mut [f32]) {
        if values.len() >= PARALLEL_THRESHOLD {
            values
                .par_iter_mut()
                .for_each(|v| *v = self.normalize_value(*v));
        } else {
            values.iter_mut().for_each(|v| *v = self.normalize_value(*v));
        }
    }
}

impl Default for NormalizeImage {
    fn default() -> Self {
        Self::for_digits(Polarity::Preserve)
    }
}
