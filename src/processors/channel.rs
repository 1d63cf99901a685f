//! Single-channel extraction.
//!
//! Collapses each pixel of a [`RawImage`] into one intensity in the native
//! `0..=255` range, following a fixed [`ChannelReduction`] rule.

use crate::core::errors::{DigitError, DigitResult};
use crate::domain::RawImage;
use crate::processors::types::ChannelReduction;

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Reduces `image` to a row-major plane of `width * height` intensities.
///
/// Gray and gray+alpha sources always use their gray sample. For RGB and RGBA
/// sources the alpha channel is never consulted.
///
/// # Errors
///
/// Returns `InvalidImage` if the image has zero area.
pub fn extract_channel(image: &RawImage, rule: ChannelReduction) -> DigitResult<Vec<f32>> {
    if image.is_empty() {
        return Err(DigitError::empty_image(format!(
            "image has zero area ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let channels = image.channels() as usize;
    let bytes = image.as_bytes();

    let plane = if channels < 3 {
        bytes.chunks_exact(channels).map(|px| px[0] as f32).collect()
    } else {
        match rule {
            ChannelReduction::Red => bytes.chunks_exact(channels).map(|px| px[0] as f32).collect(),
            ChannelReduction::Luminance => bytes
                .chunks_exact(channels)
                .map(|px| LUMA_R * px[0] as f32 + LUMA_G * px[1] as f32 + LUMA_B * px[2] as f32)
                .collect(),
            ChannelReduction::Average => bytes
                .chunks_exact(channels)
                .map(|px| (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0)
                .collect(),
        }
    };

    Ok(plane)
}
