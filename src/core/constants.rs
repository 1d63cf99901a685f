//! Constants used throughout the digit pipeline.
//!
//! This module defines the default values the pipeline falls back to when a
//! configuration leaves them unset.

/// The native maximum of an 8-bit pixel sample.
///
/// Samples are divided by this value during normalization.
pub const PIXEL_MAX: f32 = 255.0;

/// The default model input size as (height, width).
///
/// Digit classifiers trained on MNIST-style data expect 28x28 inputs.
pub const DEFAULT_TARGET_SIZE: (u32, u32) = (28, 28);

/// The default number of ranked results returned per prediction.
pub const DEFAULT_TOPK: usize = 3;

/// The number of digit classes (0 through 9).
pub const DIGIT_CLASS_COUNT: usize = 10;

/// The default input tensor name used when a model does not expose one.
pub const DEFAULT_INPUT_NAME: &str = "input";

/// Returns the class labels for digit classification, "0" through "9".
pub fn get_digit_labels() -> Vec<String> {
    (0..DIGIT_CLASS_COUNT).map(|d| d.to_string()).collect()
}
