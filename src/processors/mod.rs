//! Image and score processing for digit recognition.
//!
//! # Modules
//!
//! * `channel` - Collapsing pixels to a single intensity
//! * `resize` - Bilinear resampling of single-channel planes
//! * `normalization` - Scaling intensities into `[0, 1]`
//! * `preprocess` - The full drawing-to-tensor chain
//! * `utils` - Top-k ranking of model scores
//! * `types` - Type definitions used across the processors module

pub mod channel;
pub mod normalization;
pub mod preprocess;
pub mod resize;
pub mod types;
pub mod utils;

pub use channel::extract_channel;
pub use normalization::NormalizeImage;
pub use preprocess::{DigitPreprocessor, preprocess};
pub use resize::resize_bilinear;
pub use types::*;
pub use utils::{Topk, rank};
