//! Domain-level structures shared across the digit pipeline.
//!
//! This module groups the data that flows between stages: the raw drawing
//! snapshot, the normalized model input, the raw model scores and the ranked
//! result handed to the display.

pub mod image;
pub mod ranked;
pub mod tensor;

pub use image::RawImage;
pub use ranked::{RankedEntry, RankedResult, format_percent};
pub use tensor::{NormalizedTensor, PredictionVector, Tensor4D};
