//! Model input and output containers.

use ndarray::{Array4, ArrayView4};
use serde::{Deserialize, Serialize};

use crate::core::errors::{DigitError, DigitResult};

/// Type alias for 4D tensors (batch, height, width, channels).
pub type Tensor4D = Array4<f32>;

/// A batch-wrapped single-channel image of shape `[1, height, width, 1]`.
///
/// Values lie in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Tensor4D,
}

impl NormalizedTensor {
    /// Wraps an NHWC array after checking its shape and value range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` if the batch or channel dimension is not 1, if
    /// height or width is 0, or if any value lies outside `[0, 1]`.
    pub fn from_array(data: Tensor4D) -> DigitResult<Self> {
        let shape = data.shape();
        if shape[0] != 1 || shape[3] != 1 {
            return Err(DigitError::invalid_image(format!(
                "expected tensor shape [1, h, w, 1], got {:?}",
                shape
            )));
        }
        if shape[1] == 0 || shape[2] == 0 {
            return Err(DigitError::empty_image(format!(
                "tensor has zero area: {:?}",
                shape
            )));
        }
        if let Some(v) = data.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(DigitError::invalid_image(format!(
                "tensor value {v} outside [0, 1]"
            )));
        }
        Ok(Self { data })
    }

    /// Builds a `[1, height, width, 1]` tensor from row-major values the
    /// preprocessor has already clamped to `[0, 1]`.
    pub(crate) fn from_plane(height: usize, width: usize, values: Vec<f32>) -> DigitResult<Self> {
        let data = Array4::from_shape_vec((1, height, width, 1), values)?;
        Ok(Self { data })
    }

    /// Shape as `[batch, height, width, channels]`.
    pub fn shape(&self) -> [usize; 4] {
        let s = self.data.shape();
        [s[0], s[1], s[2], s[3]]
    }

    /// Spatial height.
    pub fn height(&self) -> usize {
        self.data.shape()[1]
    }

    /// Spatial width.
    pub fn width(&self) -> usize {
        self.data.shape()[2]
    }

    /// Value at row `y`, column `x`.
    pub fn get(&self, y: usize, x: usize) -> Option<f32> {
        self.data.get([0, y, x, 0]).copied()
    }

    /// Borrowed NHWC view, suitable for handing to an inference session.
    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    /// All values in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied()
    }

    /// True when every value is exactly zero (an untouched dark canvas).
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }
}

/// Per-class scores from one inference call; index `i` is the score of class `i`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionVector {
    scores: Vec<f32>,
}

impl PredictionVector {
    /// Wraps raw model scores. Validation happens when the vector is ranked.
    pub fn new(scores: Vec<f32>) -> Self {
        Self { scores }
    }

    /// The scores in class order.
    pub fn as_slice(&self) -> &[f32] {
        &self.scores
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True when the model produced no scores.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Score of class `index`, if present.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.scores.get(index).copied()
    }

    /// Consumes the wrapper and returns the raw scores.
    pub fn into_inner(self) -> Vec<f32> {
        self.scores
    }
}

impl From<Vec<f32>> for PredictionVector {
    fn from(scores: Vec<f32>) -> Self {
        Self::new(scores)
    }
}

impl From<&[f32]> for PredictionVector {
    fn from(scores: &[f32]) -> Self {
        Self::new(scores.to_vec())
    }
}
