//! User-facing status text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::{DigitError, ImageFault};
use crate::core::inference::ModelStatus;

/// A short message for the display when there is no ranked result to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusMessage {
    LoadingModel,
    ModelLoaded,
    ModelLoadFailed,
    ModelNotLoaded,
    Processing,
    CanvasCleared,
    EmptyCanvas,
    ModelTimedOut,
    Internal { message: String },
}

impl StatusMessage {
    /// Maps a failed request to the message the user should see.
    pub fn from_error(error: &DigitError) -> Self {
        match error {
            DigitError::ModelNotReady => Self::ModelNotLoaded,
            DigitError::InvalidImage {
                fault: ImageFault::Empty,
                ..
            } => Self::EmptyCanvas,
            DigitError::ModelTimeout { .. } => Self::ModelTimedOut,
            DigitError::ModelLoad { .. } => Self::ModelLoadFailed,
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }

    /// Maps a model's load state to the message shown while waiting for it.
    pub fn from_model_status(status: &ModelStatus) -> Self {
        match status {
            ModelStatus::Loading => Self::LoadingModel,
            ModelStatus::Ready => Self::ModelLoaded,
            ModelStatus::Failed(_) => Self::ModelLoadFailed,
        }
    }

    /// True for messages reporting a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ModelLoadFailed
                | Self::ModelNotLoaded
                | Self::EmptyCanvas
                | Self::ModelTimedOut
                | Self::Internal { .. }
        )
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadingModel => write!(f, "Loading model..."),
            Self::ModelLoaded => write!(f, "Model loaded. Draw a digit and press Predict."),
            Self::ModelLoadFailed => {
                write!(f, "Error loading model. Check the logs and the model path.")
            }
            Self::ModelNotLoaded => write!(f, "Model not loaded"),
            Self::Processing => write!(f, "Processing..."),
            Self::CanvasCleared => write!(f, "Canvas cleared"),
            Self::EmptyCanvas => write!(f, "Nothing to recognize: the canvas is empty"),
            Self::ModelTimedOut => write!(f, "The model did not answer in time. Try again."),
            Self::Internal { message } => write!(f, "Prediction failed: {message}"),
        }
    }
}
