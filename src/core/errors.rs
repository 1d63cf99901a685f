//! Error types for the digit recognition pipeline.
//!
//! This module defines the errors that can occur while turning a drawing into a
//! ranked prediction: invalid captures, model readiness and inference failures,
//! ranking contract violations, and configuration errors. It also provides
//! utility functions for creating these errors with appropriate context.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::config::ConfigError;

/// Enum representing different stages of processing in the pipeline.
///
/// This enum is used to identify which stage of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred during tensor operations.
    TensorOperation,
    /// A request tried to skip or repeat a lifecycle state.
    StateTransition,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::StateTransition => write!(f, "state transition"),
        }
    }
}

/// Why a capture could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFault {
    /// Nothing to recognize: zero area, or a blank drawing when blank
    /// canvases are rejected.
    Empty,
    /// The pixel data does not describe a valid image.
    Malformed,
}

/// Errors that can occur in the digit recognition pipeline.
#[derive(Error, Debug)]
pub enum DigitError {
    /// The model has not finished loading. Retry later.
    #[error("model is not ready")]
    ModelNotReady,

    /// The captured image is unusable (zero area or malformed pixel data).
    #[error("invalid image: {message}")]
    InvalidImage {
        /// A message describing what is wrong with the image.
        message: String,
        /// Whether the capture was empty or malformed.
        fault: ImageFault,
    },

    /// The model failed while running inference.
    #[error("model '{model_name}' failed: {message}")]
    Model {
        /// Name of the model that failed.
        model_name: String,
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The model did not answer before the configured deadline.
    #[error("model '{model_name}' did not respond within {timeout:?}")]
    ModelTimeout {
        /// Name of the model that stalled.
        model_name: String,
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// The model weights could not be loaded.
    #[error("failed to load model from {path}: {message}")]
    ModelLoad {
        /// Path of the model file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The ranker was given an empty score vector.
    #[error("cannot rank an empty score vector")]
    EmptyScores,

    /// The ranker was asked for zero results.
    #[error("k must be greater than 0, got {k}")]
    InvalidK {
        /// The rejected value of k.
        k: usize,
    },

    /// The ranker was given a NaN or infinite score.
    #[error("score at index {index} is not finite: {value}")]
    NonFiniteScore {
        /// Index of the offending score.
        index: usize,
        /// The offending value.
        value: f32,
    },

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating a configuration problem.
    #[error("configuration")]
    Config(#[from] ConfigError),

    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for pipeline operations.
pub type DigitResult<T> = Result<T, DigitError>;

impl DigitError {
    /// Creates an error for malformed pixel data.
    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
            fault: ImageFault::Malformed,
        }
    }

    /// Creates an error for a capture with nothing to recognize.
    pub fn empty_image(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
            fault: ImageFault::Empty,
        }
    }

    /// Creates a model failure without an underlying cause.
    pub fn model_error(model_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Model {
            model_name: model_name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a model failure wrapping the error that caused it.
    pub fn inference_error(
        model_name: impl Into<String>,
        message: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Model {
            model_name: model_name.into(),
            message: message.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates an error for a model file that could not be loaded.
    pub fn model_load_error(path: &Path, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(ConfigError::InvalidConfig {
            message: message.into(),
        })
    }

    /// Creates an error for a failed processing stage.
    pub fn processing_error(
        kind: ProcessingStage,
        context: &str,
        error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: error.into(),
        }
    }

    /// Creates an error for a failed tensor operation.
    pub fn tensor_operation(
        context: &str,
        error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::processing_error(ProcessingStage::TensorOperation, context, error)
    }

    /// Returns true for failures a user can recover from by trying again
    /// (possibly after re-capturing or waiting for the model).
    pub fn is_recoverable(&self) -> bool {
        !self.is_contract_violation() && !matches!(self, Self::Config(_))
    }

    /// Returns true for ranking contract violations, which indicate a bug in
    /// the caller rather than a bad drawing.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::EmptyScores | Self::InvalidK { .. } | Self::NonFiniteScore { .. }
        )
    }
}

impl From<image::ImageError> for DigitError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}
