//! Configuration types for the digit pipeline.
//!
//! Every section derives serde and falls back to the defaults below when a
//! field is omitted, so a JSON file only needs to name what it changes:
//!
//! ```json
//! {
//!     "model": { "model_path": "models/mnist.onnx", "activation": "softmax" },
//!     "ranker": { "topk": 5 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigValidator};
use crate::core::constants::{DEFAULT_TARGET_SIZE, DEFAULT_TOPK};
use crate::processors::types::{ChannelReduction, Polarity, SamplingGrid};

/// Preprocessing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Model input size as (height, width).
    pub target_size: (u32, u32),
    /// How pixels are collapsed to one intensity.
    pub channel: ChannelReduction,
    /// Resampling grid used by the bilinear resize.
    pub sampling: SamplingGrid,
    /// Whether normalized values are inverted.
    pub polarity: Polarity,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            channel: ChannelReduction::default(),
            sampling: SamplingGrid::default(),
            polarity: Polarity::default(),
        }
    }
}

impl ConfigValidator for PreprocessConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let (height, width) = self.target_size;
        self.validate_image_dimensions(width, height)
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Ranking settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Number of ranked entries kept per prediction.
    pub topk: usize,
    /// Class names indexed by label. Digits "0".."9" when unset.
    pub class_names: Option<Vec<String>>,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            topk: DEFAULT_TOPK,
            class_names: None,
        }
    }
}

impl ConfigValidator for RankerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive_usize(self.topk, "topk")?;
        if matches!(&self.class_names, Some(names) if names.is_empty()) {
            return Err(ConfigError::InvalidConfig {
                message: "class_names must not be empty when set".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Post-processing applied to the raw model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    /// The model already emits probabilities.
    #[default]
    None,
    /// The model emits logits; softmax is applied before ranking.
    Softmax,
}

/// Model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Name used in logs and error messages.
    pub model_name: String,
    /// Input tensor name. Discovered from the model when unset.
    pub input_name: Option<String>,
    /// Output tensor name. The first output is used when unset.
    pub output_name: Option<String>,
    pub activation: OutputActivation,
    /// Per-call deadline in milliseconds. No deadline when unset.
    pub timeout_ms: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            model_name: "digit_classifier".to_string(),
            input_name: None,
            output_name: None,
            activation: OutputActivation::default(),
            timeout_ms: None,
        }
    }
}

impl ModelConfig {
    /// Creates a model configuration for the given file.
    pub fn new(model_path: impl AsRef<Path>) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Returns the per-call deadline, if any.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_ms.map(std::time::Duration::from_millis)
    }
}

impl ConfigValidator for ModelConfig {
    /// Checks the fields themselves. The model file is checked when it is loaded.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "model_name must not be empty".to_string(),
            });
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::InvalidConfig {
                message: "timeout_ms must be greater than 0, got 0".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub model: ModelConfig,
    pub preprocess: PreprocessConfig,
    pub ranker: RankerConfig,
    /// Answer all-zero drawings with an empty-canvas status instead of
    /// running the model.
    pub reject_blank_canvas: bool,
}

impl PipelineConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_json_str(&text)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

impl ConfigValidator for PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.preprocess.validate()?;
        self.ranker.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}
