//! Configuration management for the digit pipeline.
//!
//! This module provides the configuration types and the validation trait they
//! share.

pub mod errors;
pub mod pipeline;

pub use errors::{ConfigError, ConfigValidator};
pub use pipeline::{ModelConfig, OutputActivation, PipelineConfig, PreprocessConfig, RankerConfig};
