//! The core module of the digit pipeline.
//!
//! This module contains the fundamental components shared by the rest of the
//! crate:
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - Model backends
//! - Traits describing the pipeline's collaborators
//!
//! It also provides re-exports of commonly used types and functions for convenience.

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod traits;

pub use config::{
    ConfigError, ConfigValidator, ModelConfig, OutputActivation, PipelineConfig,
    PreprocessConfig, RankerConfig,
};
pub use constants::*;
pub use errors::{DigitError, DigitResult, ImageFault, ProcessingStage};
pub use inference::{InputLayout, LazyModel, ModelStatus, OrtInfer, load_session};
pub use traits::{CanvasSource, DigitModel, DisplaySink, DisplayUpdate};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
