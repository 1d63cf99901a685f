//! # OAR Digit
//!
//! A Rust library that recognizes a hand-drawn digit and returns a ranked
//! probability distribution over the classes 0 to 9, using ONNX models.
//!
//! ## Features
//!
//! - Exact, deterministic preprocessing from any 8-bit drawing to a
//!   `[1, 28, 28, 1]` tensor
//! - Configurable channel reduction, resampling grid and polarity
//! - Top-k ranking with stable tie-breaking and percentage formatting
//! - ONNX Runtime integration with background model loading
//! - Request sequencing so stale results are never displayed
//!
//! ## Modules
//!
//! * [`core`] - Configuration, errors, model backends and collaborator traits
//! * [`domain`] - Images, tensors, score vectors and ranked results
//! * [`pipeline`] - The request pipeline and its status messages
//! * [`processors`] - Preprocessing stages and the ranker
//! * [`utils`] - Image loading and canvas sources
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use oar_digit::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_json_str(
//!     r#"{ "model": { "model_path": "models/mnist.onnx", "activation": "softmax" } }"#,
//! )?;
//!
//! let model = Arc::new(LazyModel::load_onnx(&config.model)?);
//! model.wait();
//!
//! let pipeline = DigitPipeline::from_config(&config, Arc::clone(&model))?;
//! let canvas = ImageFileSource::new("drawing.png");
//! if let Some(result) = pipeline.predict(&canvas)?.into_result() {
//!     println!("{result}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Preprocessing and ranking on their own
//!
//! ```rust
//! use oar_digit::domain::{PredictionVector, RawImage};
//! use oar_digit::processors::{preprocess, rank};
//!
//! let drawing = RawImage::filled(280, 280, 4, 0).unwrap();
//! let tensor = preprocess(&drawing, (28, 28)).unwrap();
//! assert_eq!(tensor.shape(), [1, 28, 28, 1]);
//!
//! let scores = PredictionVector::from(vec![0.1, 0.05, 0.05, 0.6, 0.0, 0.0, 0.05, 0.05, 0.05, 0.05]);
//! let ranked = rank(&scores, 3).unwrap();
//! assert_eq!(ranked.labels(), vec![3, 0, 1]);
//! ```

// Core modules
pub mod core;
pub mod domain;

pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use oar_digit::prelude::*;
/// ```
///
/// Included items focus on the most common tasks:
/// - The pipeline and its outcomes (`DigitPipeline`, `PredictionOutcome`, `StatusMessage`)
/// - Configuration (`PipelineConfig` and its sections)
/// - Models (`DigitModel`, `OrtInfer`, `LazyModel`)
/// - Collaborators (`CanvasSource`, `DisplaySink`, `DisplayUpdate`, `ImageFileSource`, `StaticCanvas`)
/// - Essential error and result types (`DigitError`, `DigitResult`)
///
/// For lower-level pieces (individual preprocessing stages, the ranker),
/// import directly from `oar_digit::processors`.
pub mod prelude {
    pub use crate::pipeline::{DigitPipeline, PredictionOutcome, StatusMessage};

    pub use crate::core::config::{
        ModelConfig, OutputActivation, PipelineConfig, PreprocessConfig, RankerConfig,
    };
    pub use crate::core::inference::{LazyModel, ModelStatus, OrtInfer};
    pub use crate::core::traits::{CanvasSource, DigitModel, DisplaySink, DisplayUpdate};
    pub use crate::core::{DigitError, DigitResult, init_tracing};

    pub use crate::domain::{NormalizedTensor, PredictionVector, RankedResult, RawImage};
    pub use crate::utils::{ImageFileSource, StaticCanvas, load_image};
}
