//! Trait definitions for the digit pipeline.
//!
//! The pipeline is wired to its surroundings through `collaborators`: a canvas
//! to capture from, a model to run, and a sink to display results on.

pub mod collaborators;

pub use collaborators::{CanvasSource, DigitModel, DisplaySink, DisplayUpdate};
