//! The digit recognition pipeline module.
//!
//! This module drives a request from canvas capture through preprocessing,
//! inference and ranking, and turns the outcome into display updates.

pub mod digit;
pub mod request;
pub mod state;
pub mod status;

pub use digit::{DigitPipeline, PredictionOutcome};
pub use request::RequestTracker;
pub use state::RequestState;
pub use status::StatusMessage;
