//! Interfaces to the collaborators around the pipeline.
//!
//! The pipeline does not own a drawing surface, a neural network, or a UI. It
//! talks to them through the three traits in this module.

use std::sync::Arc;

use serde::Serialize;

use crate::core::errors::DigitResult;
use crate::domain::{NormalizedTensor, PredictionVector, RankedResult, RawImage};
use crate::pipeline::StatusMessage;

/// Produces a snapshot of the drawing surface on demand.
pub trait CanvasSource: Send + Sync {
    /// Copies the current drawing into an owned image.
    fn capture(&self) -> DigitResult<RawImage>;
}

/// A classifier mapping a normalized tensor to one score per class.
///
/// Implementations must be callable from several threads at once.
pub trait DigitModel: Send + Sync {
    /// Whether the weights are loaded and `predict` can be called.
    fn is_loaded(&self) -> bool;

    /// Runs the forward pass.
    fn predict(&self, input: &NormalizedTensor) -> DigitResult<PredictionVector>;

    /// Name used in logs and error messages.
    fn name(&self) -> &str;
}

impl<M: DigitModel + ?Sized> DigitModel for Arc<M> {
    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }

    fn predict(&self, input: &NormalizedTensor) -> DigitResult<PredictionVector> {
        (**self).predict(input)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<M: DigitModel + ?Sized> DigitModel for Box<M> {
    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }

    fn predict(&self, input: &NormalizedTensor) -> DigitResult<PredictionVector> {
        (**self).predict(input)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// What the display is asked to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayUpdate {
    /// A finished prediction for the request with this sequence number.
    Ranked { sequence: u64, result: RankedResult },
    /// A short status text (loading, errors, cleared canvas).
    Status(StatusMessage),
}

/// Renders results and status text.
pub trait DisplaySink: Send + Sync {
    fn show(&self, update: &DisplayUpdate);
}

impl<S: DisplaySink + ?Sized> DisplaySink for Arc<S> {
    fn show(&self, update: &DisplayUpdate) {
        (**self).show(update)
    }
}
