//! Request lifecycle states.

use std::fmt;

use crate::core::errors::{DigitError, DigitResult, ProcessingStage};

/// Where a prediction request currently is.
///
/// A request moves `Idle -> Capturing -> Preprocessing -> Inferring -> Ranking
/// -> Idle`. Any stage may fall back to `Idle` on failure, and `Capturing` is
/// never entered when the model is not ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    Idle,
    Capturing,
    Preprocessing,
    Inferring,
    Ranking,
}

impl RequestState {
    /// The stage that follows on success.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::Capturing,
            Self::Capturing => Self::Preprocessing,
            Self::Preprocessing => Self::Inferring,
            Self::Inferring => Self::Ranking,
            Self::Ranking => Self::Idle,
        }
    }

    /// Checks that `to` is reachable from `self` in one step.
    pub fn transition(self, to: Self) -> DigitResult<Self> {
        if to == self.next() || to == Self::Idle {
            Ok(to)
        } else {
            Err(DigitError::processing_error(
                ProcessingStage::StateTransition,
                &format!("request cannot move from {self} to {to}"),
                "invalid state transition",
            ))
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Preprocessing => "preprocessing",
            Self::Inferring => "inferring",
            Self::Ranking => "ranking",
        };
        f.write_str(name)
    }
}
