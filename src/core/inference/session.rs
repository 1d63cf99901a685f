//! Helpers for working directly with ONNX Runtime sessions.

use std::path::Path;

use ort::session::Session;
use ort::value::ValueType;
use tracing::info;

use crate::core::errors::{DigitError, DigitResult};

/// Loads an ONNX model into a new session.
///
/// # Errors
///
/// Returns `ModelLoad` if the file is missing or ONNX Runtime rejects it.
pub fn load_session(model_path: impl AsRef<Path>) -> DigitResult<Session> {
    let path = model_path.as_ref();
    if !path.is_file() {
        return Err(DigitError::model_load_error(path, "model file not found"));
    }

    let session = Session::builder()
        .and_then(|b| b.commit_from_file(path))
        .map_err(|e| {
            DigitError::model_load_error(path, format!("failed to create ONNX session: {e}"))
        })?;

    info!(
        "Loaded ONNX session from {} ({} inputs, {} outputs)",
        path.display(),
        session.inputs.len(),
        session.outputs.len()
    );
    Ok(session)
}

/// Returns the declared shape of the session's first input, if it is a tensor.
///
/// Dynamic dimensions are reported as `-1`.
pub fn primary_input_shape(session: &Session) -> Option<Vec<i64>> {
    let input = session.inputs.first()?;
    match &input.input_type {
        ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
        _ => None,
    }
}
