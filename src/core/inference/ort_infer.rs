//! ONNX Runtime digit classifier.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use ndarray::{ArrayView4, ArrayViewD, IxDyn};
use ort::session::Session;
use ort::value::TensorRef;
use tracing::{debug, info};

use super::session::{load_session, primary_input_shape};
use crate::core::config::{ModelConfig, OutputActivation};
use crate::core::constants::DEFAULT_INPUT_NAME;
use crate::core::errors::{DigitError, DigitResult};
use crate::core::traits::DigitModel;
use crate::domain::{NormalizedTensor, PredictionVector};

/// How the model expects the single-channel image to be laid out.
///
/// With one channel all three layouts share the same memory order, so the
/// tensor is only reshaped, never copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// `[1, h, w, 1]`
    Nhwc,
    /// `[1, 1, h, w]`
    Nchw,
    /// `[1, h * w]`
    Flat,
}

impl InputLayout {
    /// Infers the layout from a declared input shape. Unknown shapes are
    /// treated as NHWC.
    pub fn from_shape(shape: &[i64]) -> Self {
        match shape {
            [_, _] => Self::Flat,
            [_, 1, _, last] if *last != 1 => Self::Nchw,
            _ => Self::Nhwc,
        }
    }

    /// Reshapes an NHWC single-channel view into this layout.
    pub fn reshape<'a>(self, view: ArrayView4<'a, f32>) -> DigitResult<ArrayViewD<'a, f32>> {
        let (height, width) = (view.shape()[1], view.shape()[2]);
        let shaped = match self {
            Self::Nhwc => return Ok(view.into_dyn()),
            Self::Nchw => view.into_shape_with_order(IxDyn(&[1, 1, height, width])),
            Self::Flat => view.into_shape_with_order(IxDyn(&[1, height * width])),
        };
        shaped.map_err(|e| DigitError::tensor_operation(&format!("reshape input to {self:?}"), e))
    }
}

/// A digit classifier backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so concurrent predictions are
/// serialized on an internal lock.
pub struct OrtInfer {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_layout: InputLayout,
    activation: OutputActivation,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_layout", &self.input_layout)
            .field("activation", &self.activation)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Loads a model with discovered tensor names and no output activation.
    pub fn new(model_path: impl AsRef<Path>) -> DigitResult<Self> {
        Self::from_config(&ModelConfig::new(model_path))
    }

    /// Loads the model described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoad` if the session cannot be created or the configured
    /// output name does not exist in the model.
    pub fn from_config(config: &ModelConfig) -> DigitResult<Self> {
        let path = config.model_path.as_path();
        let session = load_session(path)?;

        let input_name = match &config.input_name {
            Some(name) => name.clone(),
            None => session
                .inputs
                .first()
                .map(|input| input.name.clone())
                .unwrap_or_else(|| DEFAULT_INPUT_NAME.to_string()),
        };

        let output_name = match &config.output_name {
            Some(name) if session.outputs.iter().any(|o| &o.name == name) => name.clone(),
            Some(name) => {
                return Err(DigitError::model_load_error(
                    path,
                    format!("model has no output named '{name}'"),
                ));
            }
            None => session
                .outputs
                .first()
                .map(|output| output.name.clone())
                .ok_or_else(|| DigitError::model_load_error(path, "model declares no outputs"))?,
        };

        let input_layout = primary_input_shape(&session)
            .map(|shape| InputLayout::from_shape(&shape))
            .unwrap_or(InputLayout::Nhwc);

        info!(
            "Model '{}' ready: input '{}' ({:?}), output '{}', activation {:?}",
            config.model_name, input_name, input_layout, output_name, config.activation
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_layout,
            activation: config.activation,
            model_path: path.to_path_buf(),
            model_name: config.model_name.clone(),
        })
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn input_layout(&self) -> InputLayout {
        self.input_layout
    }

    fn run(&self, input: &NormalizedTensor) -> DigitResult<(Vec<i64>, Vec<f32>)> {
        let view = self.input_layout.reshape(input.view())?;
        let tensor = TensorRef::from_array_view(view).map_err(|e| {
            DigitError::model_error(
                &self.model_name,
                format!("failed to convert input tensor: {e}"),
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => tensor];

        let mut session = self.session.lock().map_err(|_| {
            DigitError::model_error(&self.model_name, "session lock poisoned by a previous panic")
        })?;

        let outputs = session.run(inputs).map_err(|e| {
            DigitError::model_error(
                &self.model_name,
                format!(
                    "forward pass failed with input '{}' -> output '{}': {e}",
                    self.input_name, self.output_name
                ),
            )
        })?;

        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                DigitError::model_error(
                    &self.model_name,
                    format!("failed to extract output '{}' as f32: {e}", self.output_name),
                )
            })?;

        Ok((shape.iter().copied().collect(), data.to_vec()))
    }
}

impl DigitModel for OrtInfer {
    fn is_loaded(&self) -> bool {
        true
    }

    fn predict(&self, input: &NormalizedTensor) -> DigitResult<PredictionVector> {
        let start = Instant::now();
        let (shape, mut scores) = self.run(input)?;
        validate_output(&self.model_name, &shape, &scores)?;

        if self.activation == OutputActivation::Softmax {
            softmax_in_place(&mut scores);
        }

        debug!(
            "Model '{}' produced {} scores in {:?}",
            self.model_name,
            scores.len(),
            start.elapsed()
        );
        Ok(PredictionVector::new(scores))
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Checks that the output is a single, non-empty score vector.
fn validate_output(model_name: &str, shape: &[i64], data: &[f32]) -> DigitResult<()> {
    if data.is_empty() {
        return Err(DigitError::model_error(model_name, "model produced no scores"));
    }
    if shape.len() > 1 && shape[0] != 1 {
        return Err(DigitError::model_error(
            model_name,
            format!("expected a batch of one, got output shape {shape:?}"),
        ));
    }
    if shape.iter().skip(1).filter(|&&d| d != 1).count() > 1 {
        return Err(DigitError::model_error(
            model_name,
            format!("expected one score per class, got output shape {shape:?}"),
        ));
    }
    Ok(())
}

/// Numerically stable softmax over the whole slice.
pub(crate) fn softmax_in_place(values: &mut [f32]) {
    let max = values.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    if !max.is_finite() {
        return;
    }
    values.iter_mut().for_each(|v| *v = (*v - max).exp());
    let sum: f32 = values.iter().sum();
    values.iter_mut().for_each(|v| *v /= sum);
}
