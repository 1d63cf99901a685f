//! Background model loading.
//!
//! Loading ONNX weights can take a noticeable amount of time. [`LazyModel`]
//! starts the load on a worker thread and answers `is_loaded() == false` until
//! the weights are available, so a pipeline can accept requests immediately
//! and reply `ModelNotReady` to the early ones.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use once_cell::sync::OnceCell;
use tracing::{info, warn};

use super::OrtInfer;
use crate::core::config::ModelConfig;
use crate::core::errors::{DigitError, DigitResult};
use crate::core::traits::DigitModel;
use crate::domain::{NormalizedTensor, PredictionVector};

/// Load state of a [`LazyModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    Loading,
    Ready,
    /// The loader returned an error or panicked; the model will never become ready.
    Failed(String),
}

/// A model whose weights are loaded on a background thread.
pub struct LazyModel<M> {
    name: String,
    model: Arc<OnceCell<M>>,
    failure: Arc<OnceCell<String>>,
    loader: Mutex<Option<JoinHandle<()>>>,
}

impl<M> std::fmt::Debug for LazyModel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyModel")
            .field("name", &self.name)
            .field("status", &self.status())
            .finish()
    }
}

impl<M: DigitModel + 'static> LazyModel<M> {
    /// Starts `loader` on a new thread and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the thread cannot be spawned.
    pub fn spawn<F>(name: impl Into<String>, loader: F) -> DigitResult<Self>
    where
        F: FnOnce() -> DigitResult<M> + Send + 'static,
    {
        let name = name.into();
        let model = Arc::new(OnceCell::new());
        let failure = Arc::new(OnceCell::new());

        let handle = {
            let (model, failure, name) = (Arc::clone(&model), Arc::clone(&failure), name.clone());
            thread::Builder::new()
                .name(format!("load-{name}"))
                .spawn(move || {
                    let start = Instant::now();
                    let outcome = panic::catch_unwind(AssertUnwindSafe(loader)).unwrap_or_else(|_| {
                        Err(DigitError::model_error(name.as_str(), "model loader panicked"))
                    });
                    match outcome {
                        Ok(loaded) => {
                            let _ = model.set(loaded);
                            info!("Model '{}' loaded in {:?}", name, start.elapsed());
                        }
                        Err(e) => {
                            warn!("Model '{}' failed to load: {}", name, e);
                            let _ = failure.set(e.to_string());
                        }
                    }
                })?
        };

        info!("Loading model '{}' in the background", name);
        Ok(Self {
            name,
            model,
            failure,
            loader: Mutex::new(Some(handle)),
        })
    }

    /// Wraps an already loaded model.
    pub fn ready(model: M) -> Self {
        Self {
            name: model.name().to_string(),
            model: Arc::new(OnceCell::with_value(model)),
            failure: Arc::new(OnceCell::new()),
            loader: Mutex::new(None),
        }
    }
}

impl LazyModel<OrtInfer> {
    /// Starts loading the ONNX model described by `config`.
    pub fn load_onnx(config: &ModelConfig) -> DigitResult<Self> {
        let config = config.clone();
        Self::spawn(config.model_name.clone(), move || OrtInfer::from_config(&config))
    }
}

impl<M> LazyModel<M> {
    pub fn status(&self) -> ModelStatus {
        if self.model.get().is_some() {
            ModelStatus::Ready
        } else if let Some(message) = self.failure.get() {
            ModelStatus::Failed(message.clone())
        } else {
            ModelStatus::Loading
        }
    }

    /// Blocks until the loader has finished and returns the final status.
    pub fn wait(&self) -> ModelStatus {
        let handle = match self.loader.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        self.status()
    }

    /// Returns the loaded model, if any.
    pub fn get(&self) -> Option<&M> {
        self.model.get()
    }
}

impl<M: DigitModel> DigitModel for LazyModel<M> {
    fn is_loaded(&self) -> bool {
        self.model.get().is_some_and(|m| m.is_loaded())
    }

    fn predict(&self, input: &NormalizedTensor) -> DigitResult<PredictionVector> {
        self.model
            .get()
            .ok_or(DigitError::ModelNotReady)?
            .predict(input)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    struct FixedModel;

    impl DigitModel for FixedModel {
        fn is_loaded(&self) -> bool {
            true
        }

        fn predict(&self, _input: &NormalizedTensor) -> DigitResult<PredictionVector> {
            Ok(PredictionVector::from(vec![0.9, 0.1]))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn blank() -> NormalizedTensor {
        NormalizedTensor::from_plane(2, 2, vec![0.0; 4]).unwrap()
    }

    #[test]
    fn test_not_loaded_until_loader_finishes() {
        let (release, gate) = mpsc::channel::<()>();
        let lazy = LazyModel::spawn("gated", move || {
            gate.recv().map_err(|_| DigitError::ModelNotReady)?;
            Ok(FixedModel)
        })
        .unwrap();

        assert!(!lazy.is_loaded());
        assert_eq!(lazy.status(), ModelStatus::Loading);
        assert!(matches!(
            lazy.predict(&blank()),
            Err(DigitError::ModelNotReady)
        ));

        release.send(()).unwrap();
        assert_eq!(lazy.wait(), ModelStatus::Ready);
        assert!(lazy.is_loaded());
        assert_eq!(lazy.predict(&blank()).unwrap().as_slice(), &[0.9, 0.1]);
        assert_eq!(lazy.name(), "gated");
    }

    #[test]
    fn test_failed_load() {
        let lazy: LazyModel<FixedModel> = LazyModel::spawn("broken", || {
            Err(DigitError::model_load_error(
                std::path::Path::new("missing.onnx"),
                "not found",
            ))
        })
        .unwrap();

        match lazy.wait() {
            ModelStatus::Failed(message) => assert!(message.contains("missing.onnx")),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(!lazy.is_loaded());
    }

    #[test]
    fn test_panicking_loader_is_reported_without_wait() {
        let lazy: LazyModel<FixedModel> =
            LazyModel::spawn("panicky", || panic!("corrupt weights")).unwrap();

        let deadline = Instant::now() + std::time::Duration::from_secs(5);
        while lazy.status() == ModelStatus::Loading && Instant::now() < deadline {
            thread::sleep(std::time::Duration::from_millis(5));
        }

        match lazy.status() {
            ModelStatus::Failed(message) => assert!(message.contains("panicked")),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(!lazy.is_loaded());
        assert!(matches!(lazy.wait(), ModelStatus::Failed(_)));
    }

    #[test]
    fn test_missing_onnx_file_fails_in_the_background() {
        let dir = tempfile::tempdir().unwrap();
        let lazy = LazyModel::load_onnx(&ModelConfig::new(dir.path().join("mnist.onnx"))).unwrap();
        assert!(matches!(lazy.wait(), ModelStatus::Failed(_)));
        assert_eq!(lazy.name(), "digit_classifier");
    }

    #[test]
    fn test_ready_model() {
        let lazy = LazyModel::ready(FixedModel);
        assert!(lazy.is_loaded());
        assert_eq!(lazy.wait(), ModelStatus::Ready);
        assert_eq!(lazy.name(), "fixed");
    }
}
