//! The digit recognition pipeline.
//!
//! A request captures the canvas, preprocesses the snapshot, runs the model and
//! ranks its scores. Requests are explicit calls; nothing happens on its own.

use std::borrow::Cow;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use super::request::RequestTracker;
use super::state::RequestState;
use super::status::StatusMessage;
use crate::core::config::{ConfigValidator, PipelineConfig};
use crate::core::constants::DEFAULT_TOPK;
use crate::core::errors::{DigitError, DigitResult};
use crate::core::traits::{CanvasSource, DigitModel, DisplaySink, DisplayUpdate};
use crate::domain::{NormalizedTensor, PredictionVector, RankedResult, RawImage};
use crate::processors::{DigitPreprocessor, Topk};

/// What a finished request produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    /// The ranked prediction for the canvas state captured as `sequence`.
    Ranked { sequence: u64, result: RankedResult },
    /// The canvas changed while the model was running; the result was dropped.
    Superseded { sequence: u64, latest: u64 },
}

impl PredictionOutcome {
    /// Returns the ranked result unless the request was superseded.
    pub fn into_result(self) -> Option<RankedResult> {
        match self {
            Self::Ranked { result, .. } => Some(result),
            Self::Superseded { .. } => None,
        }
    }

    pub fn sequence(&self) -> u64 {
        match self {
            Self::Ranked { sequence, .. } | Self::Superseded { sequence, .. } => *sequence,
        }
    }
}

/// Drawing-to-ranking pipeline around a [`DigitModel`].
///
/// The pipeline is `Send + Sync`; concurrent requests each own their snapshot,
/// tensor and scores.
pub struct DigitPipeline {
    model: Arc<dyn DigitModel>,
    preprocessor: DigitPreprocessor,
    ranker: Topk,
    topk: usize,
    timeout: Option<Duration>,
    reject_blank_canvas: bool,
    tracker: RequestTracker,
}

impl std::fmt::Debug for DigitPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigitPipeline")
            .field("model", &self.model.name())
            .field("preprocessor", &self.preprocessor)
            .field("topk", &self.topk)
            .field("timeout", &self.timeout)
            .field("reject_blank_canvas", &self.reject_blank_canvas)
            .field("latest_sequence", &self.tracker.latest())
            .finish()
    }
}

impl DigitPipeline {
    /// Creates a pipeline with the default preprocessing and top-3 digit ranking.
    pub fn new(model: impl DigitModel + 'static) -> Self {
        Self {
            model: Arc::new(model),
            preprocessor: DigitPreprocessor::default(),
            ranker: Topk::for_digits(),
            topk: DEFAULT_TOPK,
            timeout: None,
            reject_blank_canvas: false,
            tracker: RequestTracker::new(),
        }
    }

    /// Creates a pipeline from a configuration and an already constructed model.
    ///
    /// The model section of `config` only contributes the call timeout here;
    /// loading is up to the caller (see `LazyModel::load_onnx`).
    pub fn from_config(config: &PipelineConfig, model: impl DigitModel + 'static) -> DigitResult<Self> {
        config.validate()?;
        let ranker = match &config.ranker.class_names {
            Some(names) => Topk::from_class_names(names.clone()),
            None => Topk::for_digits(),
        };
        Ok(Self {
            model: Arc::new(model),
            preprocessor: DigitPreprocessor::from_config(&config.preprocess)?,
            ranker,
            topk: config.ranker.topk,
            timeout: config.model.timeout(),
            reject_blank_canvas: config.reject_blank_canvas,
            tracker: RequestTracker::new(),
        })
    }

    /// Sets the per-call model deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many ranked entries each prediction keeps.
    pub fn with_topk(mut self, topk: usize) -> DigitResult<Self> {
        if topk == 0 {
            return Err(DigitError::InvalidK { k: topk });
        }
        self.topk = topk;
        Ok(self)
    }

    pub fn model(&self) -> &dyn DigitModel {
        self.model.as_ref()
    }

    pub fn preprocessor(&self) -> &DigitPreprocessor {
        &self.preprocessor
    }

    pub fn ranker(&self) -> &Topk {
        &self.ranker
    }

    pub fn topk(&self) -> usize {
        self.topk
    }

    /// Sequence number of the newest canvas state seen.
    pub fn latest_sequence(&self) -> u64 {
        self.tracker.latest()
    }

    /// Records a canvas reset. Requests still running become superseded.
    pub fn clear(&self) -> u64 {
        let sequence = self.tracker.advance();
        debug!("Canvas cleared at sequence {}", sequence);
        sequence
    }

    /// Captures `canvas` and predicts the digit drawn on it.
    ///
    /// # Errors
    ///
    /// Returns `ModelNotReady` without touching the canvas if the model is not
    /// loaded. Any later failure is returned as is and nothing is ranked.
    pub fn predict(&self, canvas: &dyn CanvasSource) -> DigitResult<PredictionOutcome> {
        let mut state = RequestState::Idle;
        self.execute(&mut state, || canvas.capture().map(Cow::Owned))
    }

    /// Predicts the digit in an image that has already been captured.
    pub fn predict_image(&self, image: &RawImage) -> DigitResult<PredictionOutcome> {
        let mut state = RequestState::Idle;
        self.execute(&mut state, || Ok(Cow::Borrowed(image)))
    }

    /// Runs one request and reports it on `sink`.
    ///
    /// Returns the update that was shown, or `None` when the result was
    /// superseded by a newer canvas state.
    pub fn run_request(
        &self,
        canvas: &dyn CanvasSource,
        sink: &dyn DisplaySink,
    ) -> Option<DisplayUpdate> {
        if self.model.is_loaded() {
            sink.show(&DisplayUpdate::Status(StatusMessage::Processing));
        }

        let update = match self.predict(canvas) {
            Ok(PredictionOutcome::Ranked { sequence, result }) => {
                DisplayUpdate::Ranked { sequence, result }
            }
            Ok(PredictionOutcome::Superseded { .. }) => return None,
            Err(e) => DisplayUpdate::Status(StatusMessage::from_error(&e)),
        };
        sink.show(&update);
        Some(update)
    }

    /// Clears the canvas state and tells the user.
    pub fn run_clear(&self, sink: &dyn DisplaySink) -> u64 {
        let sequence = self.clear();
        sink.show(&DisplayUpdate::Status(StatusMessage::CanvasCleared));
        sequence
    }

    fn execute<'a, F>(
        &self,
        state: &mut RequestState,
        capture: F,
    ) -> DigitResult<PredictionOutcome>
    where
        F: FnOnce() -> DigitResult<Cow<'a, RawImage>>,
    {
        if !self.model.is_loaded() {
            debug!("Model '{}' is not loaded, skipping request", self.model.name());
            return Err(DigitError::ModelNotReady);
        }

        let result = self.run_stages(state, capture);
        if let Err(e) = &result {
            let failed_in = *state;
            if e.is_contract_violation() {
                error!("Request failed while {}: {}", failed_in, e);
            } else {
                warn!("Request failed while {}: {}", failed_in, e);
            }
            self.enter(state, RequestState::Idle)?;
        }
        result
    }

    fn run_stages<'a, F>(
        &self,
        state: &mut RequestState,
        capture: F,
    ) -> DigitResult<PredictionOutcome>
    where
        F: FnOnce() -> DigitResult<Cow<'a, RawImage>>,
    {
        let start = Instant::now();

        self.enter(state, RequestState::Capturing)?;
        let sequence = self.tracker.advance();
        let image = capture()?;

        self.enter(state, RequestState::Preprocessing)?;
        let tensor = self.preprocessor.preprocess(&image)?;
        drop(image);
        if self.reject_blank_canvas && tensor.is_blank() {
            return Err(DigitError::empty_image("canvas is blank"));
        }

        self.enter(state, RequestState::Inferring)?;
        let scores = self.infer(tensor)?;

        if !self.tracker.is_current(sequence) {
            let latest = self.tracker.latest();
            warn!(
                "Dropping result for sequence {}: canvas moved on to {}",
                sequence, latest
            );
            self.enter(state, RequestState::Idle)?;
            return Ok(PredictionOutcome::Superseded { sequence, latest });
        }

        self.enter(state, RequestState::Ranking)?;
        let result = self.ranker.rank(&scores, self.topk)?;

        self.enter(state, RequestState::Idle)?;
        debug!(
            "Request {} finished in {:?}: {:?}",
            sequence,
            start.elapsed(),
            result.best().map(|e| e.label)
        );
        Ok(PredictionOutcome::Ranked { sequence, result })
    }

    fn enter(&self, state: &mut RequestState, next: RequestState) -> DigitResult<()> {
        *state = state.transition(next)?;
        debug!("Request state -> {}", state);
        Ok(())
    }

    /// Calls the model, on a worker thread when a deadline is set.
    fn infer(&self, tensor: NormalizedTensor) -> DigitResult<PredictionVector> {
        let Some(timeout) = self.timeout else {
            return self.model.predict(&tensor);
        };

        let model = Arc::clone(&self.model);
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("digit-inference".to_string())
            .spawn(move || {
                let _ = tx.send(model.predict(&tensor));
            })?;

        match rx.recv_timeout(timeout) {
            Ok(scores) => scores,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(DigitError::ModelTimeout {
                model_name: self.model.name().to_string(),
                timeout,
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(DigitError::model_error(
                self.model.name(),
                "inference worker stopped without a result",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::types::Polarity;
    use crate::utils::StaticCanvas;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const SCENARIO_SCORES: [f32; 10] = [0.1, 0.05, 0.05, 0.6, 0.0, 0.0, 0.05, 0.05, 0.05, 0.05];

    /// Returns fixed scores and remembers what it was asked.
    struct StubModel {
        loaded: AtomicBool,
        scores: Vec<f32>,
        calls: AtomicUsize,
        last_input: Mutex<Option<NormalizedTensor>>,
    }

    impl StubModel {
        fn new(scores: &[f32]) -> Self {
            Self {
                loaded: AtomicBool::new(true),
                scores: scores.to_vec(),
                calls: AtomicUsize::new(0),
                last_input: Mutex::new(None),
            }
        }

        fn unloaded(scores: &[f32]) -> Self {
            let model = Self::new(scores);
            model.loaded.store(false, Ordering::SeqCst);
            model
        }
    }

    impl DigitModel for StubModel {
        fn is_loaded(&self) -> bool {
            self.loaded.load(Ordering::SeqCst)
        }

        fn predict(&self, input: &NormalizedTensor) -> DigitResult<PredictionVector> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_input.lock().unwrap() = Some(input.clone());
            Ok(PredictionVector::from(self.scores.clone()))
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    /// Blocks inside `predict` until released.
    struct GatedModel {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl DigitModel for GatedModel {
        fn is_loaded(&self) -> bool {
            true
        }

        fn predict(&self, _input: &NormalizedTensor) -> DigitResult<PredictionVector> {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            Ok(PredictionVector::from(SCENARIO_SCORES.to_vec()))
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    struct FailingModel;

    impl DigitModel for FailingModel {
        fn is_loaded(&self) -> bool {
            true
        }

        fn predict(&self, _input: &NormalizedTensor) -> DigitResult<PredictionVector> {
            Err(DigitError::model_error("failing", "forward pass failed"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct CountingCanvas {
        inner: StaticCanvas,
        captures: AtomicUsize,
    }

    impl CountingCanvas {
        fn new(image: RawImage) -> Self {
            Self {
                inner: StaticCanvas::new(image),
                captures: AtomicUsize::new(0),
            }
        }
    }

    impl CanvasSource for CountingCanvas {
        fn capture(&self) -> DigitResult<RawImage> {
            self.captures.fetch_add(1, Ordering::SeqCst);
            self.inner.capture()
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        updates: Mutex<Vec<DisplayUpdate>>,
    }

    impl DisplaySink for CollectingSink {
        fn show(&self, update: &DisplayUpdate) {
            self.updates.lock().unwrap().push(update.clone());
        }
    }

    fn black_canvas() -> RawImage {
        RawImage::filled(280, 280, 4, 0).unwrap()
    }

    #[test]
    fn test_black_canvas_scenario() {
        let model = Arc::new(StubModel::new(&SCENARIO_SCORES));
        let pipeline = DigitPipeline::new(Arc::clone(&model));
        let canvas = StaticCanvas::new(black_canvas());

        let outcome = pipeline.predict(&canvas).unwrap();
        let result = outcome.into_result().unwrap();
        assert_eq!(result.pairs(), vec![(3, 0.6), (0, 0.1), (1, 0.05)]);
        assert_eq!(result.to_string(), "3: 60.0%\n0: 10.0%\n1: 5.0%");

        let seen = model.last_input.lock().unwrap().clone().unwrap();
        assert_eq!(seen.shape(), [1, 28, 28, 1]);
        assert!(seen.values().all(|v| v == 0.0));
    }

    #[test]
    fn test_model_not_ready_short_circuits() {
        let model = Arc::new(StubModel::unloaded(&SCENARIO_SCORES));
        let pipeline = DigitPipeline::new(Arc::clone(&model));
        let canvas = CountingCanvas::new(black_canvas());

        let err = pipeline.predict(&canvas).unwrap_err();
        assert!(matches!(err, DigitError::ModelNotReady));
        assert_eq!(canvas.captures.load(Ordering::SeqCst), 0);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(pipeline.latest_sequence(), 0);

        model.loaded.store(true, Ordering::SeqCst);
        assert!(pipeline.predict(&canvas).is_ok());
        assert_eq!(canvas.captures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_area_capture_is_an_empty_canvas() {
        let model = Arc::new(StubModel::new(&SCENARIO_SCORES));
        let pipeline = DigitPipeline::new(Arc::clone(&model));
        let canvas = StaticCanvas::new(RawImage::new(0, 0, 4, Vec::new()).unwrap());
        let sink = CollectingSink::default();

        let shown = pipeline.run_request(&canvas, &sink).unwrap();
        assert_eq!(shown, DisplayUpdate::Status(StatusMessage::EmptyCanvas));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_run_request_reports_progress_and_result() {
        let pipeline = DigitPipeline::new(StubModel::new(&SCENARIO_SCORES));
        let canvas = StaticCanvas::new(black_canvas());
        let sink = CollectingSink::default();

        pipeline.run_request(&canvas, &sink).unwrap();
        let updates = sink.updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], DisplayUpdate::Status(StatusMessage::Processing));
        match &updates[1] {
            DisplayUpdate::Ranked { sequence, result } => {
                assert_eq!(*sequence, 1);
                assert_eq!(result.labels(), vec![3, 0, 1]);
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[test]
    fn test_run_request_without_model() {
        let pipeline = DigitPipeline::new(StubModel::unloaded(&SCENARIO_SCORES));
        let canvas = StaticCanvas::new(black_canvas());
        let sink = CollectingSink::default();

        pipeline.run_request(&canvas, &sink);
        assert_eq!(
            *sink.updates.lock().unwrap(),
            vec![DisplayUpdate::Status(StatusMessage::ModelNotLoaded)]
        );
    }

    #[test]
    fn test_model_errors_become_status_messages() {
        let pipeline = DigitPipeline::new(FailingModel);
        let canvas = StaticCanvas::new(black_canvas());
        let sink = CollectingSink::default();

        match pipeline.run_request(&canvas, &sink) {
            Some(DisplayUpdate::Status(StatusMessage::Internal { message })) => {
                assert!(message.contains("forward pass failed"));
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[test]
    fn test_bad_model_output_is_a_contract_violation() {
        let pipeline = DigitPipeline::new(StubModel::new(&[]));
        let err = pipeline.predict_image(&black_canvas()).unwrap_err();
        assert!(matches!(err, DigitError::EmptyScores));

        let pipeline = DigitPipeline::new(StubModel::new(&[0.2, f32::NAN]));
        let err = pipeline.predict_image(&black_canvas()).unwrap_err();
        assert!(matches!(err, DigitError::NonFiniteScore { index: 1, .. }));
    }

    #[test]
    fn test_clear_supersedes_running_request() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let pipeline = Arc::new(DigitPipeline::new(GatedModel {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }));

        let worker = {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || pipeline.predict_image(&black_canvas()))
        };

        entered_rx.recv().unwrap();
        let cleared_at = pipeline.clear();
        release_tx.send(()).unwrap();

        let outcome = worker.join().unwrap().unwrap();
        assert_eq!(
            outcome,
            PredictionOutcome::Superseded {
                sequence: 1,
                latest: cleared_at
            }
        );
        assert!(outcome.into_result().is_none());
    }

    #[test]
    fn test_superseded_results_are_not_displayed() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let pipeline = Arc::new(DigitPipeline::new(GatedModel {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }));
        let sink = Arc::new(CollectingSink::default());

        let worker = {
            let (pipeline, sink) = (Arc::clone(&pipeline), Arc::clone(&sink));
            thread::spawn(move || {
                let canvas = StaticCanvas::new(black_canvas());
                pipeline.run_request(&canvas, sink.as_ref())
            })
        };

        entered_rx.recv().unwrap();
        pipeline.run_clear(sink.as_ref());
        release_tx.send(()).unwrap();

        assert!(worker.join().unwrap().is_none());
        let updates = sink.updates.lock().unwrap();
        assert!(
            updates
                .iter()
                .all(|u| !matches!(u, DisplayUpdate::Ranked { .. }))
        );
        assert!(updates.contains(&DisplayUpdate::Status(StatusMessage::CanvasCleared)));
    }

    #[test]
    fn test_newer_capture_supersedes_older_request() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let pipeline = Arc::new(DigitPipeline::new(GatedModel {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }));

        let spawn_request = || {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || pipeline.predict_image(&black_canvas()))
        };

        let older = spawn_request();
        entered_rx.recv().unwrap();
        let newer = spawn_request();
        entered_rx.recv().unwrap();
        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();

        let older = older.join().unwrap().unwrap();
        let newer = newer.join().unwrap().unwrap();
        assert_eq!(
            older,
            PredictionOutcome::Superseded {
                sequence: 1,
                latest: 2
            }
        );
        match newer {
            PredictionOutcome::Ranked { sequence, result } => {
                assert_eq!(sequence, 2);
                assert_eq!(result.labels(), vec![3, 0, 1]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_failed_requests_return_to_idle() {
        let image = black_canvas();

        let pipeline = DigitPipeline::new(FailingModel);
        let mut state = RequestState::Idle;
        let err = pipeline
            .execute(&mut state, || Ok(Cow::Borrowed(&image)))
            .unwrap_err();
        assert!(matches!(err, DigitError::Model { .. }));
        assert_eq!(state, RequestState::Idle);

        let pipeline = DigitPipeline::new(StubModel::new(&SCENARIO_SCORES));
        let mut state = RequestState::Idle;
        let err = pipeline
            .execute(&mut state, || Err(DigitError::invalid_image("torn buffer")))
            .unwrap_err();
        assert!(matches!(err, DigitError::InvalidImage { .. }));
        assert_eq!(state, RequestState::Idle);

        let mut state = RequestState::Idle;
        pipeline
            .execute(&mut state, || Ok(Cow::Borrowed(&image)))
            .unwrap();
        assert_eq!(state, RequestState::Idle);
    }

    #[test]
    fn test_malformed_capture_is_not_an_empty_canvas() {
        struct TornCanvas;

        impl CanvasSource for TornCanvas {
            fn capture(&self) -> DigitResult<RawImage> {
                RawImage::new(2, 2, 4, vec![0; 3])
            }
        }

        let model = Arc::new(StubModel::new(&SCENARIO_SCORES));
        let pipeline = DigitPipeline::new(Arc::clone(&model));
        let sink = CollectingSink::default();

        match pipeline.run_request(&TornCanvas, &sink) {
            Some(DisplayUpdate::Status(StatusMessage::Internal { message })) => {
                assert!(message.contains("pixel buffer"));
            }
            other => panic!("unexpected update {other:?}"),
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_slow_model_times_out() {
        let (_release_tx, release_rx) = mpsc::channel();
        let (entered_tx, _entered_rx) = mpsc::channel();
        let pipeline = DigitPipeline::new(GatedModel {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        })
        .with_timeout(Duration::from_millis(20));

        let err = pipeline.predict_image(&black_canvas()).unwrap_err();
        assert!(matches!(err, DigitError::ModelTimeout { .. }));
        assert_eq!(
            StatusMessage::from_error(&err),
            StatusMessage::ModelTimedOut
        );
    }

    #[test]
    fn test_fast_model_within_timeout() {
        let pipeline = DigitPipeline::new(StubModel::new(&SCENARIO_SCORES))
            .with_timeout(Duration::from_secs(5));
        let result = pipeline
            .predict_image(&black_canvas())
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(result.labels(), vec![3, 0, 1]);
    }

    #[test]
    fn test_from_config() {
        let config = PipelineConfig::from_json_str(
            r#"{
                "preprocess": { "target_size": [8, 8], "polarity": "inverted" },
                "ranker": { "topk": 2 },
                "reject_blank_canvas": true
            }"#,
        )
        .unwrap();
        let model = Arc::new(StubModel::new(&SCENARIO_SCORES));
        let pipeline = DigitPipeline::from_config(&config, Arc::clone(&model)).unwrap();
        assert_eq!(pipeline.topk(), 2);
        assert_eq!(pipeline.preprocessor().polarity(), Polarity::Inverted);

        // Inverted black canvas is all ones, not blank.
        let result = pipeline
            .predict_image(&black_canvas())
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(result.len(), 2);

        let seen = model.last_input.lock().unwrap().clone().unwrap();
        assert_eq!(seen.shape(), [1, 8, 8, 1]);
        assert!(seen.values().all(|v| v == 1.0));
    }

    #[test]
    fn test_blank_canvas_rejection() {
        let config = PipelineConfig {
            reject_blank_canvas: true,
            ..PipelineConfig::default()
        };
        let model = Arc::new(StubModel::new(&SCENARIO_SCORES));
        let pipeline = DigitPipeline::from_config(&config, Arc::clone(&model)).unwrap();

        let err = pipeline.predict_image(&black_canvas()).unwrap_err();
        assert!(matches!(err, DigitError::InvalidImage { .. }));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_requests_get_distinct_sequences() {
        let pipeline = Arc::new(DigitPipeline::new(StubModel::new(&SCENARIO_SCORES)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                thread::spawn(move || {
                    let canvas = StaticCanvas::new(RawImage::filled(28, 28, 1, 0).unwrap());
                    pipeline.predict(&canvas).unwrap().sequence()
                })
            })
            .collect();

        let mut sequences: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        sequences.sort_unstable();
        assert_eq!(sequences, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_with_topk() {
        let pipeline = DigitPipeline::new(StubModel::new(&SCENARIO_SCORES));
        assert!(matches!(
            DigitPipeline::new(StubModel::new(&SCENARIO_SCORES)).with_topk(0),
            Err(DigitError::InvalidK { k: 0 })
        ));
        let pipeline = pipeline.with_topk(10).unwrap();
        let result = pipeline
            .predict_image(&black_canvas())
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(result.len(), 10);
    }
}
