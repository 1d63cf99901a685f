//! Digit Prediction Example
//!
//! This example loads a digit classifier in the background, then recognizes the
//! digit drawn in each image and prints the top-k classes with their
//! percentages.
//!
//! Usage:
//! ```
//! cargo run --example predict_digit -- --model-path <path_to_model> <image_paths>...
//! ```
//!
//! Settings can also come from a JSON file; command-line flags override it:
//! ```
//! cargo run --example predict_digit -- --config pipeline.json <image_paths>...
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use oar_digit::core::ConfigValidator;
use oar_digit::prelude::*;
use oar_digit::processors::types::{ChannelReduction, Polarity, SamplingGrid};
use tracing::{error, info};

/// Command-line arguments for the digit prediction example
#[derive(Parser)]
#[command(name = "predict_digit")]
#[command(about = "Digit Prediction Example - ranks the digit drawn in each image")]
struct Args {
    /// Path to the ONNX model file
    #[arg(short, long)]
    model_path: Option<PathBuf>,

    /// JSON pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image file paths to process
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Number of ranked digits to print
    #[arg(short, long)]
    topk: Option<usize>,

    /// Apply softmax to the model output
    #[arg(long)]
    softmax: bool,

    /// Invert intensities (for models trained on dark digits over white)
    #[arg(long)]
    invert: bool,

    /// Channel reduction: red, luminance or average
    #[arg(long)]
    channel: Option<ChannelReduction>,

    /// Resampling grid: half_pixel, asymmetric or align_corners
    #[arg(long)]
    sampling: Option<SamplingGrid>,

    /// Per-call model timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

/// Prints each update the pipeline produces.
struct ConsoleSink {
    source: String,
}

impl DisplaySink for ConsoleSink {
    fn show(&self, update: &DisplayUpdate) {
        match update {
            DisplayUpdate::Ranked { result, .. } => {
                println!("{}:", self.source);
                for entry in result {
                    println!("   {entry}");
                }
            }
            DisplayUpdate::Status(status) if status.is_error() => {
                error!("{}: {}", self.source, status);
            }
            DisplayUpdate::Status(status) => info!("{}: {}", self.source, status),
        }
    }
}

fn build_config(args: &Args) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(path) = &args.model_path {
        config.model.model_path = path.clone();
    }
    if let Some(topk) = args.topk {
        config.ranker.topk = topk;
    }
    if args.softmax {
        config.model.activation = OutputActivation::Softmax;
    }
    if args.invert {
        config.preprocess.polarity = Polarity::Inverted;
    }
    if let Some(channel) = args.channel {
        config.preprocess.channel = channel;
    }
    if let Some(sampling) = args.sampling {
        config.preprocess.sampling = sampling;
    }
    if args.timeout_ms.is_some() {
        config.model.timeout_ms = args.timeout_ms;
    }

    config.validate()?;
    Ok(config)
}

/// Main function for the digit prediction example
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    init_tracing();

    // Parse command-line arguments
    let args = Args::parse();
    let config = build_config(&args)?;

    if config.model.model_path.as_os_str().is_empty() {
        error!("No model given: pass --model-path or a config with model.model_path");
        return Err("missing model path".into());
    }

    let model = Arc::new(LazyModel::load_onnx(&config.model)?);
    info!("{}", StatusMessage::from_model_status(&model.status()));
    let status = model.wait();
    info!("{}", StatusMessage::from_model_status(&status));
    if let ModelStatus::Failed(message) = status {
        error!("{}", message);
        return Err(message.into());
    }

    let pipeline = DigitPipeline::from_config(&config, Arc::clone(&model))?;

    let mut failures = 0;
    for path in &args.images {
        let canvas = ImageFileSource::new(path);
        let sink = ConsoleSink {
            source: path.display().to_string(),
        };
        if !matches!(
            pipeline.run_request(&canvas, &sink),
            Some(DisplayUpdate::Ranked { .. })
        ) {
            failures += 1;
        }
    }

    info!(
        "Processed {} images, {} failed",
        args.images.len(),
        failures
    );
    Ok(())
}
