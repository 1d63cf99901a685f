//! Utility functions for the digit pipeline.
//!
//! This module provides image loading and the canvas sources built on it.

pub mod image;

pub use image::{ImageFileSource, StaticCanvas, load_image};
