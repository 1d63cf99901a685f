//! Image loading and canvas sources.
//!
//! This module provides the [`CanvasSource`] implementations that ship with the
//! crate: [`ImageFileSource`] reads a saved drawing from disk on every capture,
//! and [`StaticCanvas`] holds a drawing in memory that callers replace or
//! clear as the user draws.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::core::errors::{DigitError, DigitResult};
use crate::core::traits::CanvasSource;
use crate::domain::RawImage;

/// Loads an image file into a [`RawImage`], keeping its channel layout when
/// it is 8-bit gray, gray+alpha, RGB or RGBA.
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> DigitResult<RawImage> {
    let img = image::open(path).map_err(DigitError::ImageLoad)?;
    let raw = RawImage::from_dynamic(&img);
    debug!(
        "Loaded {} ({}x{}, {} channels)",
        path.display(),
        raw.width(),
        raw.height(),
        raw.channels()
    );
    Ok(raw)
}

/// A canvas backed by an image file, re-read on every capture.
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CanvasSource for ImageFileSource {
    fn capture(&self) -> DigitResult<RawImage> {
        load_image(&self.path)
    }
}

/// An in-memory drawing surface.
///
/// Captures return a copy, so later edits never affect a request already in
/// flight.
#[derive(Debug)]
pub struct StaticCanvas {
    snapshot: RwLock<RawImage>,
}

impl StaticCanvas {
    pub fn new(image: RawImage) -> Self {
        Self {
            snapshot: RwLock::new(image),
        }
    }

    /// Creates an all-black canvas.
    pub fn blank(width: u32, height: u32, channels: u8) -> DigitResult<Self> {
        Ok(Self::new(RawImage::filled(width, height, channels, 0)?))
    }

    /// Replaces the drawing.
    pub fn replace(&self, image: RawImage) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = image,
            Err(poisoned) => *poisoned.into_inner() = image,
        }
    }

    /// Resets the drawing to black, keeping its size and channel count.
    pub fn clear(&self) -> DigitResult<()> {
        let (width, height, channels) = self.read(|img| (img.width(), img.height(), img.channels()));
        self.replace(RawImage::filled(width, height, channels, 0)?);
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&RawImage) -> T) -> T {
        match self.snapshot.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }
}

impl CanvasSource for StaticCanvas {
    fn capture(&self) -> DigitResult<RawImage> {
        Ok(self.read(RawImage::clone))
    }
}
