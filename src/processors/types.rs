//! Types used in image processing operations
//!
//! This module defines the enums that select how a drawing is reduced to a
//! single channel, how the resampling grid is laid out, and whether intensities
//! are inverted.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::config::ConfigError;

/// Rule for collapsing a multi-channel pixel into one intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelReduction {
    /// Keep the first channel (red for colour sources, gray otherwise).
    #[default]
    Red,
    /// ITU-R BT.601 luma: `0.299 R + 0.587 G + 0.114 B`.
    Luminance,
    /// Arithmetic mean of the colour channels.
    Average,
}

impl FromStr for ChannelReduction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "first" => Ok(ChannelReduction::Red),
            "luminance" | "luma" => Ok(ChannelReduction::Luminance),
            "average" | "mean" => Ok(ChannelReduction::Average),
            other => Err(ConfigError::InvalidConfig {
                message: format!("unknown channel reduction '{other}'"),
            }),
        }
    }
}

/// How output pixel positions are mapped back onto the source grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingGrid {
    /// Pixel centres are aligned: `src = (dst + 0.5) * in / out - 0.5`.
    #[default]
    HalfPixel,
    /// Top-left corners are aligned: `src = dst * in / out`.
    Asymmetric,
    /// Corner pixels are aligned: `src = dst * (in - 1) / (out - 1)`.
    AlignCorners,
}

impl FromStr for SamplingGrid {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "half_pixel" => Ok(SamplingGrid::HalfPixel),
            "asymmetric" => Ok(SamplingGrid::Asymmetric),
            "align_corners" => Ok(SamplingGrid::AlignCorners),
            other => Err(ConfigError::InvalidConfig {
                message: format!("unknown sampling grid '{other}'"),
            }),
        }
    }
}

/// Whether normalized intensities are flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Bright strokes on a dark background are passed through unchanged.
    #[default]
    Preserve,
    /// Values are mapped to `1 - v`, for models trained on dark-on-light digits.
    Inverted,
}
