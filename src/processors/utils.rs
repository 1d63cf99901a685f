//! Post-processing utilities.
//!
//! - `topk`: ranking of classification scores

pub mod topk;

pub use topk::{Topk, rank};
