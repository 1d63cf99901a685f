//! Model backends.
//!
//! [`OrtInfer`] runs a digit classifier through ONNX Runtime and [`LazyModel`]
//! wraps any model so it can be loaded in the background.

pub mod lazy;
pub mod ort_infer;
pub mod session;

pub use lazy::{LazyModel, ModelStatus};
pub use ort_infer::{InputLayout, OrtInfer};
pub use session::load_session;
