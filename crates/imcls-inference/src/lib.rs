//! Inference runtime layer for imcls.
//!
//! A single [`InferenceBackend`] trait sits in front of the runtimes that
//! execute the exported classifiers:
//! - `ort` with the XNNPACK execution provider on native platforms
//! - `tract` for WASM/browser builds

mod backend;
mod error;
mod tensor;

pub use backend::InferenceBackend;
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use backend::ort::OrtBackend;

#[cfg(feature = "wasm")]
pub use backend::tract::TractBackend;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
