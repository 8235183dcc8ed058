//! Inference backend implementations.

#[cfg(feature = "native")]
pub mod ort;

#[cfg(feature = "wasm")]
pub mod tract;

use crate::{InputTensor, OutputTensor, Result};

/// A loaded model graph that can be executed.
///
/// Implementations wrap a concrete runtime (ort natively, tract in the
/// browser) so the classification pipeline never sees runtime types. A
/// backend is read-only once constructed and may be shared between threads.
pub trait InferenceBackend: Send + Sync {
    /// Run inference with the given named inputs.
    ///
    /// Every tensor created for the call is owned by the call and released
    /// when it returns, whether it succeeds or not.
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>>;

    /// Get the input names expected by the model.
    fn input_names(&self) -> &[String];
}
