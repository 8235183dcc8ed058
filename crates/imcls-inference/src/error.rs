//! Error types for the inference layer.

use thiserror::Error;

/// Errors raised by an inference runtime.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The model graph could not be read or parsed.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The runtime refused to build an executable session.
    #[error("failed to create session: {0}")]
    SessionCreate(String),

    /// Input tensor shape or type does not fit the model.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Execution of the graph failed.
    #[error("inference failed: {0}")]
    InferenceFailed(String),

    /// An output tensor could not be read back.
    #[error("failed to extract output: {0}")]
    OutputExtraction(String),

    /// I/O error when reading model files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
