//! Error types for the imcls-core library.

use thiserror::Error;

/// Main error type for the classification pipeline.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// A model asset failed to load; the model stays unavailable.
    #[error("failed to load model {model}: {reason}")]
    Load { model: String, reason: String },

    /// No image selected, or the image bytes could not be turned into a raster.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested model name is not part of the catalog.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// The requested model exists but is not ready yet (or failed to load).
    #[error("model {0} is not loaded")]
    ModelNotLoaded(String),

    /// The runtime raised during inference.
    #[error("inference error: {0}")]
    Inference(#[from] imcls_inference::InferenceError),

    /// The model produced a different number of scores than there are labels.
    #[error("label table has {labels} entries but the model produced {outputs} scores")]
    LabelTableMismatch { labels: usize, outputs: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for the imcls library.
pub type Result<T> = std::result::Result<T, ClassifyError>;
