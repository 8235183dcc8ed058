//! Data models shared across the pipeline.

pub mod config;
pub mod prediction;

pub use config::{ImclsConfig, ModelConfig, ModelEntry, PredictionConfig, PreprocessConfig, ResampleFilter};
pub use prediction::Prediction;
