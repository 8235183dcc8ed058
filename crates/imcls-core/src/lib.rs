//! Core library for single-image classification with pretrained ImageNet models.
//!
//! This crate provides:
//! - Image selection from data URLs, files or raw bytes
//! - Preprocessing into `[1, S, S, 3]` tensors normalized to [-1, 1]
//! - A validated model catalog and a registry of loaded model handles
//! - Top-K decoding against the embedded ImageNet label table

pub mod app;
pub mod catalog;
pub mod error;
pub mod labels;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod selection;

pub use app::AppState;
pub use catalog::{ModelCatalog, ModelKind, ModelSpec};
pub use error::{ClassifyError, Result};
pub use labels::{ClassLabelTable, IMAGENET_CLASS_COUNT};
pub use models::{ImclsConfig, Prediction};
pub use pipeline::{Classifier, ClassifierBuilder, ImagePreprocessor};
pub use registry::{LoadSummary, ModelLoader, ModelRegistry, ModelStatus};
pub use selection::{ImageSource, SelectedImage};

#[cfg(feature = "native")]
pub use registry::OrtModelLoader;

/// Re-export inference types.
pub use imcls_inference::{InferenceBackend, InferenceError, InputTensor, OutputTensor};

#[cfg(feature = "native")]
pub use imcls_inference::OrtBackend;

#[cfg(feature = "wasm")]
pub use imcls_inference::TractBackend;
