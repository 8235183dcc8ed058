//! Classification pipeline: preprocessing, inference and top-K decoding.

mod classifier;
mod decoder;
mod invoker;
mod preprocessing;

pub use classifier::{Classifier, ClassifierBuilder, DEFAULT_TOP_K};
pub use decoder::{decode_output, decode_scores};
pub use invoker::invoke;
pub use preprocessing::{normalize_channel, ImagePreprocessor};
