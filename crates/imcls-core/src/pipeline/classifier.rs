//! End-to-end classification: preprocessing, inference and decoding.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::app::AppState;
use crate::catalog::{ModelCatalog, ModelSpec};
use crate::error::{ClassifyError, Result};
use crate::labels::ClassLabelTable;
use crate::models::config::ImclsConfig;
use crate::models::prediction::Prediction;
use crate::registry::{ModelRegistry, ModelStatus};
use crate::selection::SelectedImage;
use imcls_inference::InferenceBackend;

use super::{decoder, invoker, preprocessing::ImagePreprocessor};

/// Number of predictions kept when nothing else is configured.
pub const DEFAULT_TOP_K: usize = 10;

/// Drives one prediction per user action against a set of loaded models.
pub struct Classifier<B: InferenceBackend> {
    catalog: ModelCatalog,
    registry: Arc<ModelRegistry<B>>,
    labels: ClassLabelTable,
    preprocessor: ImagePreprocessor,
    top_k: usize,
}

/// Builder for Classifier.
pub struct ClassifierBuilder<B: InferenceBackend> {
    catalog: ModelCatalog,
    registry: Option<Arc<ModelRegistry<B>>>,
    labels: Option<ClassLabelTable>,
    preprocessor: ImagePreprocessor,
    top_k: usize,
}

impl<B: InferenceBackend> ClassifierBuilder<B> {
    /// Create a new builder over a validated catalog.
    pub fn new(catalog: ModelCatalog) -> Self {
        Self {
            catalog,
            registry: None,
            labels: None,
            preprocessor: ImagePreprocessor::new(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Share an existing registry instead of creating an empty one.
    pub fn with_registry(mut self, registry: Arc<ModelRegistry<B>>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the embedded ImageNet labels.
    pub fn with_labels(mut self, labels: ClassLabelTable) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Build the classifier.
    pub fn build(self) -> Classifier<B> {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ModelRegistry::new(&self.catalog)));

        Classifier {
            catalog: self.catalog,
            registry,
            labels: self
                .labels
                .unwrap_or_else(|| ClassLabelTable::imagenet().clone()),
            preprocessor: self.preprocessor,
            top_k: self.top_k,
        }
    }
}

impl<B: InferenceBackend> Classifier<B> {
    /// Create a new builder.
    pub fn builder(catalog: ModelCatalog) -> ClassifierBuilder<B> {
        ClassifierBuilder::new(catalog)
    }

    /// Build from configuration: catalog, label table, filter and top-K.
    pub fn from_config(config: &ImclsConfig) -> Result<Self> {
        let catalog = ModelCatalog::from_config(config)?;

        let mut builder = ClassifierBuilder::new(catalog)
            .with_preprocessor(ImagePreprocessor::new().with_filter(config.preprocess.filter))
            .with_top_k(config.prediction.top_k);

        if let Some(path) = &config.prediction.labels_file {
            builder = builder.with_labels(ClassLabelTable::from_file(path)?);
        }

        Ok(builder.build())
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<ModelRegistry<B>> {
        &self.registry
    }

    pub fn labels(&self) -> &ClassLabelTable {
        &self.labels
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Readiness of a model by name.
    pub fn model_status(&self, name: &str) -> Result<ModelStatus> {
        let spec = self.catalog.resolve(name)?;
        self.registry
            .status(spec.kind)
            .ok_or_else(|| ClassifyError::UnknownModel(name.to_string()))
    }

    /// Classify the selected image with the selected model and return the
    /// next snapshot. On failure the caller keeps its current snapshot.
    pub fn predict(&self, state: &AppState) -> Result<AppState> {
        let image = state
            .selected_image()
            .ok_or_else(|| ClassifyError::InvalidInput("no image selected".to_string()))?;
        let model = state
            .selected_model()
            .ok_or_else(|| ClassifyError::InvalidInput("no model selected".to_string()))?;

        let predictions = self.classify(image, model)?;
        Ok(state.with_predictions(predictions))
    }

    /// [`Classifier::predict`] for a user-triggered action: failures are
    /// logged and the prior snapshot is returned unchanged.
    pub fn handle_predict(&self, state: &AppState) -> AppState {
        match self.predict(state) {
            Ok(next) => next,
            Err(e) => {
                error!("Prediction aborted: {}", e);
                state.clone()
            }
        }
    }

    /// Classify one image with the named model.
    pub fn classify(&self, image: &SelectedImage, model: &str) -> Result<Vec<Prediction>> {
        let spec = self.catalog.resolve(model)?;
        let backend = self.registry.handle(spec.kind)?;

        self.run(backend.as_ref(), spec, image)
    }

    fn run(&self, backend: &B, spec: &ModelSpec, image: &SelectedImage) -> Result<Vec<Prediction>> {
        let raster = image.decode()?;
        let tensor = self.preprocessor.preprocess(&raster, spec.input_size)?;
        debug!("Input tensor shape: {:?}", tensor.shape());

        let output = invoker::invoke(backend, spec, tensor)?;
        let predictions = decoder::decode_output(&output, &self.labels, self.top_k)?;

        info!(
            "{} top {} predictions: {}",
            spec.kind,
            predictions.len(),
            predictions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(predictions)
    }
}
