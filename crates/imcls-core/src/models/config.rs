//! Configuration structures for the classification pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use image::imageops::FilterType;

/// Main configuration for imcls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImclsConfig {
    /// Model asset configuration.
    pub models: ModelConfig,

    /// Prediction/decoding configuration.
    pub prediction: PredictionConfig,

    /// Image preprocessing configuration.
    pub preprocess: PreprocessConfig,
}

/// Where the model assets live and what geometry each model expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory holding one sub-directory per model.
    pub asset_dir: PathBuf,

    /// Graph file name inside each model directory.
    pub model_file: String,

    /// Number of CPU threads the native runtime may use.
    pub num_threads: usize,

    /// Models to register, in load order.
    pub entries: Vec<ModelEntry>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets/KerasModels"),
            model_file: "model.onnx".to_string(),
            num_threads: 4,
            entries: vec![
                ModelEntry::new("InceptionV3", 299),
                ModelEntry::new("ResNet50", 224),
                ModelEntry::new("Xception", 299),
            ],
        }
    }
}

/// One model: its name and the square input size it was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub input_size: u32,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, input_size: u32) -> Self {
        Self {
            name: name.into(),
            input_size,
        }
    }
}

/// Decoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// How many predictions to keep.
    pub top_k: usize,

    /// Model used when none is selected explicitly.
    pub default_model: String,

    /// Label file replacing the embedded ImageNet table.
    pub labels_file: Option<PathBuf>,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            default_model: "ResNet50".to_string(),
            labels_file: None,
        }
    }
}

/// Preprocessing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Resampling filter used to bring images to the model geometry.
    pub filter: ResampleFilter,
}

/// Resampling filter names accepted in the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl ImclsConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Full path to a model graph: `<asset_dir>/<name>/<model_file>`.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models
            .asset_dir
            .join(model_name)
            .join(&self.models.model_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_model_path() {
        let config = ImclsConfig::default();
        assert_eq!(
            config.model_path("ResNet50"),
            PathBuf::from("assets/KerasModels/ResNet50/model.onnx")
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ImclsConfig =
            serde_json::from_str(r#"{"prediction": {"top_k": 3}, "preprocess": {"filter": "catmull-rom"}}"#)
                .unwrap();

        assert_eq!(config.prediction.top_k, 3);
        assert_eq!(config.prediction.default_model, "ResNet50");
        assert_eq!(config.preprocess.filter, ResampleFilter::CatmullRom);
        assert_eq!(config.models.entries.len(), 3);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ImclsConfig::default();
        config.models.asset_dir = PathBuf::from("/opt/models");
        config.save(&path).unwrap();

        let loaded = ImclsConfig::from_file(&path).unwrap();
        assert_eq!(loaded.models.asset_dir, PathBuf::from("/opt/models"));
        assert_eq!(loaded.models.entries, config.models.entries);
    }
}
