//! Supported models and their input geometry.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ClassifyError, Result};
use crate::models::config::ImclsConfig;

/// The pretrained classifiers the application knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    InceptionV3,
    ResNet50,
    Xception,
}

impl ModelKind {
    /// All supported models, in load order.
    pub const ALL: [ModelKind; 3] = [ModelKind::InceptionV3, ModelKind::ResNet50, ModelKind::Xception];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::InceptionV3 => "InceptionV3",
            ModelKind::ResNet50 => "ResNet50",
            ModelKind::Xception => "Xception",
        }
    }

    /// Square input size the published weights were trained on.
    pub fn default_input_size(self) -> u32 {
        match self {
            ModelKind::ResNet50 => 224,
            ModelKind::InceptionV3 | ModelKind::Xception => 299,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ClassifyError::UnknownModel(s.to_string()))
    }
}

/// Everything needed to load and feed one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub path: PathBuf,
    pub input_size: u32,
}

impl ModelSpec {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// NHWC input shape with a batch of one: `[1, S, S, 3]`.
    pub fn input_shape(&self) -> [usize; 4] {
        let size = self.input_size as usize;
        [1, size, size, 3]
    }
}

/// Lookup table from model name to [`ModelSpec`].
///
/// Built once from configuration; every entry is checked against
/// [`ModelKind`] so later lookups only fail for names a user typed.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    specs: Vec<ModelSpec>,
}

impl ModelCatalog {
    /// Build and validate the catalog from configuration.
    pub fn from_config(config: &ImclsConfig) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(config.models.entries.len());

        for entry in &config.models.entries {
            let kind: ModelKind = entry.name.parse().map_err(|_| {
                ClassifyError::Config(format!("unsupported model in configuration: {}", entry.name))
            })?;

            if !seen.insert(kind) {
                return Err(ClassifyError::Config(format!(
                    "model {} is configured more than once",
                    kind
                )));
            }

            if entry.input_size == 0 {
                return Err(ClassifyError::Config(format!(
                    "model {} has a zero input size",
                    kind
                )));
            }

            specs.push(ModelSpec {
                kind,
                path: config.model_path(kind.name()),
                input_size: entry.input_size,
            });
        }

        if specs.is_empty() {
            return Err(ClassifyError::Config("no models configured".to_string()));
        }

        Ok(Self { specs })
    }

    /// Resolve a user-facing model name.
    pub fn resolve(&self, name: &str) -> Result<&ModelSpec> {
        let kind: ModelKind = name.parse()?;
        self.get(kind)
            .ok_or_else(|| ClassifyError::UnknownModel(name.to_string()))
    }

    pub fn get(&self, kind: ModelKind) -> Option<&ModelSpec> {
        self.specs.iter().find(|spec| spec.kind == kind)
    }

    /// Specs in load order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.specs.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.specs.iter().map(ModelSpec::name).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
