//! Loaded model handles and their readiness.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{ModelCatalog, ModelKind, ModelSpec};
use crate::error::{ClassifyError, Result};
use imcls_inference::{InferenceBackend, InferenceError};

#[cfg(feature = "native")]
use imcls_inference::OrtBackend;

/// Turns a [`ModelSpec`] into a runnable backend.
pub trait ModelLoader {
    type Backend: InferenceBackend;

    fn load(&self, spec: &ModelSpec) -> std::result::Result<Self::Backend, InferenceError>;
}

impl<F, B> ModelLoader for F
where
    F: Fn(&ModelSpec) -> std::result::Result<B, InferenceError>,
    B: InferenceBackend,
{
    type Backend = B;

    fn load(&self, spec: &ModelSpec) -> std::result::Result<B, InferenceError> {
        self(spec)
    }
}

/// Loads ONNX graphs from disk with ONNX Runtime.
#[cfg(feature = "native")]
#[derive(Debug, Clone, Copy)]
pub struct OrtModelLoader {
    threads: usize,
}

#[cfg(feature = "native")]
impl OrtModelLoader {
    pub fn new(threads: usize) -> Self {
        Self { threads }
    }
}

#[cfg(feature = "native")]
impl ModelLoader for OrtModelLoader {
    type Backend = OrtBackend;

    fn load(&self, spec: &ModelSpec) -> std::result::Result<OrtBackend, InferenceError> {
        OrtBackend::from_file_with_threads(&spec.path, self.threads)
    }
}

/// Readiness of one model, queryable before a predict is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum ModelStatus {
    Pending,
    Loading,
    Ready,
    Failed(String),
}

impl ModelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelStatus::Ready)
    }
}

enum Slot<B> {
    Pending,
    Loading,
    Ready(Arc<B>),
    Failed(String),
}

impl<B> Slot<B> {
    fn status(&self) -> ModelStatus {
        match self {
            Slot::Pending => ModelStatus::Pending,
            Slot::Loading => ModelStatus::Loading,
            Slot::Ready(_) => ModelStatus::Ready,
            Slot::Failed(reason) => ModelStatus::Failed(reason.clone()),
        }
    }
}

/// Outcome of loading every catalog model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub loaded: Vec<ModelKind>,
    pub failed: Vec<(ModelKind, String)>,
}

/// Owns the model handles for the lifetime of the application.
///
/// Handles are shared read-only once ready. Asking for a model that is not
/// ready fails immediately with [`ClassifyError::ModelNotLoaded`]; nothing
/// here waits for a load in progress.
pub struct ModelRegistry<B> {
    slots: RwLock<HashMap<ModelKind, Slot<B>>>,
}

impl<B: InferenceBackend> ModelRegistry<B> {
    /// One pending slot per catalog entry.
    pub fn new(catalog: &ModelCatalog) -> Self {
        let slots = catalog
            .iter()
            .map(|spec| (spec.kind, Slot::Pending))
            .collect();

        Self {
            slots: RwLock::new(slots),
        }
    }

    pub fn status(&self, kind: ModelKind) -> Option<ModelStatus> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.get(&kind).map(Slot::status)
    }

    /// Status of every registered model, ordered by kind.
    pub fn statuses(&self) -> Vec<(ModelKind, ModelStatus)> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let mut statuses: Vec<_> = slots.iter().map(|(kind, slot)| (*kind, slot.status())).collect();
        statuses.sort_by_key(|(kind, _)| *kind);
        statuses
    }

    pub fn is_ready(&self, kind: ModelKind) -> bool {
        self.status(kind).is_some_and(|status| status.is_ready())
    }

    /// Shared handle to a ready model.
    pub fn handle(&self, kind: ModelKind) -> Result<Arc<B>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        match slots.get(&kind) {
            Some(Slot::Ready(backend)) => Ok(Arc::clone(backend)),
            _ => Err(ClassifyError::ModelNotLoaded(kind.to_string())),
        }
    }

    /// Register an already-built backend (e.g. one created from fetched bytes).
    pub fn insert(&self, kind: ModelKind, backend: B) {
        self.set(kind, Slot::Ready(Arc::new(backend)));
        info!("{} loaded", kind);
    }

    /// Record that building a backend failed outside of [`ModelRegistry::load`].
    pub fn mark_failed(&self, kind: ModelKind, reason: impl Into<String>) {
        self.set(kind, Slot::Failed(reason.into()));
    }

    pub fn mark_loading(&self, kind: ModelKind) {
        self.set(kind, Slot::Loading);
    }

    /// Load one model; on failure the slot is marked failed and a
    /// [`ClassifyError::Load`] is returned.
    pub fn load<L>(&self, spec: &ModelSpec, loader: &L) -> Result<()>
    where
        L: ModelLoader<Backend = B>,
    {
        debug!("Loading {} from {}", spec.kind, spec.path.display());
        self.mark_loading(spec.kind);

        match loader.load(spec) {
            Ok(backend) => {
                self.insert(spec.kind, backend);
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Error loading model {}: {}", spec.kind, reason);
                self.mark_failed(spec.kind, reason.clone());
                Err(ClassifyError::Load {
                    model: spec.kind.to_string(),
                    reason,
                })
            }
        }
    }

    /// Load every catalog model in order. A failure does not stop the
    /// remaining loads.
    pub fn load_all<L>(&self, catalog: &ModelCatalog, loader: &L) -> LoadSummary
    where
        L: ModelLoader<Backend = B>,
    {
        let mut summary = LoadSummary::default();

        for spec in catalog.iter() {
            match self.load(spec, loader) {
                Ok(()) => summary.loaded.push(spec.kind),
                Err(ClassifyError::Load { reason, .. }) => summary.failed.push((spec.kind, reason)),
                Err(e) => summary.failed.push((spec.kind, e.to_string())),
            }
        }

        summary
    }

    fn set(&self, kind: ModelKind, slot: Slot<B>) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(kind, slot);
    }
}
