//! WASM bindings for in-browser image classification.
//!
//! The page fetches model graphs itself (see [`fetch_bytes`]) and hands the
//! bytes to [`ImageClassifier::load_model`]; everything after that runs
//! locally in the browser.

use std::fmt::Display;

use serde::Serialize;
use tracing::error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use imcls_core::{
    AppState, ClassLabelTable, Classifier, ImclsConfig, ModelSpec, SelectedImage, TractBackend,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// ImageNet label for a class index.
#[wasm_bindgen(js_name = imagenetLabel)]
pub fn imagenet_label(index: usize) -> Option<String> {
    ClassLabelTable::imagenet().get(index).map(str::to_string)
}

/// Fetch a URL and return the response body.
#[wasm_bindgen(js_name = fetchBytes)]
pub async fn fetch_bytes(url: String) -> Result<Vec<u8>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(&url, &opts)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;

    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "GET {} failed with status {}",
            url,
            response.status()
        )));
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: &'static str,
    input_size: u32,
    url: String,
}

/// Image classifier for browser use.
///
/// Holds the loaded models and the current selection. Every action replaces
/// the state snapshot; a failed predict leaves the previous one in place.
#[wasm_bindgen]
pub struct ImageClassifier {
    classifier: Classifier<TractBackend>,
    state: AppState,
}

#[wasm_bindgen]
impl ImageClassifier {
    /// Create a classifier over the default model catalog.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<ImageClassifier, JsValue> {
        Self::from_config(&ImclsConfig::default())
    }

    /// Create a classifier from a configuration object.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<ImageClassifier, JsValue> {
        let config: ImclsConfig = serde_wasm_bindgen::from_value(config).map_err(js_err)?;
        Self::from_config(&config)
    }

    fn from_config(config: &ImclsConfig) -> Result<ImageClassifier, JsValue> {
        Ok(Self {
            classifier: Classifier::from_config(config).map_err(js_err)?,
            state: AppState::new(),
        })
    }

    /// Configured models with their input size and asset URL.
    #[wasm_bindgen]
    pub fn models(&self) -> Result<JsValue, JsValue> {
        let models: Vec<ModelInfo> = self
            .classifier
            .catalog()
            .iter()
            .map(|spec| ModelInfo {
                name: spec.name(),
                input_size: spec.input_size,
                url: asset_url(&spec.path),
            })
            .collect();

        serde_wasm_bindgen::to_value(&models).map_err(js_err)
    }

    /// Relative URL of a model's graph file.
    #[wasm_bindgen(js_name = modelUrl)]
    pub fn model_url(&self, name: &str) -> Result<String, JsValue> {
        let spec = self.classifier.catalog().resolve(name).map_err(js_err)?;
        Ok(asset_url(&spec.path))
    }

    /// Compile a model from its ONNX bytes and make it available.
    #[wasm_bindgen(js_name = loadModel)]
    pub fn load_model(&self, name: &str, bytes: &[u8]) -> Result<(), JsValue> {
        let spec = self.classifier.catalog().resolve(name).map_err(js_err)?;
        let loader = |s: &ModelSpec| TractBackend::from_bytes_with_shape(bytes, &s.input_shape());

        self.classifier.registry().load(spec, &loader).map_err(js_err)
    }

    /// Readiness of a model: `{ state: "pending" | "loading" | "ready" | "failed", reason? }`.
    #[wasm_bindgen(js_name = modelStatus)]
    pub fn model_status(&self, name: &str) -> Result<JsValue, JsValue> {
        let status = self.classifier.model_status(name).map_err(js_err)?;
        serde_wasm_bindgen::to_value(&status).map_err(js_err)
    }

    /// Select an image from a `data:` URL as produced by `FileReader.readAsDataURL`.
    #[wasm_bindgen(js_name = selectFile)]
    pub fn select_file(&mut self, data_url: &str) -> Result<(), JsValue> {
        let image = SelectedImage::from_data_url(data_url).map_err(js_err)?;
        self.state = self.state.with_image(image);
        Ok(())
    }

    /// Select an image from raw file bytes.
    #[wasm_bindgen(js_name = selectFileBytes)]
    pub fn select_file_bytes(&mut self, bytes: Vec<u8>) {
        self.state = self.state.with_image(SelectedImage::from_bytes(bytes));
    }

    /// Select the model used by the next predict. Names are checked at predict time.
    #[wasm_bindgen(js_name = selectModel)]
    pub fn select_model(&mut self, name: &str) {
        self.state = self.state.with_model(name);
    }

    #[wasm_bindgen(js_name = selectedModel)]
    pub fn selected_model(&self) -> Option<String> {
        self.state.selected_model().map(str::to_string)
    }

    /// Classify the selected image and return the new predictions.
    #[wasm_bindgen]
    pub fn predict(&mut self) -> Result<JsValue, JsValue> {
        match self.classifier.predict(&self.state) {
            Ok(next) => {
                self.state = next;
                self.predictions()
            }
            Err(e) => {
                error!("Prediction aborted: {}", e);
                Err(js_err(e))
            }
        }
    }

    /// Predictions from the last successful predict, best first.
    #[wasm_bindgen]
    pub fn predictions(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.state.predictions()).map_err(js_err)
    }
}

fn asset_url(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
