//! Application state snapshots.

use std::sync::Arc;

use crate::models::prediction::Prediction;
use crate::selection::SelectedImage;

/// Immutable view of what the user has selected and what was last predicted.
///
/// Handlers never mutate a snapshot; they return a new one. Cloning is cheap
/// because the image and predictions are shared.
#[derive(Debug, Clone)]
pub struct AppState {
    selected_image: Option<Arc<SelectedImage>>,
    selected_model: Option<String>,
    predictions: Arc<[Prediction]>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            selected_image: None,
            selected_model: None,
            predictions: Arc::from(Vec::new()),
        }
    }

    /// Snapshot with `image` replacing any previous selection.
    pub fn with_image(&self, image: SelectedImage) -> Self {
        Self {
            selected_image: Some(Arc::new(image)),
            ..self.clone()
        }
    }

    /// Snapshot with `model` as the selected model name.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            selected_model: Some(model.into()),
            ..self.clone()
        }
    }

    /// Snapshot whose predictions replace the previous ones.
    pub fn with_predictions(&self, predictions: Vec<Prediction>) -> Self {
        Self {
            predictions: Arc::from(predictions),
            ..self.clone()
        }
    }

    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.selected_image.as_deref()
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_handlers_leave_previous_snapshot_untouched() {
        let empty = AppState::new();
        let with_model = empty.with_model("ResNet50");
        let with_image = with_model.with_image(SelectedImage::from_bytes(vec![1, 2, 3]));

        assert_eq!(empty.selected_model(), None);
        assert!(with_model.selected_image().is_none());
        assert_eq!(with_image.selected_model(), Some("ResNet50"));
        assert_eq!(with_image.selected_image().map(|i| i.bytes()), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_selection_is_last_write_wins() {
        let state = AppState::new()
            .with_image(SelectedImage::from_bytes(vec![1]))
            .with_image(SelectedImage::from_bytes(vec![2]))
            .with_model("Xception")
            .with_model("InceptionV3");

        assert_eq!(state.selected_image().map(|i| i.bytes().to_vec()), Some(vec![2]));
        assert_eq!(state.selected_model(), Some("InceptionV3"));
    }

    #[test]
    fn test_predictions_replaced() {
        let first = AppState::new().with_predictions(vec![Prediction::new("cat", 0.6)]);
        let second = first.with_predictions(vec![Prediction::new("dog", 0.7)]);

        assert_eq!(first.predictions(), &[Prediction::new("cat", 0.6)]);
        assert_eq!(second.predictions(), &[Prediction::new("dog", 0.7)]);
    }
}
