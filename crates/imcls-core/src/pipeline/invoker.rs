//! Feeds a preprocessed tensor to a loaded model.

use ndarray::Array4;
use tracing::debug;

use crate::catalog::ModelSpec;
use crate::error::{ClassifyError, Result};
use imcls_inference::{InferenceBackend, InferenceError, InputTensor, OutputTensor};

const FALLBACK_INPUT_NAME: &str = "input";

/// Run one inference and return the first output tensor.
///
/// The input is consumed; it and every intermediate the backend allocates
/// are dropped before this returns, on success and on failure alike.
pub fn invoke<B>(backend: &B, spec: &ModelSpec, tensor: Array4<f32>) -> Result<OutputTensor>
where
    B: InferenceBackend + ?Sized,
{
    let expected = spec.input_shape();
    if tensor.shape() != expected {
        return Err(InferenceError::InvalidInput(format!(
            "{} expects input shape {:?}, got {:?}",
            spec.kind,
            expected,
            tensor.shape()
        ))
        .into());
    }

    let input_name = backend
        .input_names()
        .first()
        .map(String::as_str)
        .unwrap_or(FALLBACK_INPUT_NAME);

    let input = InputTensor::Float32(tensor.into_dyn());
    let outputs = backend.run(&[(input_name, input)])?;

    let (name, output) = outputs.into_iter().next().ok_or_else(|| {
        ClassifyError::Inference(InferenceError::OutputExtraction(format!(
            "{} produced no output",
            spec.kind
        )))
    })?;

    debug!("Model output '{}' with shape {:?}", name, output.shape());

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ModelKind;
    use ndarray::{ArrayD, IxDyn};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct RecordingBackend {
        inputs: Vec<String>,
        seen: Mutex<Vec<(String, Vec<usize>)>>,
        fail: bool,
    }

    impl RecordingBackend {
        fn new(fail: bool) -> Self {
            Self {
                inputs: vec!["input_1".to_string()],
                seen: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl InferenceBackend for RecordingBackend {
        fn run(
            &self,
            inputs: &[(&str, InputTensor)],
        ) -> imcls_inference::Result<Vec<(String, OutputTensor)>> {
            let mut seen = self.seen.lock().unwrap();
            for (name, tensor) in inputs {
                seen.push((name.to_string(), tensor.shape().to_vec()));
            }
            if self.fail {
                return Err(InferenceError::InferenceFailed("out of memory".to_string()));
            }
            let arr = ArrayD::from_shape_vec(IxDyn(&[1, 2]), vec![0.3f32, 0.7]).unwrap();
            Ok(vec![("probs".to_string(), OutputTensor::Float32(arr))])
        }

        fn input_names(&self) -> &[String] {
            &self.inputs
        }
    }

    fn spec(size: u32) -> ModelSpec {
        ModelSpec {
            kind: ModelKind::ResNet50,
            path: PathBuf::from("unused"),
            input_size: size,
        }
    }

    #[test]
    fn test_feeds_named_input() {
        let backend = RecordingBackend::new(false);
        let output = invoke(&backend, &spec(4), Array4::zeros((1, 4, 4, 3))).unwrap();

        assert_eq!(output.to_f64_vec().len(), 2);
        assert_eq!(
            backend.seen.lock().unwrap().as_slice(),
            &[("input_1".to_string(), vec![1, 4, 4, 3])]
        );
    }

    #[test]
    fn test_shape_mismatch_skips_backend() {
        let backend = RecordingBackend::new(false);
        let err = invoke(&backend, &spec(224), Array4::zeros((1, 299, 299, 3))).unwrap_err();

        assert!(matches!(err, ClassifyError::Inference(InferenceError::InvalidInput(_))));
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_runtime_failure_is_inference_error() {
        let backend = RecordingBackend::new(true);
        let err = invoke(&backend, &spec(2), Array4::zeros((1, 2, 2, 3))).unwrap_err();

        assert!(matches!(err, ClassifyError::Inference(InferenceError::InferenceFailed(_))));
    }
}
