//! Top-K decoding of classifier scores into labelled predictions.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::Result;
use crate::labels::ClassLabelTable;
use crate::models::prediction::Prediction;
use imcls_inference::OutputTensor;

/// Rank a raw model output against a label table and keep the best `top_k`.
pub fn decode_output(
    output: &OutputTensor,
    labels: &ClassLabelTable,
    top_k: usize,
) -> Result<Vec<Prediction>> {
    let scores = output.to_f64_vec();
    debug!("Decoding {} scores from output shape {:?}", scores.len(), output.shape());
    decode_scores(&scores, labels, top_k)
}

/// Pair every score with its label, sort descending and truncate to `top_k`.
///
/// Equal scores keep ascending class-index order. NaN scores rank after
/// every number. Fewer than `top_k` scores yields a shorter result.
pub fn decode_scores(
    scores: &[f64],
    labels: &ClassLabelTable,
    top_k: usize,
) -> Result<Vec<Prediction>> {
    labels.check_output_len(scores.len())?;

    let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| compare_desc(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_k);

    Ok(ranked
        .into_iter()
        .filter_map(|(index, probability)| {
            labels
                .get(index)
                .map(|label| Prediction::new(label, probability))
        })
        .collect())
}

fn compare_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifyError;
    use ndarray::{ArrayD, IxDyn};
    use pretty_assertions::assert_eq;

    fn animals() -> ClassLabelTable {
        ClassLabelTable::from_labels(["cat", "dog", "bird"])
    }

    #[test]
    fn test_top_two() {
        let predictions = decode_scores(&[0.1, 0.9, 0.05], &animals(), 2).unwrap();
        assert_eq!(
            predictions,
            vec![Prediction::new("dog", 0.9), Prediction::new("cat", 0.1)]
        );
    }

    #[test]
    fn test_returns_fewer_when_k_exceeds_outputs() {
        let predictions = decode_scores(&[0.2, 0.5, 0.3], &animals(), 10).unwrap();
        let names: Vec<_> = predictions.iter().map(|p| p.class_name.as_str()).collect();
        assert_eq!(names, vec!["dog", "bird", "cat"]);
    }

    #[test]
    fn test_zero_k_is_empty() {
        assert!(decode_scores(&[0.2, 0.5, 0.3], &animals(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_break_by_index() {
        let predictions = decode_scores(&[0.4, 0.2, 0.4], &animals(), 3).unwrap();
        let names: Vec<_> = predictions.iter().map(|p| p.class_name.as_str()).collect();
        assert_eq!(names, vec!["cat", "bird", "dog"]);
    }

    #[test]
    fn test_nan_ranks_last() {
        let predictions = decode_scores(&[f64::NAN, 0.1, 0.2], &animals(), 3).unwrap();
        assert_eq!(predictions[0].class_name, "bird");
        assert_eq!(predictions[1].class_name, "dog");
        assert_eq!(predictions[2].class_name, "cat");
        assert!(predictions[2].probability.is_nan());
    }

    #[test]
    fn test_sorted_non_increasing() {
        let table = ClassLabelTable::imagenet();
        let scores: Vec<f64> = (0..table.len())
            .map(|i| ((i * 7919) % 1000) as f64 / 1000.0)
            .collect();

        let predictions = decode_scores(&scores, table, 10).unwrap();
        assert_eq!(predictions.len(), 10);
        assert!(predictions
            .windows(2)
            .all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let err = decode_scores(&[0.1, 0.9, 0.05, 0.2], &animals(), 2).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::LabelTableMismatch { labels: 3, outputs: 4 }
        ));

        let err = decode_scores(&[0.1, 0.9], &animals(), 2).unwrap_err();
        assert!(matches!(err, ClassifyError::LabelTableMismatch { .. }));
    }

    #[test]
    fn test_decode_output_flattens_batch() {
        let arr = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![0.1f32, 0.9, 0.05]).unwrap();
        let predictions = decode_output(&OutputTensor::Float32(arr), &animals(), 1).unwrap();

        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].class_name, "dog");
        assert!((predictions[0].probability - 0.9).abs() < 1e-6);
    }
}
