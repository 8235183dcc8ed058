//! Tensor types for inference input/output.

use ndarray::ArrayD;

/// Input tensor for inference.
#[derive(Debug, Clone)]
pub enum InputTensor {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

impl InputTensor {
    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::Float32(arr) => arr.shape(),
            InputTensor::Float64(arr) => arr.shape(),
        }
    }
}

/// Output tensor from inference.
#[derive(Debug, Clone)]
pub enum OutputTensor {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

impl OutputTensor {
    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            OutputTensor::Float32(arr) => arr.shape(),
            OutputTensor::Float64(arr) => arr.shape(),
        }
    }

    /// Number of elements across all dimensions.
    pub fn len(&self) -> usize {
        match self {
            OutputTensor::Float32(arr) => arr.len(),
            OutputTensor::Float64(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy every element, in logical (row-major) order, into a flat vector.
    ///
    /// A `[1, 1000]` classifier output becomes 1000 scores.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            OutputTensor::Float32(arr) => arr.iter().map(|&v| v as f64).collect(),
            OutputTensor::Float64(arr) => arr.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_input_shape() {
        let tensor = InputTensor::Float32(ArrayD::zeros(IxDyn(&[1, 2, 2, 3])));
        assert_eq!(tensor.shape(), &[1, 2, 2, 3]);
    }

    #[test]
    fn test_output_flattens_batch_dimension() {
        let arr = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![0.25f32, 0.5, 0.25]).unwrap();
        let output = OutputTensor::Float32(arr);

        assert_eq!(output.len(), 3);
        assert_eq!(output.to_f64_vec(), vec![0.25, 0.5, 0.25]);
    }
}
