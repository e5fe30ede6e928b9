use mp_tensor::{ComputeBackend, Shape, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ModelError, Result};
use crate::lowered::{LayerIr, LoweredGraph};
use crate::model::InferenceModel;
use crate::signature::TensorSignature;

/// A single-layer linear classifier: logits = x @ W + b.
///
/// Input is [1, d_in], weight is [d_in, n_classes], bias is [n_classes],
/// output is [1, n_classes] raw logits.
pub struct LinearClassifier {
    name: String,
    weight: Tensor,
    bias: Tensor,
    input_sig: TensorSignature,
    output_sig: TensorSignature,
}

impl LinearClassifier {
    /// Create a classifier from explicit weights.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidWeights` if the weight is not 2D or the
    /// bias length does not match the weight's output dimension.
    pub fn from_weights(name: impl Into<String>, weight: Tensor, bias: Tensor) -> Result<Self> {
        if weight.shape().ndim() != 2 {
            return Err(ModelError::InvalidWeights(format!(
                "weight must be 2D, got shape {}",
                weight.shape()
            )));
        }
        let d_in = weight.shape().dim(0);
        let n_classes = weight.shape().dim(1);
        if bias.shape().ndim() != 1 || bias.shape().dim(0) != n_classes {
            return Err(ModelError::InvalidWeights(format!(
                "bias shape {} does not match {} output classes",
                bias.shape(),
                n_classes
            )));
        }
        Ok(LinearClassifier {
            name: name.into(),
            weight,
            bias,
            input_sig: TensorSignature::f32(vec![1, d_in]),
            output_sig: TensorSignature::f32(vec![1, n_classes]),
        })
    }

    /// Create a classifier with weights drawn from a seeded RNG, so the
    /// same seed always produces the same model.
    pub fn seeded(name: impl Into<String>, d_in: usize, n_classes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let weight: Vec<f32> = (0..d_in * n_classes)
            .map(|_| rng.gen_range(-0.1f32..0.1))
            .collect();
        let bias: Vec<f32> = (0..n_classes).map(|_| rng.gen_range(-0.1f32..0.1)).collect();
        LinearClassifier {
            name: name.into(),
            weight: Tensor::new(weight, Shape::new(vec![d_in, n_classes])),
            bias: Tensor::new(bias, Shape::new(vec![n_classes])),
            input_sig: TensorSignature::f32(vec![1, d_in]),
            output_sig: TensorSignature::f32(vec![1, n_classes]),
        }
    }

    /// Returns the weight tensor ([d_in, n_classes]).
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Returns the bias tensor ([n_classes]).
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }
}

impl InferenceModel for LinearClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_signature(&self) -> &TensorSignature {
        &self.input_sig
    }

    fn output_signature(&self) -> &TensorSignature {
        &self.output_sig
    }

    fn infer(&self, input: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        self.input_sig.check(input)?;
        let logits = input.matmul(&self.weight, backend)?;
        let out = backend.add(logits.data_f32(), self.bias.data_f32())?;
        Ok(Tensor::new(out, self.output_sig.shape().clone()))
    }

    fn lower(&self) -> Option<LoweredGraph> {
        Some(LoweredGraph::new(vec![LayerIr::Affine {
            weight: self.weight.clone(),
            bias: self.bias.clone(),
        }]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_tensor::CpuBackend;

    #[test]
    fn test_from_weights_validation() {
        let w = Tensor::new(vec![1.0, 2.0, 3.0], Shape::new(vec![3]));
        let b = Tensor::zeros(Shape::new(vec![3]));
        assert!(LinearClassifier::from_weights("bad", w, b).is_err());

        let w = Tensor::zeros(Shape::new(vec![2, 3]));
        let b = Tensor::zeros(Shape::new(vec![4]));
        assert!(LinearClassifier::from_weights("bad", w, b).is_err());
    }

    #[test]
    fn test_infer() {
        let backend = CpuBackend::new();
        // W = [[1, 0], [0, 1]], b = [0.5, -0.5]
        let w = Tensor::new(vec![1.0, 0.0, 0.0, 1.0], Shape::new(vec![2, 2]));
        let b = Tensor::new(vec![0.5, -0.5], Shape::new(vec![2]));
        let model = LinearClassifier::from_weights("identity", w, b).unwrap();

        let input = Tensor::new(vec![2.0, 3.0], Shape::new(vec![1, 2]));
        let out = model.infer(&input, &backend).unwrap();
        assert_eq!(out.data_f32(), &[2.5, 2.5]);
        assert_eq!(out.shape().dims(), &[1, 2]);
    }

    #[test]
    fn test_infer_signature_mismatch() {
        let backend = CpuBackend::new();
        let model = LinearClassifier::seeded("m", 4, 3, 7);
        let input = Tensor::zeros(Shape::new(vec![1, 5]));
        assert!(model.infer(&input, &backend).is_err());
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let backend = CpuBackend::new();
        let a = LinearClassifier::seeded("a", 4, 3, 42);
        let b = LinearClassifier::seeded("b", 4, 3, 42);
        let input = Tensor::new(vec![0.1, -0.2, 0.3, -0.4], Shape::new(vec![1, 4]));
        let out_a = a.infer(&input, &backend).unwrap();
        let out_b = b.infer(&input, &backend).unwrap();
        assert_eq!(out_a.data_f32(), out_b.data_f32());
    }
}
