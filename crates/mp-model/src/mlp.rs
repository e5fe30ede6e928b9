use mp_tensor::{ComputeBackend, Shape, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::lowered::{LayerIr, LoweredGraph};
use crate::model::InferenceModel;
use crate::signature::TensorSignature;

/// A two-layer perceptron with a softmax classification head:
/// probs = softmax(relu(x @ W1 + b1) @ W2 + b2).
///
/// Input is [1, d_in], output is [1, n_classes] class probabilities.
pub struct Mlp {
    name: String,
    w1: Tensor,
    b1: Tensor,
    w2: Tensor,
    b2: Tensor,
    input_sig: TensorSignature,
    output_sig: TensorSignature,
}

impl Mlp {
    /// Create an MLP with weights drawn from a seeded RNG.
    pub fn seeded(
        name: impl Into<String>,
        d_in: usize,
        hidden: usize,
        n_classes: usize,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut draw = |n: usize| -> Vec<f32> {
            (0..n).map(|_| rng.gen_range(-0.1f32..0.1)).collect()
        };
        let w1 = Tensor::new(draw(d_in * hidden), Shape::new(vec![d_in, hidden]));
        let b1 = Tensor::new(draw(hidden), Shape::new(vec![hidden]));
        let w2 = Tensor::new(draw(hidden * n_classes), Shape::new(vec![hidden, n_classes]));
        let b2 = Tensor::new(draw(n_classes), Shape::new(vec![n_classes]));
        Mlp {
            name: name.into(),
            w1,
            b1,
            w2,
            b2,
            input_sig: TensorSignature::f32(vec![1, d_in]),
            output_sig: TensorSignature::f32(vec![1, n_classes]),
        }
    }
}

impl InferenceModel for Mlp {
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

        let h = input.matmul(&self.w1, backend)?;
        let h = backend.add(h.data_f32(), self.b1.data_f32())?;
        let h = backend.relu(&h)?;

        let hidden = self.w1.shape().dim(1);
        let h = Tensor::new(h, Shape::new(vec![1, hidden]));
        let logits = h.matmul(&self.w2, backend)?;
        let logits = backend.add(logits.data_f32(), self.b2.data_f32())?;

        let n_classes = self.w2.shape().dim(1);
        let probs = backend.softmax(&logits, n_classes)?;
        Ok(Tensor::new(probs, self.output_sig.shape().clone()))
    }

    fn lower(&self) -> Option<LoweredGraph> {
        Some(LoweredGraph::new(vec![
            LayerIr::Affine {
                weight: self.w1.clone(),
                bias: self.b1.clone(),
            },
            LayerIr::Relu,
            LayerIr::Affine {
                weight: self.w2.clone(),
                bias: self.b2.clone(),
            },
            LayerIr::Softmax,
        ]))
    }
}
