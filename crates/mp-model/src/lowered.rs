use mp_tensor::{ComputeBackend, Tensor};

use crate::error::Result;

/// One step of a lowered model graph.
#[derive(Debug, Clone)]
pub enum LayerIr {
    /// x = x @ weight + bias. Assumes a batch dimension of 1.
    Affine { weight: Tensor, bias: Tensor },
    /// x = max(x, 0).
    Relu,
    /// Softmax over the last dimension.
    Softmax,
}

/// A model lowered to a flat sequence of tensor operations.
///
/// This is what compilers consume: a structural description of the model
/// with its weights, detached from the concrete model type. Replaying the
/// graph applies the same backend operations in the same order as the
/// model's own `infer`, so a replay on the same backend is bit-identical
/// to the baseline.
#[derive(Debug, Clone)]
pub struct LoweredGraph {
    layers: Vec<LayerIr>,
}

impl LoweredGraph {
    /// Create a graph from an ordered list of layers.
    pub fn new(layers: Vec<LayerIr>) -> Self {
        LoweredGraph { layers }
    }

    /// The graph's layers, in execution order.
    pub fn layers(&self) -> &[LayerIr] {
        &self.layers
    }

    /// Replay the graph on an input tensor using the given backend.
    pub fn execute(&self, input: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let mut x = input.clone();
        for layer in &self.layers {
            x = match layer {
                LayerIr::Affine { weight, bias } => {
                    let h = x.matmul(weight, backend)?;
                    let out = backend.add(h.data_f32(), bias.data_f32())?;
                    Tensor::new(out, h.shape().clone())
                }
                LayerIr::Relu => Tensor::new(backend.relu(x.data_f32())?, x.shape().clone()),
                LayerIr::Softmax => {
                    let width = x.shape().dim(x.shape().ndim() - 1);
                    Tensor::new(backend.softmax(x.data_f32(), width)?, x.shape().clone())
                }
            };
        }
        Ok(x)
    }
}
