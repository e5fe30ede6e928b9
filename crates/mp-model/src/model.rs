use mp_tensor::{ComputeBackend, Tensor};

use crate::lowered::LoweredGraph;
use crate::signature::TensorSignature;

/// Trait for models with a callable inference entry point.
///
/// Implementations are immutable once constructed and stateless across
/// calls: the same input always produces the same output. Computation is
/// dispatched to a `ComputeBackend`, so running a model on the reference
/// `CpuBackend` is the trusted baseline execution path.
pub trait InferenceModel: Send + Sync {
    /// Returns the model's name, used to identify it in reports and
    /// runtime module registries.
    fn name(&self) -> &str;

    /// The declared shape and dtype of the model's input tensor.
    fn input_signature(&self) -> &TensorSignature;

    /// The declared shape and dtype of the model's output tensor.
    fn output_signature(&self) -> &TensorSignature;

    /// Run inference on a single input tensor.
    ///
    /// Must not fail for any well-formed input matching `input_signature()`.
    ///
    /// # Errors
    /// Returns `ModelError::SignatureMismatch` if the input does not match
    /// the declared signature.
    fn infer(&self, input: &Tensor, backend: &dyn ComputeBackend) -> crate::Result<Tensor>;

    /// Lower the model to a replayable graph of tensor operations,
    /// weights included.
    ///
    /// Compilers consume this instead of the opaque model. Models that
    /// wrap an external artifact with no inspectable structure return
    /// `None`, and compilers must reject them.
    fn lower(&self) -> Option<LoweredGraph> {
        None
    }
}
