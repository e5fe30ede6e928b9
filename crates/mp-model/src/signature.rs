use std::fmt;

use mp_tensor::{DType, Shape, Tensor};

use crate::error::{ModelError, Result};

/// The declared shape and element type of a model input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSignature {
    shape: Shape,
    dtype: DType,
}

impl TensorSignature {
    /// Create a new signature from a shape and dtype.
    pub fn new(shape: Shape, dtype: DType) -> Self {
        TensorSignature { shape, dtype }
    }

    /// Convenience constructor for an f32 signature.
    pub fn f32(dims: Vec<usize>) -> Self {
        TensorSignature {
            shape: Shape::new(dims),
            dtype: DType::F32,
        }
    }

    /// Returns the declared shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the declared dtype.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns true if the tensor matches this signature exactly.
    pub fn matches(&self, tensor: &Tensor) -> bool {
        tensor.shape() == &self.shape && tensor.dtype() == self.dtype
    }

    /// Validate a tensor against this signature.
    ///
    /// # Errors
    /// Returns `ModelError::SignatureMismatch` if shape or dtype differ.
    pub fn check(&self, tensor: &Tensor) -> Result<()> {
        if self.matches(tensor) {
            Ok(())
        } else {
            Err(ModelError::SignatureMismatch {
                expected: self.to_string(),
                got: format!("{}{}", tensor.dtype(), tensor.shape()),
            })
        }
    }
}

impl fmt::Display for TensorSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.dtype, self.shape)
    }
}
