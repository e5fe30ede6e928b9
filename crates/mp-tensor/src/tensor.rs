use crate::backend::ComputeBackend;
use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// A tensor backed by CPU storage.
///
/// Holds contiguous, row-major f32 data with an associated shape and dtype.
/// Operations that require computation are dispatched to a `ComputeBackend`.
#[derive(Debug, Clone)]
pub struct Tensor {
    storage: CpuStorage,
    shape: Shape,
    dtype: DType,
}

impl Tensor {
    /// Create a new tensor from f32 data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {:?} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Tensor {
            storage: CpuStorage::from_f32_vec(data),
            shape,
            dtype: DType::F32,
        }
    }

    /// Create a zero-filled tensor with the given shape.
    pub fn zeros(shape: Shape) -> Self {
        let n = shape.numel();
        Tensor {
            storage: CpuStorage::from_f32_vec(vec![0.0; n]),
            shape,
            dtype: DType::F32,
        }
    }

    /// Create a tensor from little-endian f32 bytes.
    ///
    /// # Errors
    /// Returns an error if the byte length does not match the shape.
    pub fn from_le_bytes(data: &[u8], shape: Shape) -> Result<Tensor> {
        let numel = shape.numel();
        if data.len() != numel * 4 {
            return Err(TensorError::Other(format!(
                "byte length {} does not match shape {} ({} f32 elements)",
                data.len(),
                shape,
                numel
            )));
        }
        let mut out = Vec::with_capacity(numel);
        for chunk in data.chunks_exact(4) {
            out.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        Ok(Tensor::new(out, shape))
    }

    /// Create a tensor from little-endian f16 bytes, widening to f32 storage.
    ///
    /// # Errors
    /// Returns an error if the byte length does not match the shape.
    pub fn from_f16_le_bytes(data: &[u8], shape: Shape) -> Result<Tensor> {
        let numel = shape.numel();
        if data.len() != numel * 2 {
            return Err(TensorError::Other(format!(
                "byte length {} does not match shape {} ({} f16 elements)",
                data.len(),
                shape,
                numel
            )));
        }
        let mut out = Vec::with_capacity(numel);
        for chunk in data.chunks_exact(2) {
            let h = half::f16::from_le_bytes([chunk[0], chunk[1]]);
            out.push(h.to_f32());
        }
        Ok(Tensor::new(out, shape))
    }

    /// Serialize the tensor's data as little-endian f32 bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let data = self.data_f32();
        let mut out = Vec::with_capacity(data.len() * 4);
        for v in data {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    /// Serialize the tensor's data as little-endian f16 bytes, rounding
    /// each element to half precision.
    pub fn to_f16_le_bytes(&self) -> Vec<u8> {
        let data = self.data_f32();
        let mut out = Vec::with_capacity(data.len() * 2);
        for v in data {
            out.extend_from_slice(&half::f16::from_f32(*v).to_le_bytes());
        }
        out
    }

    /// Returns a reference to the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the underlying data as an f32 slice.
    ///
    /// # Panics
    /// Panics if the storage is not F32 (all current storage is F32).
    pub fn data_f32(&self) -> &[f32] {
        self.storage
            .as_f32_slice()
            .expect("tensor storage is not F32")
    }

    /// Reshape the tensor, returning a new tensor with the same data but
    /// a different shape.
    ///
    /// The total number of elements must remain the same.
    pub fn reshape(&self, new_shape: Shape) -> Result<Tensor> {
        if self.shape.numel() != new_shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.dims().to_vec(),
                got: new_shape.dims().to_vec(),
            });
        }
        Ok(Tensor {
            storage: self.storage.clone(),
            shape: new_shape,
            dtype: self.dtype,
        })
    }

    /// Matrix multiplication of two 2D tensors using the given backend.
    ///
    /// self is [m, k], other is [k, n], result is [m, n].
    pub fn matmul(&self, other: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        if self.shape.ndim() != 2 || other.shape.ndim() != 2 {
            return Err(TensorError::Other(
                "matmul requires 2D tensors".to_string(),
            ));
        }

        let m = self.shape.dim(0);
        let k = self.shape.dim(1);
        let k2 = other.shape.dim(0);
        let n = other.shape.dim(1);

        if k != k2 {
            return Err(TensorError::MatmulMismatch { m, k, k2, n });
        }

        let result_data = backend.matmul(self.data_f32(), other.data_f32(), m, k, n)?;
        Ok(Tensor::new(result_data, Shape::new(vec![m, n])))
    }
}
