use crate::backend::ComputeBackend;
use crate::error::{Result, TensorError};

/// Pure-Rust CPU compute backend.
///
/// Implements all operations with straightforward loops optimized for
/// correctness rather than peak performance. This is the trusted reference
/// execution path that candidate backends are compared against.
#[derive(Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        if a.len() != m * k {
            return Err(TensorError::Other(format!(
                "matmul: a.len()={} but expected m*k={}",
                a.len(),
                m * k
            )));
        }
        if b.len() != k * n {
            return Err(TensorError::Other(format!(
                "matmul: b.len()={} but expected k*n={}",
                b.len(),
                k * n
            )));
        }

        let mut c = vec![0.0f32; m * n];
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0f32;
                for p in 0..k {
                    sum += a[i * k + p] * b[p * n + j];
                }
                c[i * n + j] = sum;
            }
        }
        Ok(c)
    }

    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        if a.len() != b.len() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![a.len()],
                got: vec![b.len()],
            });
        }
        Ok(a.iter().zip(b.iter()).map(|(x, y)| x + y).collect())
    }

    fn relu(&self, x: &[f32]) -> Result<Vec<f32>> {
        Ok(x.iter().map(|v| v.max(0.0)).collect())
    }

    fn softmax(&self, x: &[f32], n_classes: usize) -> Result<Vec<f32>> {
        if n_classes == 0 || x.len() % n_classes != 0 {
            return Err(TensorError::Other(format!(
                "softmax: x.len()={} is not a multiple of n_classes={}",
                x.len(),
                n_classes
            )));
        }

        let mut result = vec![0.0f32; x.len()];
        for (chunk, out) in x.chunks_exact(n_classes).zip(result.chunks_exact_mut(n_classes)) {
            let max = chunk.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let mut sum = 0.0f32;
            for (o, v) in out.iter_mut().zip(chunk.iter()) {
                *o = (v - max).exp();
                sum += *o;
            }
            for o in out.iter_mut() {
                *o /= sum;
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_matmul_identity() {
        let backend = CpuBackend::new();
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let identity = vec![1.0, 0.0, 0.0, 1.0];
        let c = backend.matmul(&a, &identity, 2, 2, 2).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_matmul_length_validation() {
        let backend = CpuBackend::new();
        assert!(backend.matmul(&[1.0; 3], &[1.0; 4], 2, 2, 2).is_err());
        assert!(backend.matmul(&[1.0; 4], &[1.0; 3], 2, 2, 2).is_err());
    }

    #[test]
    fn test_add() {
        let backend = CpuBackend::new();
        let c = backend.add(&[1.0, 2.0], &[3.0, 4.0]).unwrap();
        assert_eq!(c, vec![4.0, 6.0]);
        assert!(backend.add(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_relu() {
        let backend = CpuBackend::new();
        let c = backend.relu(&[-1.0, 0.0, 2.5]).unwrap();
        assert_eq!(c, vec![0.0, 0.0, 2.5]);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let backend = CpuBackend::new();
        let probs = backend.softmax(&[1.0, 2.0, 3.0], 3).unwrap();
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        // Largest logit gets the largest probability.
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_numerical_stability() {
        let backend = CpuBackend::new();
        let probs = backend.softmax(&[1000.0, 1000.0], 2).unwrap();
        assert_relative_eq!(probs[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(probs[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_chunk_validation() {
        let backend = CpuBackend::new();
        assert!(backend.softmax(&[1.0, 2.0, 3.0], 2).is_err());
        assert!(backend.softmax(&[1.0], 0).is_err());
    }
}
