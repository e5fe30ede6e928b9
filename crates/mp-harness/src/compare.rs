use mp_tensor::Tensor;

/// Default absolute tolerance for elementwise comparison.
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

/// The verdict of one baseline-vs-candidate comparison.
///
/// Derived per comparison, never persisted. `max_abs_deviation` is the
/// largest elementwise absolute difference observed (infinite when the
/// shapes differ or an element is NaN); `mismatched_index` is the
/// coordinate of the worst element when the check fails.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub passed: bool,
    pub max_abs_deviation: f32,
    pub mismatched_index: Option<Vec<usize>>,
}

/// Elementwise closeness check: every element of `candidate` must be within
/// `tolerance` (absolute) of the corresponding `baseline` element.
///
/// A shape mismatch between the two outputs is a failed comparison, not a
/// panic, so batch reports can capture it alongside numeric divergences.
/// NaN in either output is never within tolerance. Empty tensors compare
/// equal with deviation 0.
pub fn compare(baseline: &Tensor, candidate: &Tensor, tolerance: f32) -> ComparisonResult {
    if baseline.shape() != candidate.shape() {
        return ComparisonResult {
            passed: false,
            max_abs_deviation: f32::INFINITY,
            mismatched_index: None,
        };
    }

    let mut max_dev = 0.0f32;
    let mut worst: Option<usize> = None;
    for (i, (a, b)) in baseline
        .data_f32()
        .iter()
        .zip(candidate.data_f32().iter())
        .enumerate()
    {
        let dev = (a - b).abs();
        // NaN never compares within tolerance; rank it worst.
        let dev = if dev.is_nan() { f32::INFINITY } else { dev };
        if dev > max_dev {
            max_dev = dev;
            worst = Some(i);
        }
    }

    let passed = max_dev <= tolerance;
    ComparisonResult {
        passed,
        max_abs_deviation: max_dev,
        mismatched_index: if passed {
            None
        } else {
            worst.map(|i| baseline.shape().unravel(i))
        },
    }
}
