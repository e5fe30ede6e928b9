use crate::top_k::top_k_indices;

/// How the top-k indices of two score vectors are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopKMode {
    /// The index sets must match; rank order within the top k is ignored.
    Set,
    /// The indices must match position by position.
    Ordered,
}

/// Checks whether two score vectors agree on their `k` highest-scoring
/// indices under the given mode.
///
/// Vectors of different lengths never agree. `k` is clamped to the vector
/// length, so `k >= len` compares the full ranking (Ordered) or trivially
/// agrees on the full index set (Set).
pub fn top_k_agreement(baseline: &[f32], candidate: &[f32], k: usize, mode: TopKMode) -> bool {
    if baseline.len() != candidate.len() {
        return false;
    }

    let mut base_top = top_k_indices(baseline, k);
    let mut cand_top = top_k_indices(candidate, k);

    match mode {
        TopKMode::Ordered => base_top == cand_top,
        TopKMode::Set => {
            base_top.sort_unstable();
            cand_top.sort_unstable();
            base_top == cand_top
        }
    }
}
