use crate::scored::ScoredIndex;

/// Returns the indices of the `k` highest scores, highest first.
///
/// `k` is clamped to the score vector's length. Ties keep their original
/// index order (the sort is stable).
pub fn top_k_indices(scores: &[f32], k: usize) -> Vec<usize> {
    let mut scored: Vec<ScoredIndex> = scores
        .iter()
        .enumerate()
        .map(|(index, &score)| ScoredIndex { index, score })
        .collect();

    // Sort descending by score.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k.min(scores.len()));

    scored.into_iter().map(|s| s.index).collect()
}

/// Returns the top `k` entries as (index, probability) pairs, highest first,
/// where probabilities come from a max-shifted softmax over all scores.
///
/// This is the diagnostic view of a classification output: which classes
/// the model picked and how confident it was.
pub fn top_k_probabilities(scores: &[f32], k: usize) -> Vec<ScoredIndex> {
    if scores.is_empty() {
        return vec![];
    }

    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    top_k_indices(scores, k)
        .into_iter()
        .map(|index| ScoredIndex {
            index,
            score: exps[index] / sum,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_top_k_indices() {
        let scores = [0.1, 0.7, 0.05, 0.15];
        assert_eq!(top_k_indices(&scores, 2), vec![1, 3]);
        assert_eq!(top_k_indices(&scores, 4), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_top_k_clamps_k() {
        let scores = [0.3, 0.7];
        assert_eq!(top_k_indices(&scores, 5), vec![1, 0]);
        assert_eq!(top_k_indices(&[], 3), Vec::<usize>::new());
    }

    #[test]
    fn test_top_k_zero() {
        assert_eq!(top_k_indices(&[1.0, 2.0], 0), Vec::<usize>::new());
    }

    #[test]
    fn test_top_k_probabilities() {
        let scores = [0.0, 0.0, f32::ln(2.0)];
        let top = top_k_probabilities(&scores, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].index, 2);
        // exp splits 2:1:1 across the three classes.
        assert_relative_eq!(top[0].score, 0.5, epsilon = 1e-6);
        assert_relative_eq!(top[1].score, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_top_k_probabilities_empty() {
        assert!(top_k_probabilities(&[], 3).is_empty());
    }
}
