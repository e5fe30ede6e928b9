/// An output index paired with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredIndex {
    pub index: usize,
    pub score: f32,
}
