//! `mp-rank` - Top-k ranking and agreement checks for model-parity.
//!
//! Classification outputs from two inference paths may drift slightly in raw
//! score while still producing the same decision. This crate extracts the
//! k highest-scoring output indices and checks whether two score vectors
//! agree on them, either as an unordered set or as an ordered list.

pub mod agreement;
pub mod scored;
pub mod top_k;

pub use agreement::{top_k_agreement, TopKMode};
pub use scored::ScoredIndex;
pub use top_k::{top_k_indices, top_k_probabilities};
