//! `mp-model` - Inference model abstraction and reference models for model-parity.
//!
//! A model is an opaque artifact with a callable inference entry point and a
//! declared input/output tensor signature. This crate defines the
//! `InferenceModel` trait plus two small deterministic reference models
//! (a linear classifier and a two-layer MLP) used by the equivalence harness
//! and its tests.

pub mod error;
pub mod linear;
pub mod lowered;
pub mod mlp;
pub mod model;
pub mod signature;

pub use error::{ModelError, Result};
pub use linear::LinearClassifier;
pub use lowered::{LayerIr, LoweredGraph};
pub use mlp::Mlp;
pub use model::InferenceModel;
pub use signature::TensorSignature;
