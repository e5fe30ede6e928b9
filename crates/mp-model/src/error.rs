use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("input does not match signature: expected {expected}, got {got}")]
    SignatureMismatch { expected: String, got: String },
    #[error("invalid weights: {0}")]
    InvalidWeights(String),
    #[error("tensor error: {0}")]
    Tensor(#[from] mp_tensor::TensorError),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
