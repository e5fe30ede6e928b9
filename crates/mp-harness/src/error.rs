use thiserror::Error;

/// Failure domains of the equivalence harness.
///
/// Compilation, load, and execution errors are fatal to a test case.
/// Numeric divergence is not an error: it is reported through
/// `ComparisonResult` and `CaseOutcome` so a batch can collect every
/// failure instead of stopping at the first.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("compilation failed: {0}")]
    Compilation(String),
    #[error("artifact load failed: {0}")]
    Load(String),
    #[error("candidate execution failed: {0}")]
    Execution(String),
    #[error("baseline execution failed: {0}")]
    Baseline(#[from] mp_model::ModelError),
    #[error("unknown entry point: {0}")]
    UnknownEntryPoint(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
