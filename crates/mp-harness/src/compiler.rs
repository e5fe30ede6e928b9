use std::fmt::Debug;

use mp_model::InferenceModel;

use crate::artifact::CompiledArtifact;
use crate::error::Result;

/// Trait for ahead-of-time compilers that lower a model to a
/// backend-specific artifact.
///
/// Implementations wrap an external compilation pipeline; the harness only
/// cares that a model goes in and opaque bytes come out. Lowering or
/// codegen failures are reported as `HarnessError::Compilation`.
pub trait Compiler: Send + Sync + Debug {
    /// Returns the name of this compiler (e.g., "reference").
    fn name(&self) -> &str;

    /// Lower the model to a compiled artifact.
    ///
    /// # Errors
    /// Returns `HarnessError::Compilation` if the model cannot be lowered.
    fn compile(&self, model: &dyn InferenceModel) -> Result<CompiledArtifact>;
}
