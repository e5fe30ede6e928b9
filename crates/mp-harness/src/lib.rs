//! `mp-harness` - Cross-backend equivalence harness for model-parity.
//!
//! Decides whether a compiled inference path is numerically equivalent to a
//! trusted baseline. The flow is strictly sequential: run the baseline,
//! compile and load the candidate, run the candidate on the same input,
//! compare the outputs under an absolute tolerance (optionally with a
//! ranked top-k agreement check), and record the verdict.
//!
//! External compilation pipelines and runtimes sit behind the `Compiler`
//! and `Runtime` traits, so the equivalence logic can be exercised with
//! fake implementations returning canned tensors. The in-tree
//! `ReferenceCompiler`/`ReferenceRuntime` pair serializes a model's lowered
//! graph (weights included) and replays it on the same CPU engine the
//! baseline uses, so f32 artifacts compare equal with zero deviation while
//! the half-precision variant models a backend that quantizes weights.

pub mod artifact;
pub mod case;
pub mod compare;
pub mod compiler;
pub mod error;
pub mod reference;
pub mod report;
pub mod runtime;
pub mod sample;

// Re-export primary types at the crate root for convenience.
pub use artifact::CompiledArtifact;
pub use case::{
    compile_and_load, run_baseline, run_candidate, CaseOutcome, CaseStatus, EquivalenceCase,
    TopKCheck, TopPredictions, DEFAULT_TOP_K,
};
pub use compare::{compare, ComparisonResult, DEFAULT_TOLERANCE};
pub use compiler::Compiler;
pub use error::{HarnessError, Result};
pub use reference::{ReferenceCompiler, ReferenceRuntime, REFERENCE_BACKEND};
pub use report::Report;
pub use runtime::{EntryPointFn, Invoker, Runtime, DEFAULT_ENTRY_POINT};
