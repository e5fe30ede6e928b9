use std::fmt;

use mp_model::InferenceModel;
use mp_rank::{top_k_agreement, top_k_probabilities, ScoredIndex, TopKMode};
use mp_tensor::{CpuBackend, Tensor};

use crate::compare::{compare, ComparisonResult, DEFAULT_TOLERANCE};
use crate::compiler::Compiler;
use crate::error::{HarnessError, Result};
use crate::runtime::{Invoker, Runtime, DEFAULT_ENTRY_POINT};

/// Default number of top-ranked indices checked for agreement.
pub const DEFAULT_TOP_K: usize = 3;

/// Execute the trusted reference path: the model itself on `CpuBackend`.
///
/// # Errors
/// Any failure here is a test error (`HarnessError::Baseline`), never a
/// comparison failure.
pub fn run_baseline(model: &dyn InferenceModel, input: &Tensor) -> Result<Tensor> {
    Ok(model.infer(input, &CpuBackend::new())?)
}

/// Compile a model and load the artifact into an executable invoker.
///
/// The two failure domains stay distinct: lowering/codegen problems surface
/// as `HarnessError::Compilation` from the compiler, instantiation problems
/// as `HarnessError::Load` from the runtime.
pub fn compile_and_load(
    compiler: &dyn Compiler,
    runtime: &dyn Runtime,
    model: &dyn InferenceModel,
) -> Result<Invoker> {
    let artifact = compiler.compile(model)?;
    runtime.load(&artifact)
}

/// Execute the compiled path through the conventional `forward` entry point.
pub fn run_candidate(invoker: &Invoker, input: &Tensor) -> Result<Tensor> {
    invoker.invoke(DEFAULT_ENTRY_POINT, input)
}

/// Optional ranked agreement check layered on top of the tolerance check.
#[derive(Debug, Clone, Copy)]
pub struct TopKCheck {
    pub k: usize,
    pub mode: TopKMode,
}

impl Default for TopKCheck {
    fn default() -> Self {
        TopKCheck {
            k: DEFAULT_TOP_K,
            mode: TopKMode::Set,
        }
    }
}

/// The top-k class predictions of both paths, as (index, probability)
/// pairs, highest first. Recorded whenever a ranking check runs, so a
/// disagreement report can show which classes each path picked and how
/// confident it was.
#[derive(Debug, Clone)]
pub struct TopPredictions {
    pub baseline: Vec<ScoredIndex>,
    pub candidate: Vec<ScoredIndex>,
}

/// How a test case ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    /// Outputs agreed within tolerance (and on ranking, if checked).
    Passed,
    /// Outputs diverged beyond tolerance or disagreed on ranking.
    ComparisonFailed,
    /// Compilation, load, or execution raised; no comparison happened.
    Errored,
}

/// The recorded outcome of one equivalence test case.
///
/// On comparison failure both outputs are kept for diagnosis; on error the
/// originating `HarnessError` is kept instead.
#[derive(Debug)]
pub struct CaseOutcome {
    pub name: String,
    pub status: CaseStatus,
    pub comparison: Option<ComparisonResult>,
    pub ranking_agreed: Option<bool>,
    pub top_predictions: Option<TopPredictions>,
    pub outputs: Option<(Tensor, Tensor)>,
    pub error: Option<HarnessError>,
}

impl CaseOutcome {
    fn errored(name: &str, error: HarnessError) -> Self {
        CaseOutcome {
            name: name.to_string(),
            status: CaseStatus::Errored,
            comparison: None,
            ranking_agreed: None,
            top_predictions: None,
            outputs: None,
            error: Some(error),
        }
    }

    /// Returns true if the case passed.
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            CaseStatus::Passed => {
                let dev = self
                    .comparison
                    .as_ref()
                    .map(|c| c.max_abs_deviation)
                    .unwrap_or(0.0);
                write!(f, "PASS {} (max deviation {:e})", self.name, dev)
            }
            CaseStatus::ComparisonFailed => {
                write!(f, "FAIL {}", self.name)?;
                if let Some(c) = &self.comparison {
                    write!(f, ": max deviation {:e}", c.max_abs_deviation)?;
                    if let Some(idx) = &c.mismatched_index {
                        write!(f, " at {:?}", idx)?;
                    }
                }
                if self.ranking_agreed == Some(false) {
                    write!(f, " (top-k ranking disagreed)")?;
                    if let Some(top) = &self.top_predictions {
                        write!(
                            f,
                            "\n  baseline top-k:  {}\n  candidate top-k: {}",
                            format_predictions(&top.baseline),
                            format_predictions(&top.candidate)
                        )?;
                    }
                }
                Ok(())
            }
            CaseStatus::Errored => match &self.error {
                Some(e) => write!(f, "ERROR {}: {}", self.name, e),
                None => write!(f, "ERROR {}", self.name),
            },
        }
    }
}

/// Renders predictions as "[3: 71.2%, 1: 20.4%, 0: 8.4%]".
fn format_predictions(predictions: &[ScoredIndex]) -> String {
    let entries: Vec<String> = predictions
        .iter()
        .map(|p| format!("{}: {:.1}%", p.index, p.score * 100.0))
        .collect();
    format!("[{}]", entries.join(", "))
}

/// One equivalence test case: a model, a tolerance, and an optional
/// ranked top-k agreement check.
///
/// `run` drives the full sequence: baseline → compile → load → candidate →
/// compare, reusing the same input tensor for both executions. Compilation,
/// load, and execution errors end the case; numeric divergence is recorded
/// in the outcome with full diagnostics.
pub struct EquivalenceCase<'a> {
    name: String,
    model: &'a dyn InferenceModel,
    tolerance: f32,
    top_k: Option<TopKCheck>,
    entry_point: String,
}

impl<'a> EquivalenceCase<'a> {
    /// Create a case with the default tolerance and no ranking check.
    pub fn new(name: impl Into<String>, model: &'a dyn InferenceModel) -> Self {
        EquivalenceCase {
            name: name.into(),
            model,
            tolerance: DEFAULT_TOLERANCE,
            top_k: None,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }

    /// Set the absolute tolerance for the elementwise check.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Additionally require top-k ranked agreement between the outputs.
    pub fn with_top_k(mut self, k: usize, mode: TopKMode) -> Self {
        self.top_k = Some(TopKCheck { k, mode });
        self
    }

    /// Invoke the candidate through a non-default entry point.
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }

    /// Run the case: compare the baseline output against the compiled
    /// candidate's output on the same input.
    pub fn run(
        &self,
        compiler: &dyn Compiler,
        runtime: &dyn Runtime,
        input: &Tensor,
    ) -> CaseOutcome {
        let baseline = match run_baseline(self.model, input) {
            Ok(t) => t,
            Err(e) => return CaseOutcome::errored(&self.name, e),
        };

        let invoker = match compile_and_load(compiler, runtime, self.model) {
            Ok(inv) => inv,
            Err(e) => return CaseOutcome::errored(&self.name, e),
        };

        let candidate = match invoker.invoke(&self.entry_point, input) {
            Ok(t) => t,
            Err(e) => return CaseOutcome::errored(&self.name, e),
        };

        let comparison = compare(&baseline, &candidate, self.tolerance);
        let ranking_agreed = self.top_k.map(|check| {
            top_k_agreement(
                baseline.data_f32(),
                candidate.data_f32(),
                check.k,
                check.mode,
            )
        });
        let top_predictions = self.top_k.map(|check| TopPredictions {
            baseline: top_k_probabilities(baseline.data_f32(), check.k),
            candidate: top_k_probabilities(candidate.data_f32(), check.k),
        });

        let passed = comparison.passed && ranking_agreed != Some(false);
        CaseOutcome {
            name: self.name.clone(),
            status: if passed {
                CaseStatus::Passed
            } else {
                CaseStatus::ComparisonFailed
            },
            outputs: if passed {
                None
            } else {
                Some((baseline, candidate))
            },
            comparison: Some(comparison),
            ranking_agreed,
            top_predictions,
            error: None,
        }
    }
}
