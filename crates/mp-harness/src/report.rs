use std::fmt;

use crate::case::{CaseOutcome, CaseStatus};

/// Collects the outcomes of a batch of equivalence cases.
///
/// Comparison failures are captured rather than raised, so a batch of model
/// tests reports every failure instead of stopping at the first.
#[derive(Debug, Default)]
pub struct Report {
    outcomes: Vec<CaseOutcome>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Report {
            outcomes: Vec::new(),
        }
    }

    /// Record one case outcome.
    pub fn record(&mut self, outcome: CaseOutcome) {
        self.outcomes.push(outcome);
    }

    /// All recorded outcomes, in recording order.
    pub fn outcomes(&self) -> &[CaseOutcome] {
        &self.outcomes
    }

    /// Number of cases that passed.
    pub fn passed(&self) -> usize {
        self.count(CaseStatus::Passed)
    }

    /// Number of cases whose outputs diverged.
    pub fn failed(&self) -> usize {
        self.count(CaseStatus::ComparisonFailed)
    }

    /// Number of cases that errored before comparison.
    pub fn errored(&self) -> usize {
        self.count(CaseStatus::Errored)
    }

    /// Returns true if every recorded case passed.
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(CaseOutcome::passed)
    }

    /// Iterate over the outcomes that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    fn count(&self, status: CaseStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} cases: {} passed, {} failed, {} errored",
            self.outcomes.len(),
            self.passed(),
            self.failed(),
            self.errored()
        )?;
        for outcome in &self.outcomes {
            writeln!(f, "  {}", outcome)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ComparisonResult;
    use crate::error::HarnessError;

    fn outcome(name: &str, status: CaseStatus) -> CaseOutcome {
        CaseOutcome {
            name: name.to_string(),
            status,
            comparison: match status {
                CaseStatus::Errored => None,
                CaseStatus::Passed => Some(ComparisonResult {
                    passed: true,
                    max_abs_deviation: 0.0,
                    mismatched_index: None,
                }),
                CaseStatus::ComparisonFailed => Some(ComparisonResult {
                    passed: false,
                    max_abs_deviation: 0.5,
                    mismatched_index: Some(vec![0]),
                }),
            },
            ranking_agreed: None,
            top_predictions: None,
            outputs: None,
            error: match status {
                CaseStatus::Errored => {
                    Some(HarnessError::Compilation("lowering failed".to_string()))
                }
                _ => None,
            },
        }
    }

    #[test]
    fn test_counts_and_all_passed() {
        let mut report = Report::new();
        report.record(outcome("a", CaseStatus::Passed));
        report.record(outcome("b", CaseStatus::ComparisonFailed));
        report.record(outcome("c", CaseStatus::Errored));
        report.record(outcome("d", CaseStatus::Passed));

        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.errored(), 1);
        assert!(!report.all_passed());
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn test_empty_report_passes() {
        let report = Report::new();
        assert!(report.all_passed());
        assert_eq!(report.outcomes().len(), 0);
    }

    #[test]
    fn test_display_lists_every_case() {
        let mut report = Report::new();
        report.record(outcome("good", CaseStatus::Passed));
        report.record(outcome("bad", CaseStatus::ComparisonFailed));

        let text = report.to_string();
        assert!(text.contains("2 cases: 1 passed, 1 failed, 0 errored"));
        assert!(text.contains("PASS good"));
        assert!(text.contains("FAIL bad"));
    }
}
