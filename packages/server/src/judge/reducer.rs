use common::{ExecutionResult, Outcome, SubmissionStatus};
use serde::Serialize;

/// Aggregate outcome of judging one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub status: SubmissionStatus,
    pub test_cases_passed: i32,
    pub test_cases_total: i32,
    /// Seconds, summed over passing test cases only.
    pub runtime: f64,
    /// Kilobytes, peak over passing test cases only.
    pub memory: i64,
    /// Diagnostic of the first failing test case.
    pub error_message: Option<String>,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        self.status.is_accepted()
    }
}

/// Fold per-test results, in test case order, into a single verdict.
///
/// A runtime failure anywhere makes the verdict `Error`; any other failure
/// makes it `Wrong`. Every result is scanned, so passes after a failure
/// still count. The error message comes from the first failing test.
pub fn reduce(results: &[ExecutionResult]) -> Verdict {
    let mut verdict = Verdict {
        status: SubmissionStatus::Accepted,
        test_cases_passed: 0,
        test_cases_total: i32::try_from(results.len()).unwrap_or(i32::MAX),
        runtime: 0.0,
        memory: 0,
        error_message: None,
    };

    for result in results {
        // Non-terminal results never reach the reducer; count them as crashes if they do.
        let outcome = result.status.outcome().unwrap_or(Outcome::RuntimeError);
        match outcome {
            Outcome::Passed => {
                verdict.test_cases_passed = verdict.test_cases_passed.saturating_add(1);
                verdict.runtime += result.time.unwrap_or(0.0);
                verdict.memory = verdict.memory.max(result.memory.unwrap_or(0));
                continue;
            }
            Outcome::RuntimeError => verdict.status = SubmissionStatus::Error,
            Outcome::CompileError | Outcome::Mismatch | Outcome::LimitExceeded => {
                if verdict.status != SubmissionStatus::Error {
                    verdict.status = SubmissionStatus::Wrong;
                }
            }
        }
        if verdict.error_message.is_none() {
            verdict.error_message = Some(result.diagnostic());
        }
    }

    verdict
}
