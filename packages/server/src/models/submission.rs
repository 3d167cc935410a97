use chrono::{DateTime, Utc};
use common::{JudgeStatus, SubmissionStatus};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::ledger::{RunOutcome, SubmitOutcome, TestCaseRun};
use crate::store::{SolvedEntry, SubmissionRecord};

/// Request body for submitting or running code.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitCodeRequest {
    /// Full program source.
    #[schema(example = "#include <iostream>\nint main() { int a, b; std::cin >> a >> b; std::cout << a + b; }")]
    pub code: String,
    /// Language name. Aliases such as `cpp` or `js` are accepted.
    #[schema(example = "cpp")]
    pub language: String,
}

pub fn validate_submit_code(req: &SubmitCodeRequest, max_code_size: usize) -> Result<(), AppError> {
    if req.code.trim().is_empty() {
        return Err(AppError::Validation("Code must not be empty".into()));
    }
    if req.code.len() > max_code_size {
        return Err(AppError::Validation(format!(
            "Code exceeds maximum size of {max_code_size} bytes"
        )));
    }
    if req.language.trim().is_empty() {
        return Err(AppError::Validation("Language must not be empty".into()));
    }
    Ok(())
}

/// Verdict of a graded submission.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[schema(example = 42)]
    pub submission_id: i32,
    pub accepted: bool,
    pub status: SubmissionStatus,
    #[schema(example = 10)]
    pub total_test_cases: i32,
    #[schema(example = 10)]
    pub passed_test_cases: i32,
    /// Seconds, summed over passing test cases.
    #[schema(example = 0.134)]
    pub runtime: f64,
    /// Kilobytes, peak over passing test cases.
    #[schema(example = 3412)]
    pub memory: i64,
    /// Diagnostic output of the first failing test case.
    pub error_message: Option<String>,
    /// True if this submission solved the problem for the first time.
    pub newly_solved: bool,
}

impl From<SubmitOutcome> for SubmitResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        let s = outcome.submission;
        Self {
            submission_id: s.id,
            accepted: s.status.is_accepted(),
            status: s.status,
            total_test_cases: s.test_cases_total,
            passed_test_cases: s.test_cases_passed,
            runtime: s.runtime,
            memory: s.memory,
            error_message: s.error_message,
            newly_solved: outcome.newly_solved,
        }
    }
}

/// Outcome of one sample test case in run mode.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRunResponse {
    pub test_case_id: i32,
    pub input: String,
    pub expected_output: String,
    pub stdout: Option<String>,
    pub status: JudgeStatus,
    #[schema(example = "Accepted")]
    pub description: String,
    pub time: Option<f64>,
    pub memory: Option<i64>,
    pub diagnostic: Option<String>,
}

impl From<TestCaseRun> for TestCaseRunResponse {
    fn from(run: TestCaseRun) -> Self {
        Self {
            test_case_id: run.test_case_id,
            input: run.input,
            expected_output: run.expected_output,
            stdout: run.stdout,
            description: run.status.description().to_string(),
            status: run.status,
            time: run.time,
            memory: run.memory,
            diagnostic: run.diagnostic,
        }
    }
}

/// Result of running code against the sample test cases.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    /// True if every sample test case passed.
    pub success: bool,
    pub status: SubmissionStatus,
    pub test_cases: Vec<TestCaseRunResponse>,
    pub total_test_cases: i32,
    pub passed_test_cases: i32,
    pub runtime: f64,
    pub memory: i64,
    pub error_message: Option<String>,
}

impl From<RunOutcome> for RunResponse {
    fn from(outcome: RunOutcome) -> Self {
        let v = outcome.verdict;
        Self {
            success: v.is_accepted(),
            status: v.status,
            test_cases: outcome.test_cases.into_iter().map(Into::into).collect(),
            total_test_cases: v.test_cases_total,
            passed_test_cases: v.test_cases_passed,
            runtime: v.runtime,
            memory: v.memory,
            error_message: v.error_message,
        }
    }
}

/// Full submission details.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    pub problem_id: i32,
    pub code: String,
    #[schema(example = "c++")]
    pub language: String,
    pub status: SubmissionStatus,
    pub runtime: f64,
    pub memory: i64,
    pub test_cases_passed: i32,
    pub test_cases_total: i32,
    pub error_message: Option<String>,
    #[schema(example = "2025-10-01T14:30:00Z")]
    pub created_at: DateTime<Utc>,
    /// Null while the submission is pending.
    pub judged_at: Option<DateTime<Utc>>,
}

impl From<SubmissionRecord> for SubmissionResponse {
    fn from(s: SubmissionRecord) -> Self {
        Self {
            id: s.id,
            problem_id: s.problem_id,
            code: s.code,
            language: s.language,
            status: s.status,
            runtime: s.runtime,
            memory: s.memory,
            test_cases_passed: s.test_cases_passed,
            test_cases_total: s.test_cases_total,
            error_message: s.error_message,
            created_at: s.created_at,
            judged_at: s.judged_at,
        }
    }
}

/// Submission summary for list views (code omitted).
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListItem {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "c++")]
    pub language: String,
    pub status: SubmissionStatus,
    pub runtime: f64,
    pub memory: i64,
    pub test_cases_passed: i32,
    pub test_cases_total: i32,
    #[schema(example = "2025-10-01T14:30:00Z")]
    pub created_at: DateTime<Utc>,
}

impl From<SubmissionRecord> for SubmissionListItem {
    fn from(s: SubmissionRecord) -> Self {
        Self {
            id: s.id,
            language: s.language,
            status: s.status,
            runtime: s.runtime,
            memory: s.memory,
            test_cases_passed: s.test_cases_passed,
            test_cases_total: s.test_cases_total,
            created_at: s.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SolvedProblemResponse {
    #[schema(example = 1)]
    pub problem_id: i32,
    #[schema(example = "2025-10-01T14:30:00Z")]
    pub solved_at: DateTime<Utc>,
}

impl From<SolvedEntry> for SolvedProblemResponse {
    fn from(entry: SolvedEntry) -> Self {
        Self {
            problem_id: entry.problem_id,
            solved_at: entry.solved_at,
        }
    }
}
