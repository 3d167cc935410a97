use std::sync::Arc;

use common::judge_job::{ExecutionJob, TestCaseData};
use common::{ExecutionResult, JudgeStatus, Language};
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

use crate::config::JudgeAppConfig;
use crate::error::AppError;
use crate::judge::{JudgeClient, PollSettings, Verdict, dispatch, poll_until_terminal, reduce};
use crate::progress::ProgressTracker;
use crate::store::{
    NewSubmission, ProblemStore, SolvedEntry, SubmissionRecord, SubmissionStore, TestCaseSet,
};

/// Result of a graded submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// The submission after its verdict was committed.
    pub submission: SubmissionRecord,
    /// True if this submission added the problem to the user's solved set.
    pub newly_solved: bool,
}

/// Per-test detail returned by run mode.
#[derive(Debug, Clone)]
pub struct TestCaseRun {
    pub test_case_id: i32,
    pub input: String,
    pub expected_output: String,
    pub stdout: Option<String>,
    pub status: JudgeStatus,
    pub time: Option<f64>,
    pub memory: Option<i64>,
    /// Set when the test case did not pass.
    pub diagnostic: Option<String>,
}

/// Result of an ungraded run against the sample test cases.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub verdict: Verdict,
    pub test_cases: Vec<TestCaseRun>,
}

/// Owns the submission lifecycle: a graded submission is stored as pending,
/// judged, and committed with its verdict exactly once.
pub struct SubmissionLedger {
    judge: Arc<dyn JudgeClient>,
    problems: Arc<dyn ProblemStore>,
    submissions: Arc<dyn SubmissionStore>,
    progress: ProgressTracker,
    poll: PollSettings,
    /// Bounds how many submissions are with the judge at once.
    permits: Semaphore,
}

impl SubmissionLedger {
    pub fn new(
        judge: Arc<dyn JudgeClient>,
        problems: Arc<dyn ProblemStore>,
        submissions: Arc<dyn SubmissionStore>,
        progress: ProgressTracker,
        config: &JudgeAppConfig,
    ) -> Self {
        Self {
            judge,
            problems,
            submissions,
            progress,
            poll: PollSettings::from(config),
            permits: Semaphore::new(config.max_concurrent_judgings.max(1)),
        }
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Judge `code` against the problem's hidden test cases and record the verdict.
    ///
    /// If judging fails the submission stays pending and the error is returned.
    #[instrument(skip(self, code, language))]
    pub async fn submit(
        &self,
        user_id: i32,
        problem_id: i32,
        code: &str,
        language: &str,
    ) -> Result<SubmitOutcome, AppError> {
        let language = Language::resolve(language)?;
        let test_cases = self.load_test_cases(problem_id, TestCaseSet::Hidden).await?;

        let pending = self
            .submissions
            .create_pending(NewSubmission {
                user_id,
                problem_id,
                code: code.to_string(),
                language,
                test_cases_total: case_count(test_cases.len())?,
            })
            .await?;
        info!(
            submission_id = pending.id,
            test_cases = test_cases.len(),
            "Created pending submission"
        );

        self.judge_and_commit(pending, language, &test_cases).await
    }

    /// Judge `code` against the problem's sample test cases. Nothing is stored.
    #[instrument(skip(self, code, language))]
    pub async fn run(
        &self,
        user_id: i32,
        problem_id: i32,
        code: &str,
        language: &str,
    ) -> Result<RunOutcome, AppError> {
        let language = Language::resolve(language)?;
        let test_cases = self.load_test_cases(problem_id, TestCaseSet::Visible).await?;

        let judged = self.execute(code, language, &test_cases).await?;
        let verdict = reduce(&judged.iter().map(|(_, r)| r.clone()).collect::<Vec<_>>());

        let test_cases = judged
            .into_iter()
            .map(|(job, result)| {
                let tc = &test_cases[job.position];
                TestCaseRun {
                    diagnostic: (result.status != JudgeStatus::Accepted)
                        .then(|| result.diagnostic()),
                    test_case_id: job.test_case_id,
                    input: tc.input.clone(),
                    expected_output: tc.expected_output.clone(),
                    stdout: result.stdout,
                    status: result.status,
                    time: result.time,
                    memory: result.memory,
                }
            })
            .collect();

        Ok(RunOutcome {
            verdict,
            test_cases,
        })
    }

    /// Judge a submission that was left pending by an earlier failure.
    #[instrument(skip(self))]
    pub async fn rejudge_pending(
        &self,
        user_id: i32,
        submission_id: i32,
    ) -> Result<SubmitOutcome, AppError> {
        let pending = self.get(user_id, submission_id).await?;
        if pending.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Submission {submission_id} has already been judged"
            )));
        }

        let language = Language::resolve(&pending.language)?;
        let test_cases = self
            .load_test_cases(pending.problem_id, TestCaseSet::Hidden)
            .await?;

        self.judge_and_commit(pending, language, &test_cases).await
    }

    /// A submission owned by `user_id`. Other users' submissions are reported as missing.
    pub async fn get(&self, user_id: i32, submission_id: i32) -> Result<SubmissionRecord, AppError> {
        self.submissions
            .find(submission_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Submission not found".into()))
    }

    /// The user's submissions for one problem, newest first.
    pub async fn list_for_problem(
        &self,
        user_id: i32,
        problem_id: i32,
    ) -> Result<Vec<SubmissionRecord>, AppError> {
        Ok(self
            .submissions
            .list_for_user_problem(user_id, problem_id)
            .await?)
    }

    pub async fn solved_problems(&self, user_id: i32) -> Result<Vec<SolvedEntry>, AppError> {
        Ok(self.progress.solved_problems(user_id).await?)
    }

    async fn load_test_cases(
        &self,
        problem_id: i32,
        set: TestCaseSet,
    ) -> Result<Vec<TestCaseData>, AppError> {
        let test_cases = self
            .problems
            .test_cases(problem_id, set)
            .await?
            .ok_or(AppError::ProblemNotFound)?;
        case_count(test_cases.len())?;
        Ok(test_cases)
    }

    /// Dispatch, then poll. Holds a judging permit for the whole exchange.
    ///
    /// Each result is paired with the job it answers, in test case order.
    async fn execute(
        &self,
        code: &str,
        language: Language,
        test_cases: &[TestCaseData],
    ) -> Result<Vec<(ExecutionJob, ExecutionResult)>, AppError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| AppError::Internal(format!("judging permits closed: {e}")))?;

        let jobs = dispatch(self.judge.as_ref(), code, language, test_cases).await?;
        let tokens: Vec<String> = jobs.iter().map(|job| job.token.clone()).collect();
        let results = poll_until_terminal(self.judge.as_ref(), &tokens, &self.poll).await?;
        Ok(jobs.into_iter().zip(results).collect())
    }

    async fn judge_and_commit(
        &self,
        pending: SubmissionRecord,
        language: Language,
        test_cases: &[TestCaseData],
    ) -> Result<SubmitOutcome, AppError> {
        let submission_id = pending.id;
        let results: Vec<ExecutionResult> = self
            .execute(&pending.code, language, test_cases)
            .await
            .inspect_err(|e| {
                warn!(submission_id, error = ?e, "Judging failed, submission left pending")
            })?
            .into_iter()
            .map(|(_, result)| result)
            .collect();

        let verdict = reduce(&results);
        let submission = self
            .submissions
            .complete(submission_id, &verdict)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!("Submission {submission_id} has already been judged"))
            })?;
        info!(
            submission_id,
            status = %verdict.status,
            passed = verdict.test_cases_passed,
            total = verdict.test_cases_total,
            "Verdict committed"
        );

        let newly_solved = if verdict.is_accepted() {
            // Verdict is committed at this point; progress failures are only logged.
            match self
                .progress
                .record_solved(submission.user_id, submission.problem_id)
                .await
            {
                Ok(inserted) => inserted,
                Err(e) => {
                    error!(submission_id, error = %e, "Failed to record solved problem");
                    false
                }
            }
        } else {
            false
        };

        Ok(SubmitOutcome {
            submission,
            newly_solved,
        })
    }
}

/// Test case count as stored on a submission row.
fn case_count(len: usize) -> Result<i32, AppError> {
    i32::try_from(len).map_err(|_| AppError::Internal(format!("too many test cases: {len}")))
}
