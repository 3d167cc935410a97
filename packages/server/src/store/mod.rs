//! Persistence seams used by the ledger and the progress tracker.

pub mod db;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::judge_job::TestCaseData;
use common::{Language, SubmissionStatus};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::judge::Verdict;

pub use db::DbStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Which of a problem's test cases to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestCaseSet {
    /// Sample cases shown to the user, used by run mode.
    Visible,
    /// Grading cases, used by submit mode.
    Hidden,
}

/// A submission as stored, independent of the storage backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRecord {
    pub id: i32,
    pub user_id: i32,
    pub problem_id: i32,
    pub code: String,
    pub language: String,
    pub status: SubmissionStatus,
    pub runtime: f64,
    pub memory: i64,
    pub test_cases_passed: i32,
    pub test_cases_total: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub judged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: i32,
    pub problem_id: i32,
    pub code: String,
    pub language: Language,
    pub test_cases_total: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolvedEntry {
    pub problem_id: i32,
    pub solved_at: DateTime<Utc>,
}

#[async_trait]
pub trait ProblemStore: Send + Sync {
    /// Test cases of one set in (position, id) order, or `None` if the problem
    /// does not exist.
    async fn test_cases(
        &self,
        problem_id: i32,
        set: TestCaseSet,
    ) -> Result<Option<Vec<TestCaseData>>, StoreError>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn create_pending(&self, new: NewSubmission) -> Result<SubmissionRecord, StoreError>;

    /// Commit a verdict if the submission is still pending.
    ///
    /// Returns `None` when the submission is missing or already terminal, in
    /// which case nothing is written.
    async fn complete(
        &self,
        id: i32,
        verdict: &Verdict,
    ) -> Result<Option<SubmissionRecord>, StoreError>;

    async fn find(&self, id: i32) -> Result<Option<SubmissionRecord>, StoreError>;

    /// Newest first.
    async fn list_for_user_problem(
        &self,
        user_id: i32,
        problem_id: i32,
    ) -> Result<Vec<SubmissionRecord>, StoreError>;
}

#[async_trait]
pub trait SolvedSetStore: Send + Sync {
    /// Returns true if a new entry was written.
    async fn insert_if_absent(&self, user_id: i32, problem_id: i32) -> Result<bool, StoreError>;

    /// Oldest first.
    async fn list(&self, user_id: i32) -> Result<Vec<SolvedEntry>, StoreError>;
}
