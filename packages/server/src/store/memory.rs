use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use common::SubmissionStatus;
use common::judge_job::TestCaseData;
use tokio::sync::Mutex;

use super::{
    NewSubmission, ProblemStore, SolvedEntry, SolvedSetStore, StoreError, SubmissionRecord,
    SubmissionStore, TestCaseSet,
};
use crate::judge::Verdict;

#[derive(Debug, Clone)]
struct StoredTestCase {
    data: TestCaseData,
    is_sample: bool,
    position: i32,
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    problems: HashMap<i32, String>,
    test_cases: HashMap<i32, Vec<StoredTestCase>>,
    submissions: BTreeMap<i32, SubmissionRecord>,
    solved: BTreeMap<(i32, i32), SolvedEntry>,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store for development and tests. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_problem(&self, title: &str) -> i32 {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        inner.problems.insert(id, title.to_string());
        inner.test_cases.insert(id, Vec::new());
        id
    }

    /// Appends a test case after the problem's existing ones and returns its id.
    pub async fn add_test_case(
        &self,
        problem_id: i32,
        input: &str,
        expected_output: &str,
        is_sample: bool,
    ) -> i32 {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        let cases = inner.test_cases.entry(problem_id).or_default();
        let position = i32::try_from(cases.len()).unwrap_or(i32::MAX);
        cases.push(StoredTestCase {
            data: TestCaseData {
                id,
                input: input.to_string(),
                expected_output: expected_output.to_string(),
            },
            is_sample,
            position,
        });
        id
    }
}

#[async_trait]
impl ProblemStore for MemoryStore {
    async fn test_cases(
        &self,
        problem_id: i32,
        set: TestCaseSet,
    ) -> Result<Option<Vec<TestCaseData>>, StoreError> {
        let inner = self.inner.lock().await;
        if !inner.problems.contains_key(&problem_id) {
            return Ok(None);
        }

        let want_sample = set == TestCaseSet::Visible;
        let mut cases: Vec<&StoredTestCase> = inner
            .test_cases
            .get(&problem_id)
            .map(|cases| cases.iter().filter(|tc| tc.is_sample == want_sample).collect())
            .unwrap_or_default();
        cases.sort_by_key(|tc| (tc.position, tc.data.id));

        Ok(Some(cases.into_iter().map(|tc| tc.data.clone()).collect()))
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn create_pending(&self, new: NewSubmission) -> Result<SubmissionRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        let record = SubmissionRecord {
            id,
            user_id: new.user_id,
            problem_id: new.problem_id,
            code: new.code,
            language: new.language.as_str().to_string(),
            status: SubmissionStatus::Pending,
            runtime: 0.0,
            memory: 0,
            test_cases_passed: 0,
            test_cases_total: new.test_cases_total,
            error_message: None,
            created_at: Utc::now(),
            judged_at: None,
        };
        inner.submissions.insert(id, record.clone());
        Ok(record)
    }

    async fn complete(
        &self,
        id: i32,
        verdict: &Verdict,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(record) = inner.submissions.get_mut(&id) else {
            return Ok(None);
        };
        if record.status != SubmissionStatus::Pending {
            return Ok(None);
        }

        record.status = verdict.status;
        record.runtime = verdict.runtime;
        record.memory = verdict.memory;
        record.test_cases_passed = verdict.test_cases_passed;
        record.test_cases_total = verdict.test_cases_total;
        record.error_message = verdict.error_message.clone();
        record.judged_at = Some(Utc::now());
        Ok(Some(record.clone()))
    }

    async fn find(&self, id: i32) -> Result<Option<SubmissionRecord>, StoreError> {
        Ok(self.inner.lock().await.submissions.get(&id).cloned())
    }

    async fn list_for_user_problem(
        &self,
        user_id: i32,
        problem_id: i32,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .submissions
            .values()
            .rev()
            .filter(|s| s.user_id == user_id && s.problem_id == problem_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SolvedSetStore for MemoryStore {
    async fn insert_if_absent(&self, user_id: i32, problem_id: i32) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.solved.contains_key(&(user_id, problem_id)) {
            return Ok(false);
        }
        inner.solved.insert(
            (user_id, problem_id),
            SolvedEntry {
                problem_id,
                solved_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn list(&self, user_id: i32) -> Result<Vec<SolvedEntry>, StoreError> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<SolvedEntry> = inner
            .solved
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .map(|(_, entry)| entry.clone())
            .collect();
        entries.sort_by_key(|e| e.solved_at);
        Ok(entries)
    }
}
