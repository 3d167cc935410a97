use async_trait::async_trait;
use chrono::Utc;
use common::SubmissionStatus;
use common::judge_job::TestCaseData;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use super::{
    NewSubmission, ProblemStore, SolvedEntry, SolvedSetStore, StoreError, SubmissionRecord,
    SubmissionStore, TestCaseSet,
};
use crate::entity::{problem, solved_problem, submission, test_case};
use crate::judge::Verdict;

/// sea-orm backed implementation of every store trait.
#[derive(Clone)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<submission::Model> for SubmissionRecord {
    fn from(m: submission::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            problem_id: m.problem_id,
            code: m.code,
            language: m.language,
            status: m.status,
            runtime: m.runtime,
            memory: m.memory,
            test_cases_passed: m.test_cases_passed,
            test_cases_total: m.test_cases_total,
            error_message: m.error_message,
            created_at: m.created_at,
            judged_at: m.judged_at,
        }
    }
}

#[async_trait]
impl ProblemStore for DbStore {
    async fn test_cases(
        &self,
        problem_id: i32,
        set: TestCaseSet,
    ) -> Result<Option<Vec<TestCaseData>>, StoreError> {
        if problem::Entity::find_by_id(problem_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let rows = test_case::Entity::find()
            .filter(test_case::Column::ProblemId.eq(problem_id))
            .filter(test_case::Column::IsSample.eq(set == TestCaseSet::Visible))
            .order_by_asc(test_case::Column::Position)
            .order_by_asc(test_case::Column::Id)
            .all(&self.db)
            .await?;

        Ok(Some(
            rows.into_iter()
                .map(|tc| TestCaseData {
                    id: tc.id,
                    input: tc.input,
                    expected_output: tc.expected_output,
                })
                .collect(),
        ))
    }
}

#[async_trait]
impl SubmissionStore for DbStore {
    async fn create_pending(&self, new: NewSubmission) -> Result<SubmissionRecord, StoreError> {
        let model = submission::ActiveModel {
            code: Set(new.code),
            language: Set(new.language.as_str().to_string()),
            status: Set(SubmissionStatus::Pending),
            runtime: Set(0.0),
            memory: Set(0),
            test_cases_passed: Set(0),
            test_cases_total: Set(new.test_cases_total),
            error_message: Set(None),
            user_id: Set(new.user_id),
            problem_id: Set(new.problem_id),
            created_at: Set(Utc::now()),
            judged_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(model.into())
    }

    async fn complete(
        &self,
        id: i32,
        verdict: &Verdict,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        let update = submission::ActiveModel {
            status: Set(verdict.status),
            runtime: Set(verdict.runtime),
            memory: Set(verdict.memory),
            test_cases_passed: Set(verdict.test_cases_passed),
            test_cases_total: Set(verdict.test_cases_total),
            error_message: Set(verdict.error_message.clone()),
            judged_at: Set(Some(Utc::now())),
            ..Default::default()
        };

        let result = submission::Entity::update_many()
            .set(update)
            .filter(submission::Column::Id.eq(id))
            .filter(submission::Column::Status.eq(SubmissionStatus::Pending))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find(id).await
    }

    async fn find(&self, id: i32) -> Result<Option<SubmissionRecord>, StoreError> {
        Ok(submission::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Into::into))
    }

    async fn list_for_user_problem(
        &self,
        user_id: i32,
        problem_id: i32,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        let rows = submission::Entity::find()
            .filter(submission::Column::UserId.eq(user_id))
            .filter(submission::Column::ProblemId.eq(problem_id))
            .order_by_desc(submission::Column::CreatedAt)
            .order_by_desc(submission::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl SolvedSetStore for DbStore {
    async fn insert_if_absent(&self, user_id: i32, problem_id: i32) -> Result<bool, StoreError> {
        let model = solved_problem::ActiveModel {
            user_id: Set(user_id),
            problem_id: Set(problem_id),
            solved_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = solved_problem::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    solved_problem::Column::UserId,
                    solved_problem::Column::ProblemId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;

        match result {
            Ok(0) | Err(DbErr::RecordNotInserted) => Ok(false),
            Ok(_) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, user_id: i32) -> Result<Vec<SolvedEntry>, StoreError> {
        let rows = solved_problem::Entity::find()
            .filter(solved_problem::Column::UserId.eq(user_id))
            .order_by_asc(solved_problem::Column::SolvedAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| SolvedEntry {
                problem_id: row.problem_id,
                solved_at: row.solved_at,
            })
            .collect())
    }
}
