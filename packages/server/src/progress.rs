use std::sync::Arc;

use tracing::{info, instrument};

use crate::store::{SolvedEntry, SolvedSetStore, StoreError};

/// Records which problems each user has solved.
#[derive(Clone)]
pub struct ProgressTracker {
    solved: Arc<dyn SolvedSetStore>,
}

impl ProgressTracker {
    pub fn new(solved: Arc<dyn SolvedSetStore>) -> Self {
        Self { solved }
    }

    /// Add `problem_id` to the user's solved set. Idempotent; returns true only
    /// for the call that actually added it.
    #[instrument(skip(self))]
    pub async fn record_solved(&self, user_id: i32, problem_id: i32) -> Result<bool, StoreError> {
        let inserted = self.solved.insert_if_absent(user_id, problem_id).await?;
        if inserted {
            info!("Problem solved for the first time");
        }
        Ok(inserted)
    }

    pub async fn solved_problems(&self, user_id: i32) -> Result<Vec<SolvedEntry>, StoreError> {
        self.solved.list(user_id).await
    }
}
