use std::sync::Arc;

use crate::config::AppConfig;
use crate::ledger::SubmissionLedger;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub ledger: Arc<SubmissionLedger>,
}
