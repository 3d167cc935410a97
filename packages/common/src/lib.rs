pub mod config;
pub mod judge_job;
pub mod judge_result;
pub mod language;
pub mod retry;
pub mod submission_status;

pub use judge_result::{ExecutionResult, JudgeStatus, Outcome};
pub use language::{Language, LanguageError};
pub use submission_status::SubmissionStatus;
