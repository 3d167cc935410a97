//! Talking to the execution service: fan a submission out into one job per
//! test case, wait for every job to finish, and fold the results into a
//! verdict.

pub mod client;
pub mod dispatcher;
pub mod poller;
pub mod reducer;

use thiserror::Error;

pub use client::{Judge0Client, JudgeClient};
pub use dispatcher::dispatch;
pub use poller::{PollSettings, poll_until_terminal};
pub use reducer::{Verdict, reduce};

#[derive(Debug, Error)]
pub enum JudgeError {
    /// The batch could not be handed to the execution service.
    #[error("judge dispatch failed: {0}")]
    Dispatch(String),
    /// A status query failed. Retried by the poller while budget remains.
    #[error("judge status query failed: {0}")]
    Status(String),
    #[error("judge did not finish in time ({pending} job(s) still pending)")]
    Timeout { pending: usize },
    #[error("malformed judge response: {0}")]
    MalformedResponse(String),
}
