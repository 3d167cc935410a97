use common::Language;
use common::judge_job::{ExecutionJob, ExecutionRequest, TestCaseData};
use tracing::{info, instrument};

use super::{JudgeClient, JudgeError};

/// Submit one execution request per test case in a single batch call.
///
/// The returned jobs are in test case order. The batch either dispatches as a
/// whole or fails as a whole: a short response or a refused entry is a
/// dispatch failure.
#[instrument(skip(client, source, test_cases), fields(language = %language, count = test_cases.len()))]
pub async fn dispatch(
    client: &dyn JudgeClient,
    source: &str,
    language: Language,
    test_cases: &[TestCaseData],
) -> Result<Vec<ExecutionJob>, JudgeError> {
    if test_cases.is_empty() {
        return Ok(Vec::new());
    }

    let requests: Vec<ExecutionRequest> = test_cases
        .iter()
        .map(|tc| ExecutionRequest::for_test_case(source, language.judge_id(), tc))
        .collect();

    let tokens = client
        .submit_batch(&requests)
        .await
        .map_err(|e| match e {
            JudgeError::Dispatch(_) => e,
            other => JudgeError::Dispatch(other.to_string()),
        })?;

    if tokens.len() != requests.len() {
        return Err(JudgeError::Dispatch(format!(
            "expected {} tokens, judge returned {}",
            requests.len(),
            tokens.len()
        )));
    }

    let jobs = test_cases
        .iter()
        .zip(tokens)
        .enumerate()
        .map(|(position, (tc, token))| {
            token
                .filter(|t| !t.is_empty())
                .map(|token| ExecutionJob {
                    position,
                    test_case_id: tc.id,
                    token,
                })
                .ok_or_else(|| {
                    JudgeError::Dispatch(format!("judge refused test case #{}", position + 1))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(jobs = jobs.len(), "Dispatched batch");
    Ok(jobs)
}
