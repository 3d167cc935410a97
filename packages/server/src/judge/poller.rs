use std::collections::HashMap;
use std::time::Duration;

use common::ExecutionResult;
use common::config::JudgeAppConfig;
use common::retry::Backoff;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::{JudgeClient, JudgeError};

/// Timing knobs for [`poll_until_terminal`].
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub poll_interval_ms: u64,
    pub max_poll_interval_ms: u64,
    /// Total budget, measured from the first query.
    pub max_wait: Duration,
}

impl From<&JudgeAppConfig> for PollSettings {
    fn from(config: &JudgeAppConfig) -> Self {
        Self {
            poll_interval_ms: config.poll_interval_ms,
            max_poll_interval_ms: config.max_poll_interval_ms,
            max_wait: Duration::from_millis(config.max_wait_ms),
        }
    }
}

/// Query the judge until every token has a terminal result.
///
/// Results come back in the order of `tokens`, whatever order the judge
/// answered in. Only tokens that are still pending are re-queried. Failed
/// queries are retried within the same budget; once the budget is spent the
/// call fails with [`JudgeError::Timeout`].
#[instrument(skip_all, fields(tokens = tokens.len()))]
pub async fn poll_until_terminal(
    client: &dyn JudgeClient,
    tokens: &[String],
    settings: &PollSettings,
) -> Result<Vec<ExecutionResult>, JudgeError> {
    let deadline = Instant::now() + settings.max_wait;
    let mut backoff = Backoff::new(settings.poll_interval_ms, settings.max_poll_interval_ms);
    let mut resolved: HashMap<String, ExecutionResult> = HashMap::with_capacity(tokens.len());

    loop {
        let pending: Vec<String> = tokens
            .iter()
            .filter(|t| !resolved.contains_key(*t))
            .cloned()
            .collect();
        if pending.is_empty() {
            break;
        }

        let query = tokio::time::timeout_at(deadline, client.fetch_batch(&pending));
        match query.await {
            Ok(Ok(results)) => {
                for result in results {
                    if result.status.is_terminal() && pending.contains(&result.token) {
                        resolved.insert(result.token.clone(), result);
                    }
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, attempt = backoff.attempts(), "Judge status query failed, retrying");
            }
            Err(_) => {
                return Err(JudgeError::Timeout {
                    pending: pending.len(),
                });
            }
        }

        let still_pending = tokens
            .iter()
            .filter(|t| !resolved.contains_key(*t))
            .count();
        if still_pending == 0 {
            break;
        }

        let delay = backoff.next_delay();
        if Instant::now() + delay > deadline {
            warn!(pending = still_pending, "Judge poll budget exhausted");
            return Err(JudgeError::Timeout {
                pending: still_pending,
            });
        }
        debug!(pending = still_pending, delay_ms = delay.as_millis() as u64, "Waiting for judge");
        tokio::time::sleep(delay).await;
    }

    tokens
        .iter()
        .map(|token| {
            resolved.get(token).cloned().ok_or_else(|| {
                JudgeError::MalformedResponse(format!("no result for token {token}"))
            })
        })
        .collect()
}
