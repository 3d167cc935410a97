use std::time::Duration;

use async_trait::async_trait;
use common::config::JudgeAppConfig;
use common::judge_job::ExecutionRequest;
use common::{ExecutionResult, JudgeStatus};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::JudgeError;

/// Fields requested on every status query.
const RESULT_FIELDS: &str = "token,status,stdout,stderr,compile_output,message,time,memory";

/// The execution service as seen by the judging pipeline.
///
/// Can be used as `Arc<dyn JudgeClient>`.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Submit every request in one call.
    ///
    /// Returns one entry per request in the same order; `None` marks a
    /// request the service refused to queue.
    async fn submit_batch(
        &self,
        requests: &[ExecutionRequest],
    ) -> Result<Vec<Option<String>>, JudgeError>;

    /// Query the current state of the given jobs.
    ///
    /// The response may be in any order and may omit tokens.
    async fn fetch_batch(&self, tokens: &[String]) -> Result<Vec<ExecutionResult>, JudgeError>;
}

/// HTTP client for a Judge0-compatible API.
#[derive(Clone)]
pub struct Judge0Client {
    http: reqwest::Client,
    base_url: String,
}

impl Judge0Client {
    pub fn new(config: &JudgeAppConfig) -> Result<Self, JudgeError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                HeaderName::from_static("x-rapidapi-key"),
                header_value(key)?,
            );
        }
        if let Some(host) = &config.api_host {
            headers.insert(
                HeaderName::from_static("x-rapidapi-host"),
                header_value(host)?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| JudgeError::Dispatch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn batch_url(&self) -> String {
        format!("{}/submissions/batch", self.base_url)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, JudgeError> {
    HeaderValue::from_str(value)
        .map_err(|e| JudgeError::Dispatch(format!("invalid judge credential header: {e}")))
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    submissions: &'a [ExecutionRequest],
}

/// One element of the batch-submit response. Rejected entries carry
/// validation errors instead of a token.
#[derive(Deserialize)]
struct SubmitEntry {
    token: Option<String>,
}

#[derive(Deserialize)]
struct FetchBody {
    submissions: Vec<Option<WireSubmission>>,
}

#[derive(Deserialize)]
struct WireStatus {
    id: i32,
}

#[derive(Deserialize)]
struct WireSubmission {
    token: String,
    status: WireStatus,
    stdout: Option<String>,
    stderr: Option<String>,
    compile_output: Option<String>,
    message: Option<String>,
    /// Judge0 reports time as a decimal string, e.g. "0.012".
    time: Option<NumberOrString>,
    memory: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => s.trim().parse().ok(),
        }
    }
}

impl From<WireSubmission> for ExecutionResult {
    fn from(wire: WireSubmission) -> Self {
        Self {
            token: wire.token,
            status: JudgeStatus::from_judge0_id(wire.status.id),
            stdout: wire.stdout,
            stderr: wire.stderr,
            compile_output: wire.compile_output,
            message: wire.message,
            time: wire.time.as_ref().and_then(NumberOrString::as_f64),
            memory: wire.memory,
        }
    }
}

#[async_trait]
impl JudgeClient for Judge0Client {
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    async fn submit_batch(
        &self,
        requests: &[ExecutionRequest],
    ) -> Result<Vec<Option<String>>, JudgeError> {
        let res = self
            .http
            .post(self.batch_url())
            .query(&[("base64_encoded", "false")])
            .json(&SubmitBody {
                submissions: requests,
            })
            .send()
            .await
            .map_err(|e| JudgeError::Dispatch(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(JudgeError::Dispatch(format!("HTTP {status}: {body}")));
        }

        let entries: Vec<SubmitEntry> = res
            .json()
            .await
            .map_err(|e| JudgeError::MalformedResponse(e.to_string()))?;

        debug!(tokens = entries.len(), "Batch accepted by judge");
        Ok(entries.into_iter().map(|entry| entry.token).collect())
    }

    #[instrument(skip(self, tokens), fields(count = tokens.len()))]
    async fn fetch_batch(&self, tokens: &[String]) -> Result<Vec<ExecutionResult>, JudgeError> {
        let joined = tokens.join(",");
        let res = self
            .http
            .get(self.batch_url())
            .query(&[
                ("tokens", joined.as_str()),
                ("base64_encoded", "false"),
                ("fields", RESULT_FIELDS),
            ])
            .send()
            .await
            .map_err(|e| JudgeError::Status(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(JudgeError::Status(format!("HTTP {status}: {body}")));
        }

        let body: FetchBody = res
            .json()
            .await
            .map_err(|e| JudgeError::MalformedResponse(e.to_string()))?;

        Ok(body
            .submissions
            .into_iter()
            .flatten()
            .map(ExecutionResult::from)
            .collect())
    }
}
