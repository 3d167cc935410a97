use serde::Deserialize;

/// Execution service configuration shared by everything that talks to the judge.
#[derive(Debug, Deserialize, Clone)]
pub struct JudgeAppConfig {
    /// Base URL of the Judge0 API. Default: "http://localhost:2358".
    #[serde(default = "default_judge_base_url")]
    pub base_url: String,
    /// RapidAPI key, sent as `X-RapidAPI-Key` when set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// RapidAPI host, sent as `X-RapidAPI-Host` when set.
    #[serde(default)]
    pub api_host: Option<String>,
    /// Per-request HTTP timeout. Default: 10000 ms.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// First delay between status polls. Default: 500 ms.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound for the backed-off poll delay. Default: 4000 ms.
    #[serde(default = "default_max_poll_interval_ms")]
    pub max_poll_interval_ms: u64,
    /// Total time budget for one batch to finish. Default: 60000 ms.
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
    /// Submissions judged at the same time. Default: 8.
    #[serde(default = "default_max_concurrent_judgings")]
    pub max_concurrent_judgings: usize,
}

fn default_judge_base_url() -> String {
    "http://localhost:2358".into()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_poll_interval_ms() -> u64 {
    500
}
fn default_max_poll_interval_ms() -> u64 {
    4_000
}
fn default_max_wait_ms() -> u64 {
    60_000
}
fn default_max_concurrent_judgings() -> usize {
    8
}

impl Default for JudgeAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_judge_base_url(),
            api_key: None,
            api_host: None,
            request_timeout_ms: default_request_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_interval_ms: default_max_poll_interval_ms(),
            max_wait_ms: default_max_wait_ms(),
            max_concurrent_judgings: default_max_concurrent_judgings(),
        }
    }
}
