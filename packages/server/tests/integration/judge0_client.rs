use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use ::common::judge_job::{ExecutionRequest, TestCaseData};
use ::common::{JudgeStatus, Language, SubmissionStatus};
use serde_json::{Value, json};

use server::config::JudgeAppConfig;
use server::judge::{
    Judge0Client, JudgeClient, JudgeError, PollSettings, dispatch, poll_until_terminal, reduce,
};

/// Minimal Judge0 stand-in: every submission finishes on its second status
/// query, with the status id taken from the submission's `stdin`.
#[derive(Clone, Default)]
struct StubState {
    submissions: Arc<Mutex<Vec<Value>>>,
    polls: Arc<Mutex<HashMap<String, u32>>>,
    headers: Arc<Mutex<Vec<HeaderMap>>>,
    fail_submit: bool,
}

async fn create_batch(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    if state.fail_submit {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    assert_eq!(query.get("base64_encoded").map(String::as_str), Some("false"));
    state.headers.lock().unwrap().push(headers);

    let mut stored = state.submissions.lock().unwrap();
    let tokens: Vec<Value> = body["submissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|sub| {
            stored.push(sub.clone());
            json!({"token": format!("tok-{}", stored.len() - 1)})
        })
        .collect();
    Ok(Json(Value::Array(tokens)))
}

async fn get_batch(
    State(state): State<StubState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let stored = state.submissions.lock().unwrap();
    let mut polls = state.polls.lock().unwrap();
    let tokens: Vec<&str> = query["tokens"].split(',').collect();

    let mut results: Vec<Value> = tokens
        .iter()
        .map(|token| {
            let index: usize = token.trim_start_matches("tok-").parse().unwrap();
            let seen = polls.entry(token.to_string()).or_insert(0);
            *seen += 1;
            if *seen < 2 {
                return json!({"token": token, "status": {"id": 2, "description": "Processing"}});
            }
            let status_id: i32 = stored[index]["stdin"].as_str().unwrap().parse().unwrap();
            let stderr = (status_id == 11).then_some("Segmentation fault");
            json!({
                "token": token,
                "status": {"id": status_id, "description": ""},
                "stdout": "out",
                "stderr": stderr,
                "compile_output": null,
                "message": null,
                "time": format!("0.0{}", index + 1),
                "memory": 2000 + index as i64,
            })
        })
        .collect();
    results.reverse();
    Json(json!({"submissions": results}))
}

async fn spawn_stub(state: StubState) -> SocketAddr {
    let app = Router::new()
        .route("/submissions/batch", post(create_batch).get(get_batch))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> Judge0Client {
    Judge0Client::new(&JudgeAppConfig {
        base_url: format!("http://{addr}/"),
        api_key: Some("secret-key".into()),
        api_host: Some("judge0-ce.p.rapidapi.com".into()),
        ..Default::default()
    })
    .unwrap()
}

fn settings() -> PollSettings {
    PollSettings {
        poll_interval_ms: 5,
        max_poll_interval_ms: 20,
        max_wait: std::time::Duration::from_secs(2),
    }
}

fn cases(status_ids: &[i32]) -> Vec<TestCaseData> {
    status_ids
        .iter()
        .enumerate()
        .map(|(i, id)| TestCaseData {
            id: i as i32 + 1,
            input: id.to_string(),
            expected_output: "out".into(),
        })
        .collect()
}

mod judge0 {
    use super::*;

    #[tokio::test]
    async fn submit_batch_sends_judge0_payload_and_credentials() {
        let state = StubState::default();
        let addr = spawn_stub(state.clone()).await;
        let client = client_for(addr);

        let tokens = client
            .submit_batch(&[ExecutionRequest {
                source_code: "print(1)".into(),
                language_id: 63,
                stdin: "3".into(),
                expected_output: "1".into(),
            }])
            .await
            .unwrap();
        assert_eq!(tokens, vec![Some("tok-0".to_string())]);

        let stored = state.submissions.lock().unwrap();
        assert_eq!(stored[0]["source_code"], "print(1)");
        assert_eq!(stored[0]["language_id"], 63);
        assert_eq!(stored[0]["expected_output"], "1");

        let headers = state.headers.lock().unwrap();
        assert_eq!(headers[0]["x-rapidapi-key"], "secret-key");
        assert_eq!(headers[0]["x-rapidapi-host"], "judge0-ce.p.rapidapi.com");
    }

    #[tokio::test]
    async fn http_error_on_submit_is_a_dispatch_failure() {
        let addr = spawn_stub(StubState {
            fail_submit: true,
            ..Default::default()
        })
        .await;
        let client = client_for(addr);

        let err = dispatch(&client, "x", Language::Cpp, &cases(&[3]))
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::Dispatch(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn unreachable_judge_is_a_dispatch_failure() {
        // Bind and drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = dispatch(&client_for(addr), "x", Language::Cpp, &cases(&[3]))
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::Dispatch(_)));
    }

    #[tokio::test]
    async fn full_pipeline_preserves_order_and_reduces() {
        let addr = spawn_stub(StubState::default()).await;
        let client = client_for(addr);

        let jobs = dispatch(&client, "int main(){}", Language::Cpp, &cases(&[3, 11, 4]))
            .await
            .unwrap();
        let tokens: Vec<String> = jobs.iter().map(|j| j.token.clone()).collect();
        let results = poll_until_terminal(&client, &tokens, &settings())
            .await
            .unwrap();

        let statuses: Vec<JudgeStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            [
                JudgeStatus::Accepted,
                JudgeStatus::RuntimeError { code: 11 },
                JudgeStatus::WrongAnswer
            ]
        );
        assert_eq!(results[0].time, Some(0.01));

        let verdict = reduce(&results);
        assert_eq!(verdict.status, SubmissionStatus::Error);
        assert_eq!(verdict.test_cases_passed, 1);
        assert_eq!(verdict.memory, 2000);
        assert_eq!(verdict.error_message.as_deref(), Some("Segmentation fault"));
    }
}
