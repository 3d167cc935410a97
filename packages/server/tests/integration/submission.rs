use crate::common::{TestApp, routes};
use serde_json::json;

fn code_body(code: &str, language: &str) -> serde_json::Value {
    json!({
        "code": code,
        "language": language,
    })
}

mod submit {
    use super::*;

    #[tokio::test]
    async fn accepted_submission_reports_metrics() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(1, 3).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::submit(problem_id), &code_body("ok", "cpp"), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["accepted"], true);
        assert_eq!(res.body["status"], "accepted");
        assert_eq!(res.body["totalTestCases"], 3);
        assert_eq!(res.body["passedTestCases"], 3);
        assert_eq!(res.body["memory"], 1003);
        let runtime = res.body["runtime"].as_f64().unwrap();
        assert!((runtime - 0.06).abs() < 1e-9, "runtime was {runtime}");
        assert!(res.body["errorMessage"].is_null());
        assert_eq!(res.body["newlySolved"], true);
    }

    #[tokio::test]
    async fn runtime_error_keeps_first_failure_message() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 3).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::submit(problem_id), &code_body("ok,re,wa", "java"), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["accepted"], false);
        assert_eq!(res.body["status"], "error");
        assert_eq!(res.body["passedTestCases"], 1);
        assert_eq!(res.body["errorMessage"], "crash in test 2");
        assert_eq!(res.body["runtime"].as_f64().unwrap(), 0.01);
    }

    #[tokio::test]
    async fn compile_error_is_wrong() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 2).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::submit(problem_id), &code_body("ce,ce", "c++"), &token)
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["status"], "wrong");
        assert_eq!(res.body["passedTestCases"], 0);
        assert_eq!(res.body["runtime"].as_f64().unwrap(), 0.0);
        assert_eq!(res.body["errorMessage"], "main.cpp:1:1: error: expected ';'");
    }

    #[tokio::test]
    async fn problem_without_hidden_tests_is_accepted() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(1, 0).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::submit(problem_id), &code_body("wa", "js"), &token)
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["accepted"], true);
        assert_eq!(res.body["totalTestCases"], 0);
    }

    #[tokio::test]
    async fn requires_authentication() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(1, 1).await;

        let res = app
            .post_without_token(&routes::submit(problem_id), &code_body("ok", "cpp"))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn rejects_forged_token() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(1, 1).await;
        let forged = server::utils::jwt::sign(1, "mallory", "not-the-secret").unwrap();

        let res = app
            .post_with_token(&routes::submit(problem_id), &code_body("ok", "cpp"), &forged)
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn returns_404_for_nonexistent_problem() {
        let app = TestApp::spawn().await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::submit(9999), &code_body("ok", "cpp"), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn unsupported_language_is_rejected_before_anything_is_stored() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(1, 1).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::submit(problem_id), &code_body("ok", "ruby"), &token)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "UNSUPPORTED_LANGUAGE");

        let list = app
            .get_with_token(&routes::problem_submissions(problem_id), &token)
            .await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn rejects_empty_code() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(1, 1).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::submit(problem_id), &code_body("   ", "cpp"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_oversized_code() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(1, 1).await;
        let token = app.token_for(1);
        let big = "x".repeat(2048);

        let res = app
            .post_with_token(&routes::run(problem_id), &code_body(&big, "cpp"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_malformed_body() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(1, 1).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::submit(problem_id), &json!({"code": 5}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod run {
    use super::*;

    #[tokio::test]
    async fn run_reports_each_sample_and_stores_nothing() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(2, 3).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::run(problem_id), &code_body("ok,wa", "cpp"), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["status"], "wrong");
        let cases = res.body["testCases"].as_array().unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0]["input"], "sample 0");
        assert_eq!(cases[0]["description"], "Accepted");
        assert!(cases[0]["diagnostic"].is_null());
        assert_eq!(cases[1]["input"], "sample 1");
        assert_eq!(cases[1]["status"]["kind"], "wrong_answer");
        assert_eq!(cases[1]["diagnostic"], "Wrong Answer");

        let list = app
            .get_with_token(&routes::problem_submissions(problem_id), &token)
            .await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
        let solved = app.get_with_token(routes::SOLVED, &token).await;
        assert_eq!(solved.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn successful_run_does_not_mark_solved() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(1, 1).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::run(problem_id), &code_body("ok", "cpp"), &token)
            .await;
        assert_eq!(res.body["success"], true);

        let solved = app.get_with_token(routes::SOLVED, &token).await;
        assert_eq!(solved.body.as_array().unwrap().len(), 0);
    }
}

mod judge_failures {
    use super::*;

    #[tokio::test]
    async fn timeout_returns_504_and_leaves_submission_pending() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 2).await;
        let token = app.token_for(1);

        let res = app
            .post_with_token(&routes::submit(problem_id), &code_body("ok,hang", "cpp"), &token)
            .await;
        assert_eq!(res.status, 504, "{}", res.text);
        assert_eq!(res.body["code"], "JUDGE_TIMEOUT");

        let list = app
            .get_with_token(&routes::problem_submissions(problem_id), &token)
            .await;
        let items = list.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["status"], "pending");
        assert_eq!(items[0]["test_cases_passed"], 0);
    }

    #[tokio::test]
    async fn dispatch_failure_returns_502_and_rejudge_recovers() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 2).await;
        let token = app.token_for(1);

        app.judge.set_fail_dispatch(true);
        let res = app
            .post_with_token(&routes::submit(problem_id), &code_body("ok", "cpp"), &token)
            .await;
        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "JUDGE_DISPATCH_FAILED");

        let list = app
            .get_with_token(&routes::problem_submissions(problem_id), &token)
            .await;
        let id = list.body[0]["id"].as_i64().unwrap();
        assert_eq!(list.body[0]["status"], "pending");

        app.judge.set_fail_dispatch(false);
        let res = app
            .post_with_token(&routes::rejudge(id), &json!({}), &token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["submissionId"], id);
        assert_eq!(res.body["status"], "accepted");

        let again = app
            .post_with_token(&routes::rejudge(id), &json!({}), &token)
            .await;
        assert_eq!(again.status, 409);
        assert_eq!(again.body["code"], "CONFLICT");
    }
}

mod history {
    use super::*;

    #[tokio::test]
    async fn owner_can_view_submission_detail() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 1).await;
        let token = app.token_for(1);

        let created = app
            .post_with_token(&routes::submit(problem_id), &code_body("wa", "cpp"), &token)
            .await;
        let id = created.body["submissionId"].as_i64().unwrap();

        let res = app.get_with_token(&routes::submission(id), &token).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["code"], "wa");
        assert_eq!(res.body["language"], "c++");
        assert_eq!(res.body["status"], "wrong");
        assert!(res.body["judged_at"].is_string());
    }

    #[tokio::test]
    async fn other_users_cannot_see_a_submission() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 1).await;

        let created = app
            .post_with_token(
                &routes::submit(problem_id),
                &code_body("ok", "cpp"),
                &app.token_for(1),
            )
            .await;
        let id = created.body["submissionId"].as_i64().unwrap();

        let res = app.get_with_token(&routes::submission(id), &app.token_for(2)).await;
        assert_eq!(res.status, 404);

        let list = app
            .get_with_token(&routes::problem_submissions(problem_id), &app.token_for(2))
            .await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 1).await;
        let token = app.token_for(1);

        for code in ["wa", "ok"] {
            app.post_with_token(&routes::submit(problem_id), &code_body(code, "cpp"), &token)
                .await;
        }

        let list = app
            .get_with_token(&routes::problem_submissions(problem_id), &token)
            .await;
        let items = list.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["status"], "accepted");
        assert_eq!(items[1]["status"], "wrong");
        assert!(items[0].get("code").is_none());
    }
}

mod progress {
    use super::*;

    #[tokio::test]
    async fn solving_twice_records_one_entry() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 2).await;
        let token = app.token_for(1);

        let first = app
            .post_with_token(&routes::submit(problem_id), &code_body("ok", "cpp"), &token)
            .await;
        assert_eq!(first.body["newlySolved"], true);
        let second = app
            .post_with_token(&routes::submit(problem_id), &code_body("ok", "cpp"), &token)
            .await;
        assert_eq!(second.body["accepted"], true);
        assert_eq!(second.body["newlySolved"], false);

        let solved = app.get_with_token(routes::SOLVED, &token).await;
        let entries = solved.body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["problem_id"], problem_id);
    }

    #[tokio::test]
    async fn concurrent_accepted_submissions_record_one_entry() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 3).await;
        let token = app.token_for(1);

        let path = routes::submit(problem_id);
        let body = code_body("ok", "cpp");
        let requests = (0..5).map(|_| app.post_with_token(&path, &body, &token));
        let responses = futures::future::join_all(requests).await;

        let mut newly_solved = 0;
        for res in &responses {
            assert_eq!(res.status, 201, "{}", res.text);
            assert_eq!(res.body["accepted"], true);
            if res.body["newlySolved"] == true {
                newly_solved += 1;
            }
        }
        assert_eq!(newly_solved, 1);

        let solved = app.get_with_token(routes::SOLVED, &token).await;
        assert_eq!(solved.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn wrong_submission_does_not_mark_solved() {
        let app = TestApp::spawn().await;
        let problem_id = app.create_problem(0, 2).await;
        let token = app.token_for(1);

        app.post_with_token(&routes::submit(problem_id), &code_body("ok,tle", "cpp"), &token)
            .await;

        let solved = app.get_with_token(routes::SOLVED, &token).await;
        assert_eq!(solved.body.as_array().unwrap().len(), 0);
    }
}

mod service {
    use super::*;

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = TestApp::spawn().await;
        let res = app.get_without_token(routes::HEALTH).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_document_lists_submission_routes() {
        let app = TestApp::spawn().await;
        let res = app.get_without_token(routes::OPENAPI).await;
        assert_eq!(res.status, 200);
        let paths = res.body["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/v1/submissions/submit/{problem_id}"));
        assert!(paths.contains_key("/api/v1/users/me/solved"));
    }
}
