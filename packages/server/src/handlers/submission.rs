use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::submission::*;
use crate::state::AppState;

/// Submit code for grading.
#[utoipa::path(
    post,
    path = "/submit/{problem_id}",
    tag = "Submissions",
    operation_id = "submitCode",
    summary = "Submit a solution to a problem",
    description = "Judges the code against the problem's hidden test cases and returns the verdict. The submission is stored as pending first; if the judge fails or times out it stays pending and can be rejudged.",
    params(
        ("problem_id" = i32, Path, description = "Problem ID")
    ),
    request_body = SubmitCodeRequest,
    responses(
        (status = 201, description = "Submission judged", body = SubmitResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, UNSUPPORTED_LANGUAGE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Judge unavailable (JUDGE_DISPATCH_FAILED)", body = ErrorBody),
        (status = 504, description = "Judge timed out (JUDGE_TIMEOUT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, username = %auth_user.username, problem_id = %problem_id))]
pub async fn submit_code(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
    AppJson(payload): AppJson<SubmitCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_submit_code(&payload, state.config.submission.max_code_size)?;

    let outcome = state
        .ledger
        .submit(
            auth_user.user_id,
            problem_id,
            &payload.code,
            &payload.language,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(SubmitResponse::from(outcome))))
}

/// Run code against the sample test cases.
#[utoipa::path(
    post,
    path = "/run/{problem_id}",
    tag = "Submissions",
    operation_id = "runCode",
    summary = "Run code against sample test cases",
    description = "Judges the code against the problem's visible test cases and returns per-test detail. Nothing is stored.",
    params(
        ("problem_id" = i32, Path, description = "Problem ID")
    ),
    request_body = SubmitCodeRequest,
    responses(
        (status = 200, description = "Run finished", body = RunResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, UNSUPPORTED_LANGUAGE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Judge unavailable (JUDGE_DISPATCH_FAILED)", body = ErrorBody),
        (status = 504, description = "Judge timed out (JUDGE_TIMEOUT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, username = %auth_user.username, problem_id = %problem_id))]
pub async fn run_code(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
    AppJson(payload): AppJson<SubmitCodeRequest>,
) -> Result<Json<RunResponse>, AppError> {
    validate_submit_code(&payload, state.config.submission.max_code_size)?;

    let outcome = state
        .ledger
        .run(
            auth_user.user_id,
            problem_id,
            &payload.code,
            &payload.language,
        )
        .await?;

    Ok(Json(outcome.into()))
}

/// Get one of the caller's submissions.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get submission details",
    description = "Returns full details of one of the caller's submissions.",
    params(
        ("id" = i32, Path, description = "Submission ID")
    ),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, username = %auth_user.username, submission_id = %id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let submission = state.ledger.get(auth_user.user_id, id).await?;
    Ok(Json(submission.into()))
}

/// Retry judging of a submission that is still pending.
#[utoipa::path(
    post,
    path = "/{id}/rejudge",
    tag = "Submissions",
    operation_id = "rejudgeSubmission",
    summary = "Rejudge a pending submission",
    description = "Re-runs judging for one of the caller's submissions that was left pending by a judge failure. Judged submissions cannot be rejudged.",
    params(
        ("id" = i32, Path, description = "Submission ID")
    ),
    responses(
        (status = 200, description = "Submission judged", body = SubmitResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already judged (CONFLICT)", body = ErrorBody),
        (status = 502, description = "Judge unavailable (JUDGE_DISPATCH_FAILED)", body = ErrorBody),
        (status = 504, description = "Judge timed out (JUDGE_TIMEOUT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, username = %auth_user.username, submission_id = %id))]
pub async fn rejudge_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmitResponse>, AppError> {
    let outcome = state.ledger.rejudge_pending(auth_user.user_id, id).await?;
    Ok(Json(outcome.into()))
}

/// List the caller's submissions for a problem.
#[utoipa::path(
    get,
    path = "/{problem_id}/submissions",
    tag = "Submissions",
    operation_id = "listProblemSubmissions",
    summary = "List own submissions for a problem",
    description = "Returns the caller's submissions for the problem, newest first.",
    params(
        ("problem_id" = i32, Path, description = "Problem ID")
    ),
    responses(
        (status = 200, description = "Submissions", body = Vec<SubmissionListItem>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, username = %auth_user.username, problem_id = %problem_id))]
pub async fn list_problem_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
) -> Result<Json<Vec<SubmissionListItem>>, AppError> {
    let submissions = state
        .ledger
        .list_for_problem(auth_user.user_id, problem_id)
        .await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// List the problems the caller has solved.
#[utoipa::path(
    get,
    path = "/me/solved",
    tag = "Progress",
    operation_id = "listSolvedProblems",
    summary = "List solved problems",
    description = "Returns every problem the caller has an accepted submission for, in the order they were first solved.",
    responses(
        (status = 200, description = "Solved problems", body = Vec<SolvedProblemResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, username = %auth_user.username))]
pub async fn list_solved_problems(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SolvedProblemResponse>>, AppError> {
    let solved = state.ledger.solved_problems(auth_user.user_id).await?;
    Ok(Json(solved.into_iter().map(Into::into).collect()))
}
