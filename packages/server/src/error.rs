use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::LanguageError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::judge::JudgeError;
use crate::store::StoreError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `UNSUPPORTED_LANGUAGE`, `TOKEN_MISSING`, `TOKEN_INVALID`, `NOT_FOUND`,
    /// `CONFLICT`, `JUDGE_DISPATCH_FAILED`, `JUDGE_TIMEOUT`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Code must not be empty")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    UnsupportedLanguage(String),
    TokenMissing,
    TokenInvalid,
    ProblemNotFound,
    NotFound(String),
    Conflict(String),
    /// The execution service could not take the batch. Safe to retry.
    JudgeDispatchFailure(String),
    /// The execution service did not finish within the poll budget. Safe to retry.
    JudgeTimeout {
        pending: usize,
    },
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::UnsupportedLanguage(name) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "UNSUPPORTED_LANGUAGE",
                    message: format!("Unsupported language: {name}"),
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::ProblemNotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: "Problem not found".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::JudgeDispatchFailure(detail) => {
                tracing::warn!("Judge dispatch failed: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "JUDGE_DISPATCH_FAILED",
                        message: "The judge is unavailable, please retry".into(),
                    },
                )
            }
            AppError::JudgeTimeout { pending } => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorBody {
                    code: "JUDGE_TIMEOUT",
                    message: format!(
                        "The judge did not finish in time ({pending} test case(s) pending), please retry"
                    ),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<LanguageError> for AppError {
    fn from(err: LanguageError) -> Self {
        match err {
            LanguageError::Unsupported(name) => AppError::UnsupportedLanguage(name),
        }
    }
}

impl From<JudgeError> for AppError {
    fn from(err: JudgeError) -> Self {
        match err {
            JudgeError::Timeout { pending } => AppError::JudgeTimeout { pending },
            other => AppError::JudgeDispatchFailure(other.to_string()),
        }
    }
}
