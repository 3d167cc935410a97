use serde::{Deserialize, Serialize};

/// Status of one execution job as reported by the execution service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JudgeStatus {
    Queued,
    Running,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    CompilationError,
    /// Crash or non-zero exit. `code` is the service's status id.
    RuntimeError { code: i32 },
    InternalError,
    ExecFormatError,
    /// A status id this service does not know about.
    Unknown { code: i32 },
}

/// Classification of a terminal job, consumed by the verdict reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    CompileError,
    RuntimeError,
    Mismatch,
    LimitExceeded,
}

impl JudgeStatus {
    /// Map a Judge0 status id.
    ///
    /// 1 In Queue, 2 Processing, 3 Accepted, 4 Wrong Answer,
    /// 5 Time Limit Exceeded, 6 Compilation Error, 7-12 Runtime Error
    /// (SIGSEGV, SIGXFSZ, SIGFPE, SIGABRT, NZEC, Other), 13 Internal Error,
    /// 14 Exec Format Error.
    pub fn from_judge0_id(id: i32) -> Self {
        match id {
            1 => Self::Queued,
            2 => Self::Running,
            3 => Self::Accepted,
            4 => Self::WrongAnswer,
            5 => Self::TimeLimitExceeded,
            6 => Self::CompilationError,
            7..=12 => Self::RuntimeError { code: id },
            13 => Self::InternalError,
            14 => Self::ExecFormatError,
            code => Self::Unknown { code },
        }
    }

    /// Returns true once the status can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::Running)
    }

    /// `None` while the job is still queued or running.
    pub fn outcome(&self) -> Option<Outcome> {
        let outcome = match self {
            Self::Queued | Self::Running => return None,
            Self::Accepted => Outcome::Passed,
            Self::WrongAnswer => Outcome::Mismatch,
            Self::TimeLimitExceeded | Self::MemoryLimitExceeded => Outcome::LimitExceeded,
            Self::CompilationError => Outcome::CompileError,
            Self::RuntimeError { .. }
            | Self::InternalError
            | Self::ExecFormatError
            | Self::Unknown { .. } => Outcome::RuntimeError,
        };
        Some(outcome)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Queued => "In Queue",
            Self::Running => "Processing",
            Self::Accepted => "Accepted",
            Self::WrongAnswer => "Wrong Answer",
            Self::TimeLimitExceeded => "Time Limit Exceeded",
            Self::MemoryLimitExceeded => "Memory Limit Exceeded",
            Self::CompilationError => "Compilation Error",
            Self::RuntimeError { code: 7 } => "Runtime Error (SIGSEGV)",
            Self::RuntimeError { code: 8 } => "Runtime Error (SIGXFSZ)",
            Self::RuntimeError { code: 9 } => "Runtime Error (SIGFPE)",
            Self::RuntimeError { code: 10 } => "Runtime Error (SIGABRT)",
            Self::RuntimeError { code: 11 } => "Runtime Error (NZEC)",
            Self::RuntimeError { .. } => "Runtime Error (Other)",
            Self::InternalError => "Internal Error",
            Self::ExecFormatError => "Exec Format Error",
            Self::Unknown { .. } => "Unknown Status",
        }
    }
}

/// Terminal result of one execution job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExecutionResult {
    pub token: String,
    pub status: JudgeStatus,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    /// Free-form message from the execution service.
    pub message: Option<String>,
    /// Elapsed CPU time in seconds.
    pub time: Option<f64>,
    /// Peak memory in kilobytes.
    pub memory: Option<i64>,
}

impl ExecutionResult {
    /// A result carrying only a status, with every output field empty.
    pub fn with_status(token: impl Into<String>, status: JudgeStatus) -> Self {
        Self {
            token: token.into(),
            status,
            stdout: None,
            stderr: None,
            compile_output: None,
            message: None,
            time: None,
            memory: None,
        }
    }

    /// Diagnostic text shown to the user when this test does not pass.
    ///
    /// First non-blank of stderr, compiler output, service message; falls
    /// back to the status description.
    pub fn diagnostic(&self) -> String {
        [&self.stderr, &self.compile_output, &self.message]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| self.status.description().to_string())
    }
}
