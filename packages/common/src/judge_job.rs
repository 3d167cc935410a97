use serde::{Deserialize, Serialize};

/// Test case data needed for judging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseData {
    /// Test case ID
    pub id: i32,
    /// Input data fed to the program on stdin
    pub input: String,
    /// Expected output, compared by the execution service
    pub expected_output: String,
}

/// One execution request as understood by the execution service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language_id: i32,
    pub stdin: String,
    pub expected_output: String,
}

impl ExecutionRequest {
    pub fn for_test_case(source_code: &str, language_id: i32, test_case: &TestCaseData) -> Self {
        Self {
            source_code: source_code.to_string(),
            language_id,
            stdin: test_case.input.clone(),
            expected_output: test_case.expected_output.clone(),
        }
    }
}

/// An in-flight job: the test case at `position` is tracked by `token`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionJob {
    /// Index of the originating test case in the dispatched batch.
    pub position: usize,
    pub test_case_id: i32,
    pub token: String,
}
