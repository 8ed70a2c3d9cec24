use std::time::Duration;

use serde::{Deserialize, Serialize};

pub struct ExecRequest<'a> {
    pub code: &'a str,
}

/// Captured streams of one submission.
///
/// An empty `stderr` means success. Timeouts and infrastructure failures are
/// reported through `stderr` as well, so callers never handle an error type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn new(stdout: String, stderr: String) -> Self {
        Self { stdout, stderr }
    }

    /// Result for a submission killed at the deadline.
    pub fn timeout(limit: Duration) -> Self {
        Self {
            stdout: String::new(),
            stderr: timeout_message(limit),
        }
    }

    /// Result for a staging or launch failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.stderr.is_empty()
    }
}

/// `"Execution timeout (5 seconds limit)"` for the default deadline.
///
/// Sub-second deadlines are reported in milliseconds.
pub fn timeout_message(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        let secs = limit.as_secs();
        let unit = if secs == 1 { "second" } else { "seconds" };
        format!("Execution timeout ({secs} {unit} limit)")
    } else {
        format!("Execution timeout ({} ms limit)", limit.as_millis())
    }
}
