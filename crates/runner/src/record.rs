use std::fmt;

use chrono::{DateTime, Utc};
use sandbox::{ExecResult, Language};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted submission: the code, what it printed, and when it ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: Uuid,
    pub code: String,
    pub output: String,
    pub error: String,
    pub language: Language,
    pub executed_at: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn new(code: &str, language: Language, result: ExecResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.to_string(),
            output: result.stdout,
            error: result.stderr,
            language,
            executed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}

impl fmt::Display for ExecutionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Code Execution - {} at {}",
            self.language,
            self.executed_at.format("%Y-%m-%dT%H:%M:%S%.3fZ")
        )
    }
}
