use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, SandboxError};
use crate::language::Language;

/// Wall-clock budget for one submission, measured from process launch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Largest accepted source text (1 MiB).
pub const DEFAULT_MAX_CODE_BYTES: usize = 1024 * 1024;
/// Per-stream capture limit (1 MiB). Output past this is drained and dropped.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub language: Language,
    /// Explicit interpreter binary. When unset, `language.program()` is
    /// resolved on `PATH`.
    pub interpreter: Option<PathBuf>,
    pub timeout: Duration,
    pub max_code_bytes: usize,
    pub max_output_bytes: usize,
    /// Directory for staged source files. Defaults to the system temp dir.
    pub staging_dir: Option<PathBuf>,
    /// Extra environment passed to the interpreter.
    pub env: Vec<(String, String)>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            interpreter: None,
            timeout: DEFAULT_TIMEOUT,
            max_code_bytes: DEFAULT_MAX_CODE_BYTES,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            staging_dir: None,
            env: Vec::new(),
        }
    }
}

impl SandboxConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(SandboxError::InvalidConfig(
                "timeout must be greater than zero".into(),
            ));
        }
        if self.max_code_bytes == 0 {
            return Err(SandboxError::InvalidConfig(
                "max_code_bytes must be greater than zero".into(),
            ));
        }
        if self.max_output_bytes == 0 {
            return Err(SandboxError::InvalidConfig(
                "max_output_bytes must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
