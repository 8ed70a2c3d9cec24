use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use sandbox::{ExecRequest, ExecResult, Result, Sandbox, SandboxConfig, SandboxError};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::capture::read_capped;
use crate::prerequisites::resolve_interpreter;
use crate::process::{exit_code, kill_process_group};
use crate::workspace::{self, StagedSource};

/// Runs each submission in a fresh interpreter process.
///
/// Per call: stage the code to a temp file, spawn the interpreter on it in
/// its own process group, capture both streams in memory, and SIGKILL the
/// group if the deadline passes. The staged file is removed on every path.
/// This bounds time and contains crashes; it does not restrict what the
/// submitted code may access.
pub struct ProcessSandbox {
    config: SandboxConfig,
    interpreter: PathBuf,
    staging_dir: PathBuf,
}

impl ProcessSandbox {
    pub fn new(config: SandboxConfig) -> Result<Self> {
        config.validate()?;
        let interpreter = resolve_interpreter(&config)?;
        let staging_dir = config.staging_dir();
        Ok(Self {
            config,
            interpreter,
            staging_dir,
        })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    async fn run(&self, code: &str) -> Result<ExecResult> {
        if code.len() > self.config.max_code_bytes {
            return Err(SandboxError::CodeTooLarge {
                size: code.len(),
                limit: self.config.max_code_bytes,
            });
        }

        let staged = workspace::stage(code, &self.staging_dir, self.config.language.extension())
            .await?;
        let result = self.run_staged(&staged).await;
        staged.close();
        result
    }

    async fn run_staged(&self, staged: &StagedSource) -> Result<ExecResult> {
        let mut child = Command::new(&self.interpreter)
            .arg(staged.path())
            .current_dir(&self.staging_dir)
            .envs(self.config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SandboxError::SpawnFailed(format!("{}: {e}", self.interpreter.display()))
            })?;
        let started = Instant::now();
        let pid = child.id();

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SandboxError::SpawnFailed("stdout not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SandboxError::SpawnFailed("stderr not captured".into()))?;

        let limit = self.config.max_output_bytes;
        let stdout = read_capped(stdout, limit);
        let stderr = read_capped(stderr, limit);
        let collected = tokio::time::timeout(self.config.timeout, async {
            tokio::join!(child.wait(), stdout, stderr)
        })
        .await;

        match collected {
            Ok((status, stdout, stderr)) => {
                let status = status?;
                // Reap anything the interpreter left running in its group.
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                let (stdout, stderr) = (stdout?.into_string(), stderr?.into_string());
                debug!(
                    pid,
                    exit_code = exit_code(status),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    stdout_len = stdout.len(),
                    stderr_len = stderr.len(),
                    "interpreter exited"
                );
                Ok(ExecResult::new(stdout, stderr))
            }
            Err(_) => {
                warn!(
                    pid,
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "deadline exceeded, killing process group"
                );
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                // The leader may already be reaped if only its children held the pipes open.
                let reaped = if matches!(child.try_wait(), Ok(Some(_))) {
                    Ok(())
                } else {
                    child.kill().await
                };
                if let Err(e) = reaped {
                    warn!(pid, error = %e, "failed to reap timed out interpreter");
                }
                Ok(ExecResult::timeout(self.config.timeout))
            }
        }
    }
}

#[async_trait]
impl Sandbox for ProcessSandbox {
    fn name(&self) -> &str {
        "process"
    }

    async fn execute(&self, request: &ExecRequest<'_>) -> ExecResult {
        match self.run(request.code).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "execution failed before completion");
                ExecResult::failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sandbox::Language;

    use super::*;

    fn shell_sandbox(dir: &Path) -> ProcessSandbox {
        ProcessSandbox::new(SandboxConfig {
            language: Language::Shell,
            timeout: Duration::from_secs(2),
            staging_dir: Some(dir.to_path_buf()),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn new_rejects_invalid_config() {
        let err = ProcessSandbox::new(SandboxConfig {
            max_code_bytes: 0,
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, SandboxError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn oversized_code_is_reported_on_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = ProcessSandbox::new(SandboxConfig {
            language: Language::Shell,
            max_code_bytes: 8,
            staging_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        })
        .unwrap();

        let result = sandbox
            .execute(&ExecRequest {
                code: "echo 0123456789",
            })
            .await;
        assert_eq!(result.stdout, "");
        assert!(result.stderr.contains("byte limit"), "stderr was: {}", result.stderr);
    }

    #[tokio::test]
    async fn env_is_passed_to_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = ProcessSandbox::new(SandboxConfig {
            language: Language::Shell,
            staging_dir: Some(dir.path().to_path_buf()),
            env: vec![("SANDBOX_GREETING".into(), "hola".into())],
            ..Default::default()
        })
        .unwrap();

        let result = sandbox
            .execute(&ExecRequest {
                code: "echo \"$SANDBOX_GREETING\"",
            })
            .await;
        assert_eq!(result, ExecResult::new("hola\n".into(), String::new()));
    }

    #[tokio::test]
    async fn stdin_is_closed() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = shell_sandbox(dir.path());
        let result = sandbox
            .execute(&ExecRequest {
                code: "cat; echo done",
            })
            .await;
        assert_eq!(result.stdout, "done\n");
    }

    #[tokio::test]
    async fn nonzero_exit_without_stderr_is_success_shape() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = shell_sandbox(dir.path());
        let result = sandbox
            .execute(&ExecRequest {
                code: "echo partial; exit 4",
            })
            .await;
        assert_eq!(result.stdout, "partial\n");
        assert_eq!(result.stderr, "");
    }
}
