use std::sync::Arc;
use std::time::Instant;

use sandbox::{ExecRequest, Language, Sandbox};
use tracing::{info, warn};

use crate::error::{RunnerError, RunnerResult};
use crate::record::ExecutionRecord;
use crate::store::RecordStore;

pub struct SubmitRequest<'a> {
    pub code: &'a str,
    pub language: Language,
}

/// Validates submissions, runs them through a [`Sandbox`], and records the outcome.
pub struct ExecutionService {
    sandbox: Arc<dyn Sandbox>,
    store: Option<RecordStore>,
}

impl ExecutionService {
    pub fn new(sandbox: Arc<dyn Sandbox>, store: Option<RecordStore>) -> Self {
        Self { sandbox, store }
    }

    /// Run one submission.
    ///
    /// Blank code is rejected with [`RunnerError::EmptyCode`] before the
    /// sandbox is touched. A failed history write is logged; the record is
    /// still returned so the caller sees the output.
    pub async fn submit(&self, request: &SubmitRequest<'_>) -> RunnerResult<ExecutionRecord> {
        if request.code.trim().is_empty() {
            return Err(RunnerError::EmptyCode);
        }

        let started = Instant::now();
        let result = self
            .sandbox
            .execute(&ExecRequest { code: request.code })
            .await;
        info!(
            backend = self.sandbox.name(),
            language = %request.language,
            success = result.is_success(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "execution finished"
        );

        let record = ExecutionRecord::new(request.code, request.language, result);
        if let Some(store) = &self.store {
            let appended = store.append(&record).await;
            if let Err(e) = appended {
                warn!(path = %store.path().display(), error = %e, "failed to record execution");
            }
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use sandbox::ExecResult;

    use super::*;

    /// Echoes the submitted code back on stdout and counts calls.
    #[derive(Default)]
    struct EchoSandbox {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Sandbox for EchoSandbox {
        fn name(&self) -> &str {
            "echo"
        }

        async fn execute(&self, request: &ExecRequest<'_>) -> ExecResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.code.contains("fail") {
                ExecResult::failure("Traceback: fail")
            } else {
                ExecResult::new(request.code.to_string(), String::new())
            }
        }
    }

    #[tokio::test]
    async fn empty_code_is_rejected_before_sandbox() {
        let sandbox = Arc::new(EchoSandbox::default());
        let service = ExecutionService::new(sandbox.clone(), None);

        for code in ["", "   \n\t"] {
            let err = service
                .submit(&SubmitRequest {
                    code,
                    language: Language::Python,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, RunnerError::EmptyCode));
        }
        assert_eq!(sandbox.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_persists_record() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("history.jsonl");
        let service = ExecutionService::new(
            Arc::new(EchoSandbox::default()),
            Some(RecordStore::new(store_path.clone())),
        );

        let ok = service
            .submit(&SubmitRequest {
                code: "print('hi')",
                language: Language::Python,
            })
            .await
            .unwrap();
        let failed = service
            .submit(&SubmitRequest {
                code: "fail()",
                language: Language::Shell,
            })
            .await
            .unwrap();

        assert_eq!(ok.output, "print('hi')");
        assert!(ok.is_success());
        assert_eq!(failed.output, "");
        assert_eq!(failed.error, "Traceback: fail");

        let history = RecordStore::new(store_path).list(10).await.unwrap();
        assert_eq!(history, vec![ok, failed]);
    }

    #[tokio::test]
    async fn store_failure_still_returns_record() {
        let service = ExecutionService::new(
            Arc::new(EchoSandbox::default()),
            Some(RecordStore::new("/proc/no-such-dir/history.jsonl".into())),
        );

        let record = service
            .submit(&SubmitRequest {
                code: "1 + 1",
                language: Language::Python,
            })
            .await
            .unwrap();
        assert_eq!(record.output, "1 + 1");
    }
}
