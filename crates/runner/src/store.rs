use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::{RunnerError, RunnerResult};
use crate::lock;
use crate::record::ExecutionRecord;

/// Append-only JSONL history of executions.
///
/// Writers serialize through an flock on `<path>.lock`, so several runner
/// processes can share one history file.
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    pub async fn append(&self, record: &ExecutionRecord) -> RunnerResult<()> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| RunnerError::Store(format!("serialize record: {e}")))?;
        line.push('\n');

        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    RunnerError::Store(format!("create {}: {e}", parent.display()))
                })?;
            }
            _ => {}
        }

        let _guard = lock::acquire(self.lock_path()).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| RunnerError::Store(format!("open {}: {e}", self.path.display())))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| RunnerError::Store(format!("write {}: {e}", self.path.display())))?;
        file.flush()
            .await
            .map_err(|e| RunnerError::Store(format!("flush {}: {e}", self.path.display())))?;
        Ok(())
    }

    /// The newest `limit` records, oldest first. A missing file is an empty history.
    pub async fn list(&self, limit: usize) -> RunnerResult<Vec<ExecutionRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RunnerError::Store(format!(
                    "read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let mut records = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ExecutionRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "skipping malformed history line"
                ),
            }
        }

        let skip = records.len().saturating_sub(limit);
        Ok(records.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use sandbox::{ExecResult, Language};

    use super::*;

    fn record(code: &str) -> ExecutionRecord {
        ExecutionRecord::new(code, Language::Python, ExecResult::new(format!("{code}\n"), String::new()))
    }

    #[tokio::test]
    async fn missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("history.jsonl"));
        assert!(store.list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_then_list_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("nested/history.jsonl"));

        let first = record("a");
        let second = record("b");
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        assert_eq!(store.list(10).await.unwrap(), vec![first, second]);
        assert!(dir.path().join("nested/history.jsonl.lock").exists());
    }

    #[tokio::test]
    async fn list_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("history.jsonl"));
        for code in ["a", "b", "c"] {
            store.append(&record(code)).await.unwrap();
        }

        let codes: Vec<String> = store
            .list(2)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, ["b", "c"]);
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let store = RecordStore::new(path.clone());
        store.append(&record("ok")).await.unwrap();

        let mut content = tokio::fs::read_to_string(&path).await.unwrap();
        content.push_str("{not json\n\n");
        tokio::fs::write(&path, content).await.unwrap();
        store.append(&record("also ok")).await.unwrap();

        let records = store.list(10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].code, "also ok");
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(RecordStore::new(dir.path().join("history.jsonl")));

        let mut tasks = Vec::new();
        for i in 0..20 {
            let store = std::sync::Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.append(&record(&format!("code-{i}"))).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.list(100).await.unwrap().len(), 20);
    }
}
