use std::io::Write;
use std::path::Path;

use sandbox::{Result, SandboxError};
use tempfile::NamedTempFile;
use tracing::{trace, warn};

/// File name prefix of every staged source file.
pub const STAGED_PREFIX: &str = "sandbox-";

/// Source text written to a uniquely named temp file.
///
/// The file is removed by [`StagedSource::close`], or on drop if the
/// invocation unwinds or is cancelled before reaching it.
pub(crate) struct StagedSource {
    file: NamedTempFile,
}

impl StagedSource {
    pub(crate) fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the staged file. Failures are logged, never returned.
    pub(crate) fn close(self) {
        let path = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => trace!(path = %path.display(), "removed staged source"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove staged source"),
        }
    }
}

/// Write `code` to a fresh `sandbox-XXXXXX{extension}` file in `dir`.
pub(crate) async fn stage(code: &str, dir: &Path, extension: &str) -> Result<StagedSource> {
    let code = code.to_owned();
    let dir = dir.to_path_buf();
    let extension = extension.to_owned();
    tokio::task::spawn_blocking(move || stage_blocking(&code, &dir, &extension))
        .await
        .map_err(|e| SandboxError::StageFailed(format!("staging task: {e}")))?
}

fn stage_blocking(code: &str, dir: &Path, extension: &str) -> Result<StagedSource> {
    let mut file = tempfile::Builder::new()
        .prefix(STAGED_PREFIX)
        .suffix(extension)
        .tempfile_in(dir)
        .map_err(|e| SandboxError::StageFailed(format!("create in {}: {e}", dir.display())))?;
    let path = file.path().to_path_buf();
    file.write_all(code.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| SandboxError::StageFailed(format!("write {}: {e}", path.display())))?;
    Ok(StagedSource { file })
}
