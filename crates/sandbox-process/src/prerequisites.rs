use std::path::{Path, PathBuf};

use sandbox::{Result, SandboxConfig, SandboxError};

/// Locate the interpreter binary for `config`.
///
/// An explicit `interpreter` path wins; otherwise the language's program is
/// looked up on `PATH`.
pub fn resolve_interpreter(config: &SandboxConfig) -> Result<PathBuf> {
    match &config.interpreter {
        Some(path) => which::which(path).map_err(|e| {
            SandboxError::BackendNotAvailable(format!(
                "interpreter not usable: {}: {e}",
                path.display()
            ))
        }),
        None => {
            let program = config.language.program();
            which::which(program).map_err(|e| {
                SandboxError::BackendNotAvailable(format!(
                    "{program} not found on PATH: {e}"
                ))
            })
        }
    }
}

/// Verify the interpreter and staging directory before serving submissions.
///
/// Collects all failures and returns them in a single `BackendNotAvailable` error.
pub fn check_prerequisites(config: &SandboxConfig) -> Result<()> {
    let mut errors = Vec::new();

    if let Err(e) = config.validate() {
        errors.push(e.to_string());
    }
    if let Err(e) = resolve_interpreter(config) {
        errors.push(e.to_string());
    }
    check_staging_dir(&config.staging_dir(), &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SandboxError::BackendNotAvailable(errors.join("; ")))
    }
}

fn check_staging_dir(dir: &Path, errors: &mut Vec<String>) {
    if !dir.is_dir() {
        errors.push(format!("staging dir not found: {}", dir.display()));
        return;
    }
    if let Err(e) = tempfile::tempfile_in(dir) {
        errors.push(format!("staging dir not writable: {}: {e}", dir.display()));
    }
}
