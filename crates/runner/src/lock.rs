use std::path::PathBuf;

use nix::fcntl::{Flock, FlockArg};

use crate::error::{RunnerError, RunnerResult};

/// Take an exclusive flock on `path`, creating it if needed. Blocks until
/// available; the lock is released when the guard is dropped.
pub async fn acquire(path: PathBuf) -> RunnerResult<Flock<std::fs::File>> {
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::options()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| RunnerError::Store(format!("open lock {}: {e}", path.display())))?;
        Flock::lock(file, FlockArg::LockExclusive)
            .map_err(|(_file, e)| RunnerError::Store(format!("flock {}: {e}", path.display())))
    })
    .await
    .map_err(|e| RunnerError::Internal(format!("lock task: {e}")))?
}
