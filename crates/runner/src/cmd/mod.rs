mod benchmark;
mod exec;
mod history;
mod setup;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use sandbox::Language;
use sandbox_process::ProcessSandbox;

use crate::config::{self, RunnerConfig};
use crate::error::RunnerResult;
use crate::service::ExecutionService;
use crate::store::RecordStore;

pub use benchmark::{BenchmarkArgs, run_benchmark};
pub use exec::{ExecArgs, run_exec};
pub use history::{HistoryArgs, run_history};
pub use setup::{SetupArgs, run_setup};

/// Options shared by every subcommand.
#[derive(Args)]
pub struct CommonArgs {
    /// Path to runner.yaml config file
    #[arg(long, short, env = "RUNNER_CONFIG")]
    config: Option<PathBuf>,
    /// JSONL history file (overrides `history.path` in the config)
    #[arg(long, env = "RUNNER_HISTORY")]
    history: Option<PathBuf>,
}

impl CommonArgs {
    async fn load_config(&self) -> RunnerResult<RunnerConfig> {
        config::load_or_default(self.config.as_deref()).await
    }

    fn history_path<'a>(&'a self, config: &'a RunnerConfig) -> Option<&'a Path> {
        self.history.as_deref().or(config.history.path.as_deref())
    }
}

/// Build a service around a fresh process sandbox for `language`.
fn build_service(
    common: &CommonArgs,
    config: &RunnerConfig,
    language: Option<Language>,
) -> RunnerResult<ExecutionService> {
    let sandbox = ProcessSandbox::new(config.sandbox_config(language))?;
    let store = common
        .history_path(config)
        .map(|path| RecordStore::new(path.to_path_buf()));
    Ok(ExecutionService::new(Arc::new(sandbox), store))
}
