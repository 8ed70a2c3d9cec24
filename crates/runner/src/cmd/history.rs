use clap::Args;

use super::CommonArgs;
use crate::error::{RunnerError, RunnerResult};
use crate::store::RecordStore;

#[derive(Args)]
pub struct HistoryArgs {
    /// Number of most recent executions to show
    #[arg(long, short = 'n', default_value_t = 20)]
    limit: usize,
    #[command(flatten)]
    common: CommonArgs,
}

/// Print recent executions as JSON lines, oldest first.
pub async fn run_history(args: HistoryArgs) -> RunnerResult<()> {
    let config = args.common.load_config().await?;
    let path = args
        .common
        .history_path(&config)
        .ok_or_else(|| RunnerError::Config("no history path configured".into()))?;

    let records = RecordStore::new(path.to_path_buf()).list(args.limit).await?;
    for record in &records {
        let line = serde_json::to_string(record)
            .map_err(|e| RunnerError::Internal(format!("serialize record: {e}")))?;
        println!("{line}");
    }
    Ok(())
}
