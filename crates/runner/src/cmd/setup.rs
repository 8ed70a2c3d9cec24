use clap::Args;
use sandbox::Language;
use sandbox_process::{check_prerequisites, resolve_interpreter};
use tracing::info;

use super::CommonArgs;
use crate::error::RunnerResult;

#[derive(Args)]
pub struct SetupArgs {
    /// Language to check (defaults to the configured language)
    #[arg(long, short)]
    language: Option<Language>,
    #[command(flatten)]
    common: CommonArgs,
}

/// Verify that the interpreter and staging directory are usable.
pub async fn run_setup(args: SetupArgs) -> RunnerResult<()> {
    let config = args.common.load_config().await?;
    let sandbox_config = config.sandbox_config(args.language);

    check_prerequisites(&sandbox_config)?;
    let interpreter = resolve_interpreter(&sandbox_config)?;
    info!(
        language = %sandbox_config.language,
        interpreter = %interpreter.display(),
        staging_dir = %sandbox_config.staging_dir().display(),
        "prerequisites satisfied"
    );
    println!(
        "ok: {} via {}",
        sandbox_config.language,
        interpreter.display()
    );
    Ok(())
}
