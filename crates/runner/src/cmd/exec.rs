use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use sandbox::Language;
use tokio::io::AsyncReadExt;

use super::{CommonArgs, build_service};
use crate::error::{RunnerError, RunnerResult};
use crate::service::SubmitRequest;

/// Exit code for submissions rejected before execution.
const EXIT_REJECTED: u8 = 2;

#[derive(Args)]
pub struct ExecArgs {
    /// Source file to run; "-" or nothing reads stdin
    #[arg(conflicts_with = "code")]
    file: Option<PathBuf>,
    /// Inline source text
    #[arg(long, short = 'e')]
    code: Option<String>,
    /// Language of the submission (defaults to the configured language)
    #[arg(long, short)]
    language: Option<Language>,
    /// Print the execution record as JSON instead of the raw streams
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    common: CommonArgs,
}

pub async fn run_exec(args: ExecArgs) -> RunnerResult<ExitCode> {
    let config = args.common.load_config().await?;
    let code = read_code(&args).await?;
    let language = args.language.unwrap_or(config.sandbox.language);
    let service = build_service(&args.common, &config, Some(language))?;

    let record = match service
        .submit(&SubmitRequest {
            code: &code,
            language,
        })
        .await
    {
        Ok(record) => record,
        Err(RunnerError::EmptyCode) => {
            eprintln!("error: {}", RunnerError::EmptyCode);
            return Ok(ExitCode::from(EXIT_REJECTED));
        }
        Err(e) => return Err(e),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| RunnerError::Internal(format!("serialize record: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", record.output);
        eprint!("{}", record.error);
    }

    Ok(if record.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn read_code(args: &ExecArgs) -> RunnerResult<String> {
    if let Some(code) = &args.code {
        return Ok(code.clone());
    }
    match &args.file {
        Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RunnerError::Internal(format!("read {}: {e}", path.display()))),
        _ => {
            let mut code = String::new();
            tokio::io::stdin().read_to_string(&mut code).await?;
            Ok(code)
        }
    }
}
