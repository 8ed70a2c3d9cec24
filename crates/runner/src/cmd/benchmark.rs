use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use sandbox::Language;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::{CommonArgs, build_service};
use crate::error::{RunnerError, RunnerResult};
use crate::service::SubmitRequest;

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Source text to run repeatedly
    code: String,
    /// Language of the source text
    #[arg(long, short)]
    language: Option<Language>,
    /// Total number of executions
    #[arg(long, default_value_t = 8)]
    count: usize,
    /// Executions allowed in flight at once
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
    #[command(flatten)]
    common: CommonArgs,
}

/// Run the same code `count` times with bounded parallelism and log timing.
pub async fn run_benchmark(args: BenchmarkArgs) -> RunnerResult<ExitCode> {
    if args.concurrency == 0 {
        return Err(RunnerError::Config("concurrency must be at least 1".into()));
    }
    let config = args.common.load_config().await?;
    let language = args.language.unwrap_or(config.sandbox.language);
    let service = Arc::new(build_service(&args.common, &config, Some(language))?);
    let code: Arc<str> = Arc::from(args.code.as_str());
    let permits = Arc::new(Semaphore::new(args.concurrency));

    let total = Instant::now();
    let mut tasks = JoinSet::new();
    for _ in 0..args.count {
        let service = Arc::clone(&service);
        let code = Arc::clone(&code);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| RunnerError::Internal(format!("semaphore closed: {e}")))?;
            let t = Instant::now();
            let record = service
                .submit(&SubmitRequest {
                    code: &code,
                    language,
                })
                .await?;
            Ok::<_, RunnerError>((t.elapsed(), record.is_success()))
        });
    }

    let mut durations = Vec::with_capacity(args.count);
    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (elapsed, success) = joined
            .map_err(|e| RunnerError::Internal(format!("benchmark task: {e}")))??;
        durations.push(elapsed);
        if !success {
            failures += 1;
        }
    }

    let summary = Summary::from_durations(&durations);
    info!(
        count = durations.len(),
        failures,
        concurrency = args.concurrency,
        min_ms = summary.min.as_millis() as u64,
        mean_ms = summary.mean.as_millis() as u64,
        max_ms = summary.max.as_millis() as u64,
        total_ms = total.elapsed().as_millis() as u64,
        "benchmark complete"
    );
    println!(
        "runs={} failures={} min={}ms mean={}ms max={}ms total={}ms",
        durations.len(),
        failures,
        summary.min.as_millis(),
        summary.mean.as_millis(),
        summary.max.as_millis(),
        total.elapsed().as_millis()
    );

    if failures > 0 {
        warn!(failures, "some executions reported stderr");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, PartialEq)]
struct Summary {
    min: Duration,
    mean: Duration,
    max: Duration,
}

impl Summary {
    fn from_durations(durations: &[Duration]) -> Self {
        let min = durations.iter().min().copied().unwrap_or_default();
        let max = durations.iter().max().copied().unwrap_or_default();
        let sum: Duration = durations.iter().sum();
        let mean = u32::try_from(durations.len())
            .ok()
            .filter(|n| *n > 0)
            .map(|n| sum / n)
            .unwrap_or_default();
        Self { min, mean, max }
    }
}
