mod cmd;
mod config;
mod error;
mod lock;
mod record;
mod service;
mod store;

use std::fmt;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct Elapsed(Instant);

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let d = self.0.elapsed();
        let total_secs = d.as_secs();
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        let millis = d.subsec_millis();
        write!(w, "[{mins:02}:{secs:02}:{millis:03}]")
    }
}

#[derive(Parser)]
#[command(name = "runner", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the interpreter and staging directory are usable
    Setup(cmd::SetupArgs),
    /// Run one submission and print its stdout and stderr
    Exec(cmd::ExecArgs),
    /// Show recorded executions
    History(cmd::HistoryArgs),
    /// Run a snippet many times concurrently and report timing
    Benchmark(cmd::BenchmarkArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the submission's output.
    tracing_subscriber::fmt()
        .with_timer(Elapsed(Instant::now()))
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if nix::unistd::getuid().is_root() {
        warn!("running as root: submitted code runs with root privileges");
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Setup(args) => cmd::run_setup(args).await.map(|()| ExitCode::SUCCESS),
        Command::Exec(args) => cmd::run_exec(args).await,
        Command::History(args) => cmd::run_history(args).await.map(|()| ExitCode::SUCCESS),
        Command::Benchmark(args) => cmd::run_benchmark(args).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
