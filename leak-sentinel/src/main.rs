//! Leak Sentinel command line.
//!
//! Reads up to six business tables, evaluates the ten revenue leak signals,
//! writes the report JSON and prints a ranked digest.
//!
//! Options fall back to environment variables (a `.env` file is loaded first):
//!   LEAK_SENTINEL_OUT       report path
//!   LEAK_SENTINEL_TOP       number of top leaks
//!   LEAK_SENTINEL_RUNS_LOG  run log path
//!   LEAK_SENTINEL_TENANT    tenant id for run log entries
//!
//! Example:
//!   leak-sentinel --orders data/orders.csv --refunds data/refunds.csv --payments data/payments.csv

mod cli;
mod digest;
mod error;

use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use env_logger::{Builder, Env, Target};

use leak_pipeline::{LeakQuery, RevenueLeaksPipeline, RunLog, RunOutcome};

use crate::cli::Cli;
use crate::error::CliError;

fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .init();
}

async fn write_report(path: &Path, json: String) -> Result<(), CliError> {
    let io_err = |source| CliError::WriteReport {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    log::debug!("writing {} bytes to '{}'", json.len(), path.display());
    tokio::fs::write(path, json).await.map_err(io_err)
}

async fn run(cli: &Cli) -> Result<RunOutcome, CliError> {
    let mut pipeline = RevenueLeaksPipeline::new(cli.top);
    if let Some(path) = &cli.runs_log {
        pipeline = pipeline.with_run_log(Arc::new(RunLog::new(path)));
    }

    let outcome = pipeline
        .execute(LeakQuery::new(cli.tenant.as_str()), &cli.table_paths())
        .await?;

    write_report(&cli.out, outcome.report.to_json_pretty()?).await?;
    Ok(outcome)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging();

    let started = Instant::now();
    let outcome = match run(&cli).await {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    };

    println!("wrote {}", cli.out.display());
    if cli.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", CliError::from(e));
                process::exit(1);
            }
        }
    } else {
        digest::print_human(&outcome, started.elapsed().as_millis());
    }
}
