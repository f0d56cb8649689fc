use std::path::PathBuf;

use clap::Parser;
use leak_pipeline::TablePaths;

/// Scan business tables for revenue leaks and write a scored report.
///
/// Every option can also come from the environment (or a `.env` file).
#[derive(Debug, Parser)]
#[command(name = "leak-sentinel", version, about)]
pub struct Cli {
    /// Orders table (.csv, .jsonl or .json)
    #[arg(long)]
    pub orders: PathBuf,

    /// Order lines table
    #[arg(long)]
    pub order_lines: Option<PathBuf>,

    /// Refunds table
    #[arg(long)]
    pub refunds: Option<PathBuf>,

    /// Payments table
    #[arg(long)]
    pub payments: Option<PathBuf>,

    /// Support tickets table
    #[arg(long)]
    pub tickets: Option<PathBuf>,

    /// Discount events table
    #[arg(long)]
    pub discounts: Option<PathBuf>,

    /// Where to write the report JSON
    #[arg(long, env = "LEAK_SENTINEL_OUT", default_value = "reports/leak_signals_v1.json")]
    pub out: PathBuf,

    /// Number of top leaks to show
    #[arg(long, env = "LEAK_SENTINEL_TOP", default_value_t = 10)]
    pub top: usize,

    /// Append each run to this JSONL log and report deltas against the previous run
    #[arg(long, env = "LEAK_SENTINEL_RUNS_LOG")]
    pub runs_log: Option<PathBuf>,

    /// Tenant recorded in run log entries
    #[arg(long, env = "LEAK_SENTINEL_TENANT", default_value = "local")]
    pub tenant: String,

    /// Print the run as JSON instead of formatted text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn table_paths(&self) -> TablePaths {
        TablePaths {
            orders: self.orders.clone(),
            order_lines: self.order_lines.clone(),
            refunds: self.refunds.clone(),
            payments: self.payments.clone(),
            tickets: self.tickets.clone(),
            discounts: self.discounts.clone(),
        }
    }
}
