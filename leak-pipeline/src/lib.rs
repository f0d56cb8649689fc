//! Everything around the leak engine: reading tables from disk, ranking
//! signals into a dashboard, keeping an append-only log of runs, and the
//! async pipeline that ties them together.

pub mod components;
pub mod dashboard;
pub mod error;
pub mod inputs;
pub mod pipelines;
pub mod run_log;
pub mod selector;
pub mod side_effect;
pub mod table_loader;
pub mod types;
pub mod util;

pub use error::{PipelineError, PipelineResult};
pub use inputs::{load_inputs, TablePaths};
pub use pipelines::revenue_leaks::RevenueLeaksPipeline;
pub use run_log::RunLog;
pub use types::{Dashboard, Deltas, LeakQuery, RunEntry, RunOutcome, SummaryCards, TrendPoint};
