//! Append-only run log.
//!
//! One JSON object per line. Appends through one `RunLog` are serialized;
//! readers tolerate lines they cannot parse.

use std::path::{Path, PathBuf};

use leak_engine::scoring::round_cents;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Deltas, RunEntry, RunHistory, SummaryCards, TrendPoint};
use crate::util::clamp_limit;

pub const DEFAULT_RUNS_LIMIT: usize = 30;
pub const MAX_RUNS_LIMIT: usize = 200;
pub const DEFAULT_TREND_LIMIT: usize = 60;
pub const MAX_TREND_LIMIT: usize = 365;

pub struct RunLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self) -> impl FnOnce(std::io::Error) -> PipelineError + '_ {
        move |source| PipelineError::RunLog {
            path: self.path.clone(),
            source,
        }
    }

    /// Append one entry, creating the file and its parent directories.
    pub async fn append(&self, entry: &RunEntry) -> PipelineResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(self.io_err())?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(self.io_err())?;
        file.write_all(line.as_bytes()).await.map_err(self.io_err())?;
        file.flush().await.map_err(self.io_err())?;

        log::info!(
            "tenant={} appended run {} to '{}'",
            entry.tenant_id,
            entry.run_ts,
            self.path.display()
        );
        Ok(())
    }

    /// The newest `limit` entries, newest first. A missing file is an empty log.
    pub async fn load(&self, limit: usize) -> PipelineResult<Vec<RunEntry>> {
        let text = match tokio::fs::read(&self.path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err()(e)),
        };
        Ok(parse_entries(&text, limit))
    }

    /// The newest entry whose `runTs` sorts strictly before `run_ts`.
    pub async fn previous_before(&self, run_ts: &str) -> PipelineResult<Option<RunEntry>> {
        let entries = self.load(usize::MAX).await?;
        Ok(entries.into_iter().find(|e| e.run_ts.as_str() < run_ts))
    }

    /// Recent runs with deltas between the two newest. `limit` clamps to `[1, 200]`.
    pub async fn history(&self, limit: usize) -> PipelineResult<RunHistory> {
        let runs = self.load(clamp_limit(limit, MAX_RUNS_LIMIT)).await?;
        let deltas = match runs.first() {
            Some(latest) => deltas(
                &latest.summary_cards,
                runs.get(1).map(|prev| &prev.summary_cards),
            ),
            None => Deltas::default(),
        };
        Ok(RunHistory {
            count: runs.len(),
            latest: runs.first().cloned(),
            deltas,
            runs,
        })
    }

    /// Chart points, oldest first. `limit` clamps to `[1, 365]`.
    pub async fn trend(&self, limit: usize) -> PipelineResult<Vec<TrendPoint>> {
        let runs = self.load(clamp_limit(limit, MAX_TREND_LIMIT)).await?;
        Ok(trend_points(&runs))
    }
}

/// Parse log text into entries sorted by `runTs` descending, keeping at most
/// `limit`. Blank and unparsable lines are skipped.
pub fn parse_entries(text: &str, limit: usize) -> Vec<RunEntry> {
    let mut entries: Vec<RunEntry> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("skipping unparsable run log line: {}", e);
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| b.run_ts.cmp(&a.run_ts));
    entries.truncate(limit);
    entries
}

/// Change from `previous` to `current`. All `None` without a previous run.
pub fn deltas(current: &SummaryCards, previous: Option<&SummaryCards>) -> Deltas {
    let Some(previous) = previous else {
        return Deltas::default();
    };
    Deltas {
        total_estimated_leak_usd_delta: Some(round_cents(
            current.total_estimated_leak_usd - previous.total_estimated_leak_usd,
        )),
        high_severity_count_delta: Some(
            current.high_severity_count as i64 - previous.high_severity_count as i64,
        ),
        signals_detected_delta: Some(
            current.signals_detected as i64 - previous.signals_detected as i64,
        ),
    }
}

/// Chart points in chronological order from entries given newest first.
pub fn trend_points(runs: &[RunEntry]) -> Vec<TrendPoint> {
    runs.iter()
        .rev()
        .map(|run| TrendPoint {
            t: run.run_ts.clone(),
            leak_usd: run.summary_cards.total_estimated_leak_usd,
            high: run.summary_cards.high_severity_count,
            signals: run.summary_cards.signals_detected,
        })
        .collect()
}
