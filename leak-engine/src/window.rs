//! Anchor, window and baseline derivation, and per-table slicing.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::thresholds::{BASELINE_DAYS, WINDOW_DAYS};

/// Boundaries of one evaluation. The window is `[start, anchor)`, the
/// baseline is `[baseline_start, baseline_end)` and `baseline_end == start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluationWindow {
    pub anchor: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub baseline_start: DateTime<Utc>,
    pub baseline_end: DateTime<Utc>,
}

impl EvaluationWindow {
    /// Window and baseline ending at `anchor`. Bounds that would fall before
    /// the earliest representable instant clamp to it.
    pub fn ending_at(anchor: DateTime<Utc>) -> Self {
        let start = days_before(anchor, WINDOW_DAYS);
        Self {
            anchor,
            start,
            baseline_start: days_before(start, BASELINE_DAYS),
            baseline_end: start,
        }
    }

    /// Anchor at the latest parseable timestamp across the given columns, or
    /// at `fallback` when none has one.
    pub fn from_latest<'a, I>(columns: I, fallback: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = &'a [Option<DateTime<Utc>>]>,
    {
        let latest = columns
            .into_iter()
            .flat_map(|col| col.iter().flatten().copied())
            .max();
        match latest {
            Some(anchor) => Self::ending_at(anchor),
            None => {
                log::debug!("no parseable timestamps, anchoring at {}", fallback);
                Self::ending_at(fallback)
            }
        }
    }

    pub fn in_window(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.anchor
    }

    pub fn in_baseline(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.baseline_start && ts < self.baseline_end
    }

    /// Split row indices into window and baseline by timestamp. A missing
    /// timestamp column leaves both slices empty.
    pub fn slice(&self, timestamps: Option<&[Option<DateTime<Utc>>]>) -> Slices {
        let mut slices = Slices::default();
        let Some(timestamps) = timestamps else {
            return slices;
        };
        for (idx, ts) in timestamps.iter().enumerate() {
            let Some(ts) = *ts else { continue };
            if self.in_window(ts) {
                slices.window.push(idx);
            } else if self.in_baseline(ts) {
                slices.baseline.push(idx);
            }
        }
        slices
    }

    pub fn bounds(&self) -> WindowBounds {
        WindowBounds {
            start: iso(self.start),
            end: iso(self.anchor),
            baseline_start: iso(self.baseline_start),
            baseline_end: iso(self.baseline_end),
        }
    }
}

fn days_before(ts: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    ts.checked_sub_signed(Duration::days(days))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Row indices of one table falling in the window and in the baseline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slices {
    pub window: Vec<usize>,
    pub baseline: Vec<usize>,
}

/// ISO-8601 window boundaries as reported.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub start: String,
    pub end: String,
    pub baseline_start: String,
    pub baseline_end: String,
}
