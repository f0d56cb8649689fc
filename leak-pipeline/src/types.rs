use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use leak_engine::{LeakSignal, Report, WindowBounds};

/// Template identifier recorded in every run entry.
pub const TEMPLATE: &str = "revenue_leaks_v1";

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// One run request: who it is for and when it happens.
#[derive(Clone, Debug, PartialEq)]
pub struct LeakQuery {
    pub tenant_id: String,
    /// Run instant. Also the evaluation anchor when no table has a timestamp.
    pub run_ts: DateTime<Utc>,
}

impl LeakQuery {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self::at(tenant_id, Utc::now())
    }

    pub fn at(tenant_id: impl Into<String>, run_ts: DateTime<Utc>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            run_ts,
        }
    }

    /// Run timestamp as stored in the run log, e.g. `2024-06-01T08:30:00.000000Z`.
    /// Fixed width, so lexical order is chronological order.
    pub fn run_ts_string(&self) -> String {
        self.run_ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Headline numbers for one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCards {
    pub total_estimated_leak_usd: f64,
    pub signals_detected: usize,
    pub high_severity_count: usize,
    pub net_revenue_window: f64,
}

/// Report reshaped for display: ranked signals plus summary cards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub window: WindowBounds,
    pub summary_cards: SummaryCards,
    pub top_leaks: Vec<LeakSignal>,
    pub all_signals: Vec<LeakSignal>,
}

// ---------------------------------------------------------------------------
// Run log
// ---------------------------------------------------------------------------

/// One line of the run log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEntry {
    pub run_ts: String,
    pub tenant_id: String,
    pub template: String,
    pub summary_cards: SummaryCards,
    pub window: WindowBounds,
    #[serde(default)]
    pub top_leaks: Vec<LeakSignal>,
}

impl RunEntry {
    pub fn from_dashboard(query: &LeakQuery, dashboard: &Dashboard) -> Self {
        Self {
            run_ts: query.run_ts_string(),
            tenant_id: query.tenant_id.clone(),
            template: TEMPLATE.to_string(),
            summary_cards: dashboard.summary_cards.clone(),
            window: dashboard.window.clone(),
            top_leaks: dashboard.top_leaks.clone(),
        }
    }
}

/// Change against the previous run. All `None` when there is no previous run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deltas {
    pub total_estimated_leak_usd_delta: Option<f64>,
    pub high_severity_count_delta: Option<i64>,
    pub signals_detected_delta: Option<i64>,
}

/// Compact chart point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub t: String,
    pub leak_usd: f64,
    pub high: usize,
    pub signals: usize,
}

/// Recent runs with the latest-vs-previous deltas.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHistory {
    pub count: usize,
    pub latest: Option<RunEntry>,
    pub deltas: Deltas,
    /// Newest first.
    pub runs: Vec<RunEntry>,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Everything one pipeline run produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub template: &'static str,
    pub tenant_id: String,
    pub run_ts: String,
    #[serde(skip)]
    pub report: Report,
    pub dashboard: Dashboard,
    pub deltas: Deltas,
}
