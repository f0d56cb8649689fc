//! Integration tests for the revenue leak pipeline.
//!
//! Validates that:
//! 1. Tables load from CSV/JSONL files and flow through evaluation into a ranked dashboard
//! 2. Missing optional files behave like empty tables
//! 3. The run log records each run and deltas compare against the previous one
//! 4. Data errors surface as data errors; unsupported formats are rejected
//! 5. A failing side effect fails the run

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use leak_engine::{Severity, SignalId};
use leak_pipeline::error::PipelineError;
use leak_pipeline::side_effect::{SideEffect, SideEffectInput};
use leak_pipeline::{Deltas, LeakQuery, PipelineResult, RevenueLeaksPipeline, RunLog, TablePaths};

// ---------------------------------------------------------------------------
// Test data fixtures
// ---------------------------------------------------------------------------

const ORDERS_CSV: &str = "\
order_id,customer_id,order_ts,gross_revenue,discount_amount,net_revenue,shipping_cost,cogs_total
O1,C1,2024-05-10T00:00:00Z,600.00,0,600.00,0,0
O2,C2,2024-05-20T12:00:00Z,400.00,0,400.00,0,0
";

const REFUNDS_CSV: &str = "\
order_id,refund_ts,refund_amount,refund_reason
O1,2024-05-25T00:00:00Z,600.00,damaged
";

/// The last line stamps the anchor at 2024-06-01T00:00:00Z.
const PAYMENTS_JSONL: &str = r#"{"order_id": "O1", "payment_ts": "2024-05-10T00:00:00Z", "amount": 600.0, "status": "succeeded", "dispute_amount": 0}
{"order_id": "P-anchor", "payment_ts": "2024-06-01T00:00:00Z", "amount": 0, "status": "succeeded", "dispute_amount": 0}
"#;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn refund_spike_paths(dir: &Path) -> TablePaths {
    TablePaths {
        orders: write(dir, "orders.csv", ORDERS_CSV),
        refunds: Some(write(dir, "refunds.csv", REFUNDS_CSV)),
        payments: Some(write(dir, "payments.jsonl", PAYMENTS_JSONL)),
        tickets: Some(dir.join("tickets.csv")),
        ..TablePaths::default()
    }
}

fn query_on_day(day: u32) -> LeakQuery {
    LeakQuery::at("acme", Utc.with_ymd_and_hms(2024, 6, day, 8, 0, 0).unwrap())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_to_end_refund_spike() {
    let dir = tempfile::tempdir().unwrap();
    let paths = refund_spike_paths(dir.path());

    let outcome = RevenueLeaksPipeline::new(3)
        .execute(query_on_day(2), &paths)
        .await
        .unwrap();

    assert_eq!(outcome.report.signals.len(), 10);
    assert_eq!(outcome.report.window.end, "2024-06-01T00:00:00Z");
    assert_eq!(outcome.report.window.start, "2024-05-04T00:00:00Z");

    let top = &outcome.dashboard.top_leaks;
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].signal_id, SignalId::RefundSpike);
    assert!((top[0].estimated_loss_usd - 600.0).abs() < 0.01);
    assert_eq!(top[0].severity, Severity::High);

    let cards = &outcome.dashboard.summary_cards;
    assert_eq!(cards.signals_detected, 10);
    assert!((cards.net_revenue_window - 1000.0).abs() < 0.01);
    assert!(cards.high_severity_count >= 1);
    assert!(
        (cards.total_estimated_leak_usd - outcome.report.summary.total_estimated_loss_usd).abs()
            < 0.01
    );

    // No run log configured, so no comparison.
    assert_eq!(outcome.deltas, Deltas::default());
    assert_eq!(outcome.run_ts, "2024-06-02T08:00:00.000000Z");
}

#[tokio::test]
async fn run_log_tracks_deltas_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let paths = refund_spike_paths(dir.path());
    let log = Arc::new(RunLog::new(dir.path().join("logs/acme/runs.jsonl")));
    let pipeline = RevenueLeaksPipeline::default().with_run_log(Arc::clone(&log));

    let first = pipeline.execute(query_on_day(2), &paths).await.unwrap();
    assert_eq!(first.deltas, Deltas::default());

    // Second run on the same data with the refund removed.
    let quiet_paths = TablePaths {
        refunds: None,
        ..paths.clone()
    };
    let second = pipeline.execute(query_on_day(3), &quiet_paths).await.unwrap();
    let delta = second.deltas.total_estimated_leak_usd_delta.unwrap();
    assert!(
        (delta
            - (second.dashboard.summary_cards.total_estimated_leak_usd
                - first.dashboard.summary_cards.total_estimated_leak_usd))
            .abs()
            < 0.01
    );
    assert!(delta < 0.0);
    assert_eq!(second.deltas.signals_detected_delta, Some(0));

    let history = log.history(30).await.unwrap();
    assert_eq!(history.count, 2);
    let latest = history.latest.unwrap();
    assert_eq!(latest.run_ts, "2024-06-03T08:00:00.000000Z");
    assert_eq!(latest.tenant_id, "acme");
    assert_eq!(latest.template, "revenue_leaks_v1");
    assert_eq!(latest.top_leaks.len(), 10);

    let trend = log.trend(60).await.unwrap();
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].t, "2024-06-02T08:00:00.000000Z");
    assert!(trend[0].leak_usd > trend[1].leak_usd);
}

#[tokio::test]
async fn backfilled_run_compares_against_the_earlier_run() {
    let dir = tempfile::tempdir().unwrap();
    let paths = refund_spike_paths(dir.path());
    let quiet_paths = TablePaths {
        refunds: None,
        ..paths.clone()
    };
    let log = Arc::new(RunLog::new(dir.path().join("runs.jsonl")));
    let pipeline = RevenueLeaksPipeline::default().with_run_log(Arc::clone(&log));

    let day3 = pipeline.execute(query_on_day(3), &quiet_paths).await.unwrap();
    assert_eq!(day3.deltas, Deltas::default());

    // Replaying an older day finds nothing earlier in the log.
    let day2 = pipeline.execute(query_on_day(2), &paths).await.unwrap();
    assert_eq!(day2.deltas, Deltas::default());

    let day4 = pipeline.execute(query_on_day(4), &paths).await.unwrap();
    let delta = day4.deltas.total_estimated_leak_usd_delta.unwrap();
    let expected = day4.dashboard.summary_cards.total_estimated_leak_usd
        - day3.dashboard.summary_cards.total_estimated_leak_usd;
    assert!((delta - expected).abs() < 0.01);
    assert_eq!(log.load(10).await.unwrap().len(), 3);
}

#[tokio::test]
async fn coercion_error_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let orders = write(
        dir.path(),
        "orders.csv",
        "order_id,order_ts,net_revenue\nO1,2024-05-10T00:00:00Z,12.00\nO2,2024-05-11T00:00:00Z,twelve\n",
    );

    let err = RevenueLeaksPipeline::default()
        .execute(query_on_day(2), &TablePaths::new(orders))
        .await
        .unwrap_err();

    assert!(err.is_data_error());
    assert!(err.to_string().contains("orders.net_revenue"), "{}", err);
}

#[tokio::test]
async fn parquet_orders_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let orders = write(dir.path(), "orders.parquet", "PAR1");

    let err = RevenueLeaksPipeline::default()
        .execute(query_on_day(2), &TablePaths::new(orders))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
}

struct FailingSideEffect;

#[async_trait]
impl SideEffect for FailingSideEffect {
    async fn run(&self, input: Arc<SideEffectInput>) -> PipelineResult<()> {
        Err(PipelineError::RunLog {
            path: format!("/unwritable/{}", input.query.tenant_id).into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[tokio::test]
async fn failing_side_effect_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let paths = refund_spike_paths(dir.path());

    let err = RevenueLeaksPipeline::default()
        .with_side_effect(Box::new(FailingSideEffect))
        .execute(query_on_day(2), &paths)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::RunLog { .. }));
    assert!(!err.is_data_error());
}
