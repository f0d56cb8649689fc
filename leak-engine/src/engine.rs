//! Engine entry point.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::aggregates::{Aggregates, TableSlices};
use crate::error::EngineResult;
use crate::frames::Frames;
use crate::heuristics::{evaluate_signal, EvaluationData};
use crate::report::Report;
use crate::signals::{LeakSignal, SignalId};
use crate::table::Table;
use crate::window::EvaluationWindow;

/// The six input tables. An input that was not supplied is an empty table.
#[derive(Clone, Debug, PartialEq)]
pub struct LeakInputs {
    pub orders: Table,
    pub order_lines: Table,
    pub refunds: Table,
    pub payments: Table,
    pub tickets: Table,
    pub discounts: Table,
}

impl Default for LeakInputs {
    fn default() -> Self {
        Self {
            orders: Table::empty("orders"),
            order_lines: Table::empty("order_lines"),
            refunds: Table::empty("refunds"),
            payments: Table::empty("payments"),
            tickets: Table::empty("tickets"),
            discounts: Table::empty("discounts"),
        }
    }
}

impl LeakInputs {
    /// Build inputs from optional tables, substituting empty tables.
    pub fn from_options(
        orders: Option<Table>,
        order_lines: Option<Table>,
        refunds: Option<Table>,
        payments: Option<Table>,
        tickets: Option<Table>,
        discounts: Option<Table>,
    ) -> Self {
        let d = Self::default();
        Self {
            orders: orders.unwrap_or(d.orders),
            order_lines: order_lines.unwrap_or(d.order_lines),
            refunds: refunds.unwrap_or(d.refunds),
            payments: payments.unwrap_or(d.payments),
            tickets: tickets.unwrap_or(d.tickets),
            discounts: discounts.unwrap_or(d.discounts),
        }
    }
}

/// Evaluate all ten signals. Anchors at the current instant when no table
/// carries a parseable timestamp.
pub fn evaluate(inputs: &LeakInputs) -> EngineResult<Report> {
    evaluate_at(inputs, Utc::now())
}

/// Evaluate all ten signals, anchoring at `fallback_anchor` when no table
/// carries a parseable timestamp.
pub fn evaluate_at(inputs: &LeakInputs, fallback_anchor: DateTime<Utc>) -> EngineResult<Report> {
    let frames = Frames::build(
        &inputs.orders,
        &inputs.order_lines,
        &inputs.refunds,
        &inputs.payments,
        &inputs.tickets,
        &inputs.discounts,
    )?;

    let window = EvaluationWindow::from_latest(
        [
            frames.orders.order_ts.as_deref(),
            frames.refunds.refund_ts.as_deref(),
            frames.payments.payment_ts.as_deref(),
        ]
        .into_iter()
        .flatten(),
        fallback_anchor,
    );

    let slices = TableSlices::cut(&window, &frames);
    log::debug!(
        "window {} .. {}: orders {}/{}, refunds {}/{}, payments {}/{}, tickets {}/{}",
        window.start,
        window.anchor,
        slices.orders.window.len(),
        slices.orders.baseline.len(),
        slices.refunds.window.len(),
        slices.refunds.baseline.len(),
        slices.payments.window.len(),
        slices.payments.baseline.len(),
        slices.tickets.window.len(),
        slices.tickets.baseline.len(),
    );

    let aggregates = Aggregates::compute(&frames, &slices);
    let data = EvaluationData {
        frames: &frames,
        slices: &slices,
        aggregates: &aggregates,
    };

    // Indexed parallel collect keeps declaration order.
    let signals: Vec<LeakSignal> = SignalId::ALL
        .as_slice()
        .par_iter()
        .map(|&id| evaluate_signal(id, &data))
        .collect();

    let report = Report::assemble(window.bounds(), aggregates.window.net_revenue, signals);
    log::debug!(
        "evaluated {} signals, total estimated loss {:.2}",
        report.summary.signals,
        report.summary.total_estimated_loss_usd
    );
    Ok(report)
}
