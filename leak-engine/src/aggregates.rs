//! Window and baseline scalar aggregates shared by the heuristics.
//!
//! Computed once per evaluation so no heuristic rescans a table for a sum
//! another heuristic already needed.

use crate::frames::Frames;
use crate::scoring::safe_div;
use crate::thresholds::{STATUS_DISPUTED, STATUS_FAILED};
use crate::window::{EvaluationWindow, Slices};

/// Window/baseline row indices for each timestamped table.
#[derive(Clone, Debug, Default)]
pub struct TableSlices {
    pub orders: Slices,
    pub refunds: Slices,
    pub payments: Slices,
    pub tickets: Slices,
}

impl TableSlices {
    pub fn cut(window: &EvaluationWindow, frames: &Frames) -> Self {
        Self {
            orders: window.slice(frames.orders.order_ts.as_deref()),
            refunds: window.slice(frames.refunds.refund_ts.as_deref()),
            payments: window.slice(frames.payments.payment_ts.as_deref()),
            tickets: window.slice(frames.tickets.created_ts.as_deref()),
        }
    }
}

fn sum_at(values: &[f64], rows: &[usize]) -> f64 {
    rows.iter().map(|&i| values[i]).sum()
}

/// One side (window or baseline) of the scalar aggregates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Side {
    pub order_count: usize,
    pub net_revenue: f64,
    pub gross_revenue: f64,
    pub discount_amount: f64,
    pub shipping_cost: f64,
    pub cogs_total: f64,
    pub refund_count: usize,
    pub refund_amount: f64,
    pub payment_count: usize,
    pub failed_count: usize,
    pub failed_amount: f64,
    pub disputed_count: usize,
    pub dispute_amount: f64,
    pub ticket_count: usize,
}

impl Side {
    fn collect(
        frames: &Frames,
        orders: &[usize],
        refunds: &[usize],
        payments: &[usize],
        tickets: &[usize],
    ) -> Self {
        let o = &frames.orders;
        let p = &frames.payments;

        let failed: Vec<usize> = payments
            .iter()
            .copied()
            .filter(|&i| p.has_status(i, STATUS_FAILED))
            .collect();
        let disputed: Vec<usize> = payments
            .iter()
            .copied()
            .filter(|&i| p.has_status(i, STATUS_DISPUTED))
            .collect();

        Self {
            order_count: orders.len(),
            net_revenue: sum_at(&o.net_revenue, orders),
            gross_revenue: sum_at(&o.gross_revenue, orders),
            discount_amount: sum_at(&o.discount_amount, orders),
            shipping_cost: sum_at(&o.shipping_cost, orders),
            cogs_total: sum_at(&o.cogs_total, orders),
            refund_count: refunds.len(),
            refund_amount: sum_at(&frames.refunds.refund_amount, refunds),
            payment_count: payments.len(),
            failed_count: failed.len(),
            failed_amount: sum_at(&p.amount, &failed),
            disputed_count: disputed.len(),
            dispute_amount: sum_at(&p.dispute_amount, &disputed),
            ticket_count: tickets.len(),
        }
    }

    pub fn refund_rate(&self) -> f64 {
        safe_div(self.refund_amount, self.net_revenue)
    }

    pub fn discount_rate(&self) -> f64 {
        safe_div(self.discount_amount, self.gross_revenue)
    }

    pub fn shipping_ratio(&self) -> f64 {
        safe_div(self.shipping_cost, self.net_revenue)
    }

    pub fn fail_rate(&self) -> f64 {
        safe_div(self.failed_count as f64, self.payment_count as f64)
    }

    /// `(net - cogs - shipping) / net`, 0 when net is 0.
    pub fn margin(&self) -> f64 {
        safe_div(
            self.net_revenue - self.cogs_total - self.shipping_cost,
            self.net_revenue,
        )
    }
}

/// Window and baseline aggregates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregates {
    pub window: Side,
    pub baseline: Side,
}

impl Aggregates {
    pub fn compute(frames: &Frames, slices: &TableSlices) -> Self {
        Self {
            window: Side::collect(
                frames,
                &slices.orders.window,
                &slices.refunds.window,
                &slices.payments.window,
                &slices.tickets.window,
            ),
            baseline: Side::collect(
                frames,
                &slices.orders.baseline,
                &slices.refunds.baseline,
                &slices.payments.baseline,
                &slices.tickets.baseline,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_are_zero_on_empty_side() {
        let side = Side::default();
        assert_eq!(side.refund_rate(), 0.0);
        assert_eq!(side.discount_rate(), 0.0);
        assert_eq!(side.shipping_ratio(), 0.0);
        assert_eq!(side.fail_rate(), 0.0);
        assert_eq!(side.margin(), 0.0);
    }

    #[test]
    fn margin_subtracts_cogs_and_shipping() {
        let side = Side {
            net_revenue: 1000.0,
            cogs_total: 500.0,
            shipping_cost: 100.0,
            ..Side::default()
        };
        assert!((side.margin() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn fail_rate_counts_rows() {
        let side = Side {
            payment_count: 50,
            failed_count: 5,
            ..Side::default()
        };
        assert!((side.fail_rate() - 0.1).abs() < 1e-12);
    }
}
