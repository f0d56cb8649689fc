//! The ten leak heuristics.
//!
//! Each heuristic reads the shared frames, slices and aggregates and returns a
//! `Finding`. None reads another heuristic's output, so they can run in any
//! order or in parallel. Loss formulas:
//!
//! - Refund spike: window refunds above the baseline refund rate applied to window revenue
//! - SKU refund concentration: window refunds landing on the five most refunded SKUs
//! - Discount overuse: discount rate above max(baseline rate, 10%) applied to gross revenue
//! - Coupon abuse: discount value of codes redeemed more than 3x per customer
//! - Shipping cost creep: shipping above the baseline shipping ratio
//! - Failed payment recovery: window failed payment amounts
//! - Dispute chargeback: disputed amounts plus a fixed fee per dispute
//! - Margin compression: margin points lost applied to window revenue
//! - Support-linked refunds: refunds above a window's share of baseline refunds
//! - Repeat customer churn: customers lost times window average order value

use std::collections::{HashMap, HashSet};

use crate::aggregates::{Aggregates, TableSlices};
use crate::frames::Frames;
use crate::scoring::safe_div;
use crate::signals::{Finding, LeakSignal, SignalId};
use crate::thresholds::*;

/// Everything a heuristic may read.
pub struct EvaluationData<'a> {
    pub frames: &'a Frames,
    pub slices: &'a TableSlices,
    pub aggregates: &'a Aggregates,
}

/// Run one heuristic and score its finding against window net revenue.
pub fn evaluate_signal(id: SignalId, data: &EvaluationData<'_>) -> LeakSignal {
    let agg = data.aggregates;
    let finding = match id {
        SignalId::RefundSpike => refund_spike(agg),
        SignalId::SkuRefundConcentration => sku_refund_concentration(data),
        SignalId::DiscountOveruse => discount_overuse(agg),
        SignalId::CouponAbuse => coupon_abuse(data.frames),
        SignalId::ShippingCostCreep => shipping_cost_creep(agg),
        SignalId::FailedPaymentRecovery => failed_payment_recovery(agg),
        SignalId::DisputeChargeback => dispute_chargeback(agg),
        SignalId::MarginCompression => margin_compression(agg),
        SignalId::SupportLinkedRefunds => support_linked_refunds(agg),
        SignalId::RepeatCustomerChurn => repeat_customer_churn(data),
    };
    log::debug!(
        "{}: loss={:.2} sample={}",
        id.as_str(),
        finding.loss,
        finding.sample_size
    );
    LeakSignal::scored(id, finding, agg.window.net_revenue)
}

fn refund_spike(agg: &Aggregates) -> Finding {
    let (w, b) = (&agg.window, &agg.baseline);
    let rate_w = w.refund_rate();
    let rate_b = b.refund_rate();

    let loss = if rate_w > rate_b * REFUND_SPIKE_FACTOR && w.refund_amount >= REFUND_SPIKE_MIN_USD {
        (w.refund_amount - rate_b * w.net_revenue).max(0.0)
    } else {
        0.0
    };

    Finding::new(loss, w.refund_count)
        .metric("refund_rate_w", rate_w)
        .metric("refund_rate_b", rate_b)
        .metric("refund_w", w.refund_amount)
}

/// Inner join of order lines to window refunds on order_id, summed per SKU.
/// A refund counts once for every line of its order.
fn sku_refund_concentration(data: &EvaluationData<'_>) -> Finding {
    let lines = &data.frames.order_lines;
    let refunds = &data.frames.refunds;
    let window_refunds = &data.slices.refunds.window;
    let empty = Finding::new(0.0, lines.len);

    let (Some(line_orders), Some(skus), Some(refund_orders)) =
        (&lines.order_id, &lines.sku_id, &refunds.order_id)
    else {
        return empty;
    };
    if lines.len == 0 || window_refunds.is_empty() {
        return empty;
    }

    let mut refunds_by_order: HashMap<&str, Vec<f64>> = HashMap::new();
    for &i in window_refunds {
        if let Some(order_id) = refund_orders[i].as_deref() {
            refunds_by_order
                .entry(order_id)
                .or_default()
                .push(refunds.refund_amount[i]);
        }
    }

    // (sku, refunded dollars) in first-seen line order; absent SKUs share one group
    let mut per_sku: Vec<(Option<&str>, f64)> = Vec::new();
    let mut sku_index: HashMap<Option<&str>, usize> = HashMap::new();
    let mut refunded_line_net = 0.0;

    for (i, order_id) in line_orders.iter().enumerate() {
        let Some(amounts) = order_id.as_deref().and_then(|id| refunds_by_order.get(id)) else {
            continue;
        };
        let sku = skus[i].as_deref();
        let slot = *sku_index.entry(sku).or_insert_with(|| {
            per_sku.push((sku, 0.0));
            per_sku.len() - 1
        });
        for amount in amounts {
            per_sku[slot].1 += amount;
            refunded_line_net += lines.line_net[i];
        }
    }

    let refunded_total: f64 = per_sku.iter().map(|(_, v)| v).sum();

    // Stable sort keeps table order among equal totals.
    per_sku.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let top: Vec<_> = per_sku.iter().take(SKU_CONCENTRATION_TOP_N).collect();
    let loss: f64 = top.iter().map(|(_, v)| v).sum();

    Finding::new(loss, lines.len)
        .metric("skus_refunded", per_sku.len() as f64)
        .metric("top_skus", top.len() as f64)
        .metric("refunded_total", refunded_total)
        .metric("top_share", safe_div(loss, refunded_total))
        .metric("refunded_line_net", refunded_line_net)
}

fn discount_overuse(agg: &Aggregates) -> Finding {
    let (w, b) = (&agg.window, &agg.baseline);
    let rate_w = w.discount_rate();
    let rate_b = b.discount_rate();
    let target = rate_b.max(DISCOUNT_TARGET_FLOOR);

    let loss = if rate_w > rate_b + DISCOUNT_OVERUSE_MARGIN {
        ((rate_w - target) * w.gross_revenue).max(0.0)
    } else {
        0.0
    };

    Finding::new(loss, w.order_count)
        .metric("discount_rate_w", rate_w)
        .metric("discount_rate_b", rate_b)
        .metric("target_rate", target)
}

#[derive(Default)]
struct CouponTally<'a> {
    uses: usize,
    customers: HashSet<&'a str>,
    value: f64,
}

/// Discount events carry no timestamp, so the whole table is grouped.
fn coupon_abuse(frames: &Frames) -> Finding {
    let d = &frames.discounts;
    let (Some(codes), Some(customers), Some(values)) =
        (&d.coupon_code, &d.customer_id, &d.discount_value)
    else {
        return Finding::new(0.0, d.len);
    };

    let mut order: Vec<&str> = Vec::new();
    let mut tallies: HashMap<&str, CouponTally<'_>> = HashMap::new();
    for i in 0..d.len {
        // a row without a code is not a redemption of any code
        let Some(code) = codes[i].as_deref() else { continue };
        let tally = tallies.entry(code).or_insert_with(|| {
            order.push(code);
            CouponTally::default()
        });
        tally.uses += 1;
        if let Some(customer) = customers[i].as_deref() {
            tally.customers.insert(customer);
        }
        tally.value += values[i];
    }

    let mut loss = 0.0;
    let mut abusive = 0usize;
    let mut worst_ratio: f64 = 0.0;
    for code in &order {
        let tally = &tallies[code];
        let ratio = tally.uses as f64 / tally.customers.len().max(1) as f64;
        worst_ratio = worst_ratio.max(ratio);
        if ratio > COUPON_USES_PER_CUSTOMER {
            loss += tally.value;
            abusive += 1;
        }
    }

    Finding::new(loss, d.len)
        .metric("codes", order.len() as f64)
        .metric("abusive_codes", abusive as f64)
        .metric("max_uses_per_customer", worst_ratio)
}

fn shipping_cost_creep(agg: &Aggregates) -> Finding {
    let (w, b) = (&agg.window, &agg.baseline);
    let ratio_w = w.shipping_ratio();
    let ratio_b = b.shipping_ratio();

    let loss = if ratio_w > ratio_b * SHIPPING_CREEP_FACTOR {
        (w.shipping_cost - ratio_b * w.net_revenue).max(0.0)
    } else {
        0.0
    };

    Finding::new(loss, w.order_count)
        .metric("shipping_ratio_w", ratio_w)
        .metric("shipping_ratio_b", ratio_b)
}

fn failed_payment_recovery(agg: &Aggregates) -> Finding {
    let (w, b) = (&agg.window, &agg.baseline);
    let rate_w = w.fail_rate();
    let rate_b = b.fail_rate();

    let loss = if rate_w > rate_b + FAILED_PAYMENT_MARGIN {
        w.failed_amount
    } else {
        0.0
    };

    Finding::new(loss, w.payment_count)
        .metric("fail_rate_w", rate_w)
        .metric("fail_rate_b", rate_b)
        .metric("failed_w", w.failed_count as f64)
}

fn dispute_chargeback(agg: &Aggregates) -> Finding {
    let (w, b) = (&agg.window, &agg.baseline);

    let loss = if w.disputed_count as f64 > b.disputed_count as f64 * DISPUTE_COUNT_FACTOR {
        w.dispute_amount + DISPUTE_FEE_USD * w.disputed_count as f64
    } else {
        0.0
    };

    Finding::new(loss, w.payment_count)
        .metric("disputes_w", w.disputed_count as f64)
        .metric("disputes_b", b.disputed_count as f64)
        .metric("dispute_amount_w", w.dispute_amount)
}

fn margin_compression(agg: &Aggregates) -> Finding {
    let (w, b) = (&agg.window, &agg.baseline);
    let margin_w = w.margin();
    let margin_b = b.margin();

    let loss = if margin_w < margin_b - MARGIN_DROP {
        ((margin_b - margin_w) * w.net_revenue).max(0.0)
    } else {
        0.0
    };

    Finding::new(loss, w.order_count)
        .metric("margin_w", margin_w)
        .metric("margin_b", margin_b)
}

fn support_linked_refunds(agg: &Aggregates) -> Finding {
    let (w, b) = (&agg.window, &agg.baseline);

    let tickets_up = w.ticket_count as f64 > b.ticket_count as f64 * SUPPORT_TICKET_FACTOR;
    let refunds_up = w.refund_amount > b.refund_amount * SUPPORT_REFUND_FACTOR;
    let expected = b.refund_amount * WINDOW_TO_BASELINE;
    let loss = if tickets_up && refunds_up {
        (w.refund_amount - expected).max(0.0)
    } else {
        0.0
    };

    Finding::new(loss, w.ticket_count)
        .metric("tickets_w", w.ticket_count as f64)
        .metric("tickets_b", b.ticket_count as f64)
        .metric("refund_w", w.refund_amount)
        .metric("refund_b", b.refund_amount)
}

fn distinct_customers<'a>(customers: &'a [Option<String>], rows: &[usize]) -> usize {
    rows.iter()
        .filter_map(|&i| customers[i].as_deref())
        .collect::<HashSet<&'a str>>()
        .len()
}

fn repeat_customer_churn(data: &EvaluationData<'_>) -> Finding {
    let w = &data.aggregates.window;
    let Some(customers) = &data.frames.orders.customer_id else {
        return Finding::new(0.0, w.order_count);
    };

    let repeaters_w = distinct_customers(customers, &data.slices.orders.window);
    let repeaters_b = distinct_customers(customers, &data.slices.orders.baseline);
    let aov_w = safe_div(w.net_revenue, w.order_count.max(1) as f64);

    let loss = if repeaters_b > repeaters_w {
        (repeaters_b - repeaters_w) as f64 * aov_w
    } else {
        0.0
    };

    Finding::new(loss, w.order_count)
        .metric("repeaters_w", repeaters_w as f64)
        .metric("repeaters_b", repeaters_b as f64)
        .metric("aov_w", aov_w)
}
