//! Signal identities and the scored signal record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scoring::{confidence, round_cents, severity, Severity};

/// The ten leak heuristics, in report order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalId {
    RefundSpike,
    SkuRefundConcentration,
    DiscountOveruse,
    CouponAbuse,
    ShippingCostCreep,
    FailedPaymentRecovery,
    DisputeChargeback,
    MarginCompression,
    SupportLinkedRefunds,
    RepeatCustomerChurn,
}

impl SignalId {
    /// Every signal in declaration order. Reports list signals in this order.
    pub const ALL: [SignalId; 10] = [
        SignalId::RefundSpike,
        SignalId::SkuRefundConcentration,
        SignalId::DiscountOveruse,
        SignalId::CouponAbuse,
        SignalId::ShippingCostCreep,
        SignalId::FailedPaymentRecovery,
        SignalId::DisputeChargeback,
        SignalId::MarginCompression,
        SignalId::SupportLinkedRefunds,
        SignalId::RepeatCustomerChurn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalId::RefundSpike => "refund_spike",
            SignalId::SkuRefundConcentration => "sku_refund_concentration",
            SignalId::DiscountOveruse => "discount_overuse",
            SignalId::CouponAbuse => "coupon_abuse",
            SignalId::ShippingCostCreep => "shipping_cost_creep",
            SignalId::FailedPaymentRecovery => "failed_payment_recovery",
            SignalId::DisputeChargeback => "dispute_chargeback",
            SignalId::MarginCompression => "margin_compression",
            SignalId::SupportLinkedRefunds => "support_linked_refunds",
            SignalId::RepeatCustomerChurn => "repeat_customer_churn",
        }
    }

    /// Stable machine-readable reason attached to every emitted signal.
    pub fn reason_code(&self) -> &'static str {
        match self {
            SignalId::RefundSpike => "refund_rate_20pct_above_baseline",
            SignalId::SkuRefundConcentration => "top_sku_refund_concentration",
            SignalId::DiscountOveruse => "discount_rate_above_baseline_plus_3pp",
            SignalId::CouponAbuse => "high_redemption_per_user",
            SignalId::ShippingCostCreep => "shipping_ratio_15pct_above_baseline",
            SignalId::FailedPaymentRecovery => "failed_payment_rate_above_baseline_plus_2pp",
            SignalId::DisputeChargeback => "dispute_count_20pct_above_baseline",
            SignalId::MarginCompression => "margin_drop_3pp",
            SignalId::SupportLinkedRefunds => "support_growth_with_refund_growth",
            SignalId::RepeatCustomerChurn => "repeat_customer_decline",
        }
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalId::RefundSpike => write!(f, "Refund Spike"),
            SignalId::SkuRefundConcentration => write!(f, "SKU Refund Concentration"),
            SignalId::DiscountOveruse => write!(f, "Discount Overuse"),
            SignalId::CouponAbuse => write!(f, "Coupon Abuse"),
            SignalId::ShippingCostCreep => write!(f, "Shipping Cost Creep"),
            SignalId::FailedPaymentRecovery => write!(f, "Failed Payment Recovery"),
            SignalId::DisputeChargeback => write!(f, "Dispute Chargeback"),
            SignalId::MarginCompression => write!(f, "Margin Compression"),
            SignalId::SupportLinkedRefunds => write!(f, "Support-Linked Refunds"),
            SignalId::RepeatCustomerChurn => write!(f, "Repeat Customer Churn"),
        }
    }
}

/// Raw output of one heuristic, before scoring.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Finding {
    /// Estimated loss before rounding. Negative values clamp to zero.
    pub loss: f64,
    /// Rows that contributed to the estimate.
    pub sample_size: usize,
    /// Inputs of the heuristic's threshold test.
    pub metrics: BTreeMap<String, f64>,
}

impl Finding {
    pub fn new(loss: f64, sample_size: usize) -> Self {
        Self {
            loss,
            sample_size,
            metrics: BTreeMap::new(),
        }
    }

    pub fn metric(mut self, key: &str, value: f64) -> Self {
        self.metrics.insert(key.to_string(), value);
        self
    }
}

/// One scored leak signal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeakSignal {
    pub signal_id: SignalId,
    pub estimated_loss_usd: f64,
    pub severity: Severity,
    pub confidence: f64,
    pub reason_code: String,
    pub metrics: BTreeMap<String, f64>,
}

impl LeakSignal {
    /// Score a finding against window net revenue.
    pub fn scored(signal_id: SignalId, finding: Finding, revenue_window: f64) -> Self {
        let loss = if finding.loss.is_finite() {
            finding.loss.max(0.0)
        } else {
            0.0
        };
        Self {
            signal_id,
            estimated_loss_usd: round_cents(loss),
            severity: severity(loss, revenue_window),
            confidence: confidence(finding.sample_size, 1.0),
            reason_code: signal_id.reason_code().to_string(),
            metrics: finding.metrics,
        }
    }
}
