//! Centralized constants for leak signal evaluation.
//!
//! Every comparison in `heuristics.rs` and `scoring.rs` reads from here.
//! Changing a value changes the reported loss for every tenant.

/// Length of the current window, in days.
pub const WINDOW_DAYS: i64 = 28;
/// Length of the baseline window immediately preceding the current window, in days.
pub const BASELINE_DAYS: i64 = 84;

// --- Severity ---

/// Loss / window revenue at or above which a signal is high severity.
pub const SEVERITY_HIGH_RATIO: f64 = 0.08;
/// Absolute loss at or above which a signal is high severity.
pub const SEVERITY_HIGH_LOSS: f64 = 10_000.0;
/// Loss / window revenue at or above which a signal is medium severity.
pub const SEVERITY_MEDIUM_RATIO: f64 = 0.03;
/// Absolute loss at or above which a signal is medium severity.
pub const SEVERITY_MEDIUM_LOSS: f64 = 2_500.0;

// --- Confidence ---

/// Rows needed for the sample term to saturate.
pub const CONFIDENCE_SAMPLE_SCALE: f64 = 1000.0;
/// Sample term floor added before saturation.
pub const CONFIDENCE_SAMPLE_FLOOR: f64 = 0.2;
pub const CONFIDENCE_COMPLETENESS_WEIGHT: f64 = 0.6;
pub const CONFIDENCE_SAMPLE_WEIGHT: f64 = 0.4;
pub const CONFIDENCE_MIN: f64 = 0.1;
pub const CONFIDENCE_MAX: f64 = 1.0;

// --- Heuristics ---

/// Refund rate must exceed baseline rate by this factor.
pub const REFUND_SPIKE_FACTOR: f64 = 1.2;
/// Minimum window refund dollars for a refund spike.
pub const REFUND_SPIKE_MIN_USD: f64 = 500.0;
/// SKUs counted toward refund concentration.
pub const SKU_CONCENTRATION_TOP_N: usize = 5;
/// Discount rate must exceed baseline rate by this many points.
pub const DISCOUNT_OVERUSE_MARGIN: f64 = 0.03;
/// Floor on the discount rate considered acceptable.
pub const DISCOUNT_TARGET_FLOOR: f64 = 0.10;
/// Redemptions per distinct customer above which a coupon is abused.
pub const COUPON_USES_PER_CUSTOMER: f64 = 3.0;
/// Shipping ratio must exceed baseline ratio by this factor.
pub const SHIPPING_CREEP_FACTOR: f64 = 1.15;
/// Failed payment rate must exceed baseline rate by this many points.
pub const FAILED_PAYMENT_MARGIN: f64 = 0.02;
/// Dispute count must exceed baseline count by this factor.
pub const DISPUTE_COUNT_FACTOR: f64 = 1.2;
/// Per-dispute processing fee added to disputed amounts.
pub const DISPUTE_FEE_USD: f64 = 15.0;
/// Margin must fall below baseline margin by this many points.
pub const MARGIN_DROP: f64 = 0.03;
/// Ticket count must exceed baseline count by this factor.
pub const SUPPORT_TICKET_FACTOR: f64 = 1.2;
/// Refund dollars must exceed baseline dollars by this factor.
pub const SUPPORT_REFUND_FACTOR: f64 = 1.1;

/// Scales baseline totals down to one window's worth.
pub const WINDOW_TO_BASELINE: f64 = WINDOW_DAYS as f64 / BASELINE_DAYS as f64;

pub const STATUS_FAILED: &str = "failed";
pub const STATUS_DISPUTED: &str = "disputed";
