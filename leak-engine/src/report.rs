//! Report assembly.

use serde::{Deserialize, Serialize};

use crate::scoring::round_cents;
use crate::signals::LeakSignal;
use crate::window::WindowBounds;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of signals in the report. Always ten.
    pub signals: usize,
    pub total_estimated_loss_usd: f64,
    pub net_revenue_window: f64,
}

/// Full evaluation output. Signals are in declaration order, unranked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub window: WindowBounds,
    pub summary: Summary,
    pub signals: Vec<LeakSignal>,
}

impl Report {
    pub fn assemble(window: WindowBounds, net_revenue_window: f64, signals: Vec<LeakSignal>) -> Self {
        let total = round_cents(signals.iter().map(|s| s.estimated_loss_usd).sum());
        Self {
            window,
            summary: Summary {
                signals: signals.len(),
                total_estimated_loss_usd: total,
                net_revenue_window: round_cents(net_revenue_window),
            },
            signals,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
