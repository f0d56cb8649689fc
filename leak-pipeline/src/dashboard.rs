//! Dashboard shaping.

use leak_engine::{LeakSignal, Report, Severity};

use crate::selector::Selector;
use crate::types::{Dashboard, SummaryCards};

/// Rank the report's signals and build the dashboard view. `all_signals` is
/// the full ranking; `top_leaks` is what the selector keeps.
pub fn build_dashboard(report: &Report, selector: &dyn Selector<LeakSignal>) -> Dashboard {
    let ranked = selector.sort(report.signals.clone());
    let top_leaks = selector.select(report.signals.clone());
    let high_severity_count = ranked
        .iter()
        .filter(|s| s.severity == Severity::High)
        .count();

    log::debug!(
        "{} kept {} of {} signals, {} high severity",
        selector.name(),
        top_leaks.len(),
        ranked.len(),
        high_severity_count
    );

    Dashboard {
        window: report.window.clone(),
        summary_cards: SummaryCards {
            total_estimated_leak_usd: report.summary.total_estimated_loss_usd,
            signals_detected: report.summary.signals,
            high_severity_count,
            net_revenue_window: report.summary.net_revenue_window,
        },
        top_leaks,
        all_signals: ranked,
    }
}
