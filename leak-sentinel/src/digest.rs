//! Human-readable run digest.

use leak_engine::{LeakSignal, Severity};
use leak_pipeline::{Deltas, RunOutcome};

const WIDTH: usize = 64;

/// Format a dollar amount with comma thousands separators, whole dollars.
pub fn format_dollars(amount: f64) -> String {
    let whole = amount.abs().round() as u64;
    let sign = if amount < 0.0 && whole > 0 { "-" } else { "" };

    let s = whole.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    format!("{}{}", sign, result)
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "!!",
        Severity::Medium => "! ",
        Severity::Low => "  ",
    }
}

fn signed_dollars(delta: f64) -> String {
    if delta > 0.0 {
        format!("+${}", format_dollars(delta))
    } else if delta < 0.0 {
        format!("-${}", format_dollars(-delta))
    } else {
        "$0".to_string()
    }
}

fn format_deltas(deltas: &Deltas) -> Option<String> {
    let leak = deltas.total_estimated_leak_usd_delta?;
    Some(format!(
        "vs previous run: {} leak  \u{00b7}  {:+} high severity  \u{00b7}  {:+} signals",
        signed_dollars(leak),
        deltas.high_severity_count_delta.unwrap_or(0),
        deltas.signals_detected_delta.unwrap_or(0),
    ))
}

fn leak_line(rank: usize, signal: &LeakSignal) -> String {
    format!(
        "  {} {:>2}. {:<26} {:>10}  {:<6}  confidence {:.0}%",
        severity_icon(signal.severity),
        rank,
        signal.signal_id.to_string(),
        format!("${}", format_dollars(signal.estimated_loss_usd)),
        signal.severity.as_str(),
        signal.confidence * 100.0,
    )
}

pub fn print_human(outcome: &RunOutcome, elapsed_ms: u128) {
    let dashboard = &outcome.dashboard;
    let cards = &dashboard.summary_cards;
    let bar = "\u{2550}".repeat(WIDTH - 2);

    println!();
    println!("  \u{2554}{}\u{2557}", bar);
    println!("  \u{2551}{:^width$}\u{2551}", "LEAK SENTINEL \u{2014} Revenue Leak Report", width = WIDTH - 2);
    println!("  \u{255a}{}\u{255d}", bar);
    println!();
    println!(
        "  Window {} .. {}  \u{00b7}  baseline from {}",
        dashboard.window.start, dashboard.window.end, dashboard.window.baseline_start
    );
    println!(
        "  ${} net revenue  \u{00b7}  ${} estimated leak  \u{00b7}  {} high severity of {} signals",
        format_dollars(cards.net_revenue_window),
        format_dollars(cards.total_estimated_leak_usd),
        cards.high_severity_count,
        cards.signals_detected,
    );
    if let Some(line) = format_deltas(&outcome.deltas) {
        println!("  {}", line);
    }
    println!();

    let leaking: Vec<&LeakSignal> = dashboard
        .top_leaks
        .iter()
        .filter(|s| s.estimated_loss_usd > 0.0)
        .collect();

    if leaking.is_empty() {
        println!("  No revenue leaks detected in this window.");
    } else {
        println!("  {:\u{2500}<width$}", "", width = WIDTH);
        for (i, signal) in leaking.iter().enumerate() {
            println!("{}", leak_line(i + 1, signal));
            println!("       {}", signal.reason_code);
        }
        println!("  {:\u{2500}<width$}", "", width = WIDTH);
    }

    println!();
    println!("  tenant {}  \u{00b7}  run {}  \u{00b7}  {}ms", outcome.tenant_id, outcome.run_ts, elapsed_ms);
    println!();
}
