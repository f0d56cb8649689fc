use std::sync::Arc;

use leak_engine::{evaluate_at, LeakInputs, LeakSignal};

use crate::components::run_log_side_effect::RunLogSideEffect;
use crate::components::top_leaks_selector::TopLeaksSelector;
use crate::dashboard::build_dashboard;
use crate::error::PipelineResult;
use crate::inputs::{load_inputs, TablePaths};
use crate::run_log::{deltas, RunLog};
use crate::selector::Selector;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::{Deltas, LeakQuery, RunOutcome, SummaryCards, TEMPLATE};

/// The revenue leak run.
///
/// Pipeline flow:
/// 1. Load the six tables concurrently
/// 2. Evaluate all ten signals on the blocking pool
/// 3. Rank signals and build the dashboard
/// 4. Run side effects (run log append when configured)
/// 5. Compare against the previous logged run
pub struct RevenueLeaksPipeline {
    selector: TopLeaksSelector,
    side_effects: Vec<Box<dyn SideEffect>>,
    run_log: Option<Arc<RunLog>>,
}

impl Default for RevenueLeaksPipeline {
    fn default() -> Self {
        Self::new(TopLeaksSelector::default().k)
    }
}

impl RevenueLeaksPipeline {
    /// A pipeline keeping the top `top_n` leaks, with no run log.
    pub fn new(top_n: usize) -> Self {
        Self {
            selector: TopLeaksSelector { k: top_n },
            side_effects: Vec::new(),
            run_log: None,
        }
    }

    /// Record every run in `log` and report deltas against the previous run.
    pub fn with_run_log(mut self, log: Arc<RunLog>) -> Self {
        self.side_effects
            .push(Box::new(RunLogSideEffect::new(Arc::clone(&log))));
        self.run_log = Some(log);
        self
    }

    pub fn with_side_effect(mut self, side_effect: Box<dyn SideEffect>) -> Self {
        self.side_effects.push(side_effect);
        self
    }

    pub fn selector(&self) -> &dyn Selector<LeakSignal> {
        &self.selector
    }

    /// Load the tables named by `paths` and run.
    pub async fn execute(&self, query: LeakQuery, paths: &TablePaths) -> PipelineResult<RunOutcome> {
        let inputs = load_inputs(paths).await?;
        self.execute_inputs(query, inputs).await
    }

    /// Run against tables already in memory.
    pub async fn execute_inputs(
        &self,
        query: LeakQuery,
        inputs: LeakInputs,
    ) -> PipelineResult<RunOutcome> {
        let anchor = query.run_ts;
        let report = tokio::task::spawn_blocking(move || evaluate_at(&inputs, anchor)).await??;
        log::info!(
            "tenant={} evaluated window {} .. {}, total estimated loss {:.2}",
            query.tenant_id,
            report.window.start,
            report.window.end,
            report.summary.total_estimated_loss_usd
        );

        let dashboard = build_dashboard(&report, &self.selector);

        let query = Arc::new(query);
        let input = Arc::new(SideEffectInput {
            query: Arc::clone(&query),
            dashboard: dashboard.clone(),
        });
        for side_effect in self.side_effects.iter().filter(|s| s.enable(&query)) {
            if let Err(e) = side_effect.run(Arc::clone(&input)).await {
                log::warn!("tenant={} side effect {} failed: {}", query.tenant_id, side_effect.name(), e);
                return Err(e);
            }
        }

        let run_ts = query.run_ts_string();
        let deltas = self.previous_run_deltas(&run_ts, &dashboard.summary_cards).await?;

        Ok(RunOutcome {
            template: TEMPLATE,
            tenant_id: query.tenant_id.clone(),
            run_ts,
            report,
            dashboard,
            deltas,
        })
    }

    /// Compare against the newest logged run strictly earlier than `run_ts`.
    /// Runs replayed out of order never compare against a later one.
    async fn previous_run_deltas(
        &self,
        run_ts: &str,
        current: &SummaryCards,
    ) -> PipelineResult<Deltas> {
        let Some(log) = &self.run_log else {
            return Ok(Deltas::default());
        };
        let previous = log.previous_before(run_ts).await?;
        Ok(deltas(current, previous.as_ref().map(|prev| &prev.summary_cards)))
    }
}
