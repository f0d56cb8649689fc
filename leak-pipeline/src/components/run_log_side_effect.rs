use async_trait::async_trait;
use std::sync::Arc;

use crate::error::PipelineResult;
use crate::run_log::RunLog;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::RunEntry;

/// Appends each run's summary to the tenant's run log.
pub struct RunLogSideEffect {
    log: Arc<RunLog>,
}

impl RunLogSideEffect {
    pub fn new(log: Arc<RunLog>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl SideEffect for RunLogSideEffect {
    async fn run(&self, input: Arc<SideEffectInput>) -> PipelineResult<()> {
        let entry = RunEntry::from_dashboard(&input.query, &input.dashboard);
        self.log.append(&entry).await
    }
}
