use async_trait::async_trait;
use std::sync::Arc;

use crate::error::PipelineResult;
use crate::types::{Dashboard, LeakQuery};
use crate::util;

/// Input provided to side effects once the dashboard is built.
#[derive(Clone, Debug)]
pub struct SideEffectInput {
    pub query: Arc<LeakQuery>,
    pub dashboard: Dashboard,
}

/// A side effect runs after ranking and does not change the run result.
/// A failing side effect fails the run.
#[async_trait]
pub trait SideEffect: Send + Sync {
    /// Decide if this side effect should run.
    fn enable(&self, _query: &LeakQuery) -> bool {
        true
    }

    /// Execute the side effect.
    async fn run(&self, input: Arc<SideEffectInput>) -> PipelineResult<()>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
