use std::sync::Arc;

use labelsmith_config::config::DEFAULT_PARALLEL_LIMIT;
use labelsmith_core::LabelApi;

use crate::pool::WorkerPool;

/// Per-invocation knobs shared by every orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationParams {
    /// Print what would change without calling any mutating endpoint.
    pub dry_run: bool,
    /// Maximum number of repositories processed at once.
    pub parallel_limit: usize,
}

impl Default for OperationParams {
    fn default() -> Self {
        Self {
            dry_run: false,
            parallel_limit: DEFAULT_PARALLEL_LIMIT,
        }
    }
}

/// The label backend and parameters an operation runs against.
#[derive(Clone)]
pub struct LabelContext {
    api: Arc<dyn LabelApi>,
    params: OperationParams,
}

impl LabelContext {
    pub fn new(api: Arc<dyn LabelApi>, params: OperationParams) -> Self {
        Self {
            api,
            params,
        }
    }

    pub fn api(&self) -> &Arc<dyn LabelApi> {
        &self.api
    }

    pub fn params(&self) -> OperationParams {
        self.params
    }

    pub fn is_dry_run(&self) -> bool {
        self.params.dry_run
    }

    pub fn pool(&self) -> WorkerPool {
        WorkerPool::new(self.params.parallel_limit)
    }
}
