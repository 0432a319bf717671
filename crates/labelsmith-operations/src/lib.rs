pub mod aggregator;
pub mod context;
pub mod output;
pub mod pool;

pub mod create;
pub mod delete;
pub mod empty;
pub mod list;
pub mod merge;
pub mod sync;

mod batch;

#[cfg(test)]
pub(crate) mod test_utils;

pub use aggregator::{ExecutionResult, RepoResult};
pub use context::{LabelContext, OperationParams};
pub use output::Output;
pub use pool::{JobReport, JobResult, WorkerPool};
