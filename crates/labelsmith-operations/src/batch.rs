use labelsmith_core::{LabelsmithResult, RepoRef};
use tracing::debug;

use crate::{
    aggregator::{ExecutionResult, RepoResult},
    context::LabelContext,
    output::Output,
    pool::JobReport,
};

/// Runs one job per repository on the worker pool, streams each job's output
/// in repository order, then prints the summary.
///
/// `jobs[i]` must be the job for `repos[i]`.
pub(crate) fn run_parallel<F>(
    ctx: &LabelContext,
    out: &Output,
    repos: &[RepoRef],
    jobs: Vec<F>,
) -> LabelsmithResult<()>
where
    F: FnOnce() -> JobReport + Send,
{
    debug!(repos = repos.len(), "running batch");
    let results = ctx
        .pool()
        .run(jobs, |done, total| out.progress(done, total))?;
    out.clear_progress();

    let mut execution = ExecutionResult::new();
    for (repo, result) in repos.iter().zip(results) {
        out.block(&result.output);
        execution.add(RepoResult::new(repo.full_name(), result.errors));
    }

    out.line(execution.summary());
    execution.into_error().map_or(Ok(()), Err)
}

/// Sequential dry-run driver. `plan` describes the intended changes for one
/// repository and records failed lookups; each repository's lines are
/// written as soon as it is planned.
pub(crate) fn run_dry<P>(out: &Output, repos: &[RepoRef], mut plan: P) -> LabelsmithResult<()>
where
    P: FnMut(&RepoRef, &mut JobReport),
{
    let mut execution = ExecutionResult::new();
    for repo in repos {
        let mut report = JobReport::new(repo.full_name());
        plan(repo, &mut report);
        out.block(report.output());
        execution.add(RepoResult::new(repo.full_name(), report.errors().to_vec()));
    }

    execution.into_error().map_or(Ok(()), Err)
}
