use labelsmith_core::{LabelApi, LabelsmithResult, RepoRef};
use tracing::debug;

use crate::{
    batch::{run_dry, run_parallel},
    context::LabelContext,
    output::Output,
    pool::JobReport,
};

/// Deletes the named labels from every repository.
pub fn delete_labels(
    ctx: &LabelContext,
    out: &Output,
    repos: &[RepoRef],
    names: &[String],
) -> LabelsmithResult<()> {
    debug!(repos = repos.len(), labels = names.len(), "deleting labels");

    if ctx.is_dry_run() {
        return run_dry(out, repos, |_, report| {
            for name in names {
                report.info(format!("would delete label '{name}'"));
            }
        });
    }

    let jobs = repos
        .iter()
        .map(|repo| {
            let api = ctx.api().clone();
            let repo = repo.clone();
            let names = names.to_vec();
            move || delete_in_repo(api.as_ref(), &repo, &names)
        })
        .collect::<Vec<_>>();

    run_parallel(ctx, out, repos, jobs)
}

fn delete_in_repo(api: &dyn LabelApi, repo: &RepoRef, names: &[String]) -> JobReport {
    let mut report = JobReport::new(repo.full_name());
    for name in names {
        match api.delete_label(name, repo) {
            Ok(()) => report.info(format!("deleted label '{name}'")),
            Err(err) => report.fail(err, format!("failed to delete label '{name}'")),
        }
    }
    report
}
