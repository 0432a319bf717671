use labelsmith_core::{LabelApi, LabelsmithResult, RepoRef};
use tracing::debug;

use crate::{
    batch::{run_dry, run_parallel},
    context::LabelContext,
    output::Output,
    pool::JobReport,
};

/// Deletes every label from every repository.
pub fn empty_labels(ctx: &LabelContext, out: &Output, repos: &[RepoRef]) -> LabelsmithResult<()> {
    debug!(repos = repos.len(), "emptying labels");

    if ctx.is_dry_run() {
        let api = ctx.api().as_ref();
        return run_dry(out, repos, |repo, report| {
            match api.list_labels(repo) {
                Ok(labels) if labels.is_empty() => report.info("no labels to delete"),
                Ok(labels) => {
                    for label in labels {
                        report.info(format!("would delete label '{}'", label.name));
                    }
                }
                Err(err) => report.fail(err, "failed to list labels"),
            }
        });
    }

    let jobs = repos
        .iter()
        .map(|repo| {
            let api = ctx.api().clone();
            let repo = repo.clone();
            move || empty_repo(api.as_ref(), &repo)
        })
        .collect::<Vec<_>>();

    run_parallel(ctx, out, repos, jobs)
}

fn empty_repo(api: &dyn LabelApi, repo: &RepoRef) -> JobReport {
    let mut report = JobReport::new(repo.full_name());

    let labels = match api.list_labels(repo) {
        Ok(labels) => labels,
        Err(err) => {
            report.fail(err, "failed to list labels");
            return report;
        }
    };

    if labels.is_empty() {
        report.info("no labels to delete");
    }

    for label in labels {
        match api.delete_label(&label.name, repo) {
            Ok(()) => report.info(format!("deleted label '{}'", label.name)),
            Err(err) => report.fail(err, format!("failed to delete label '{}'", label.name)),
        }
    }

    report
}
