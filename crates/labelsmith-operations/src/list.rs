use labelsmith_core::{LabelApi, LabelsmithResult, RepoRef};
use tracing::debug;

use crate::{batch::run_parallel, context::LabelContext, output::Output, pool::JobReport};

/// Prints the labels of every repository. Listing never mutates, so dry-run
/// makes no difference here.
pub fn list_labels(ctx: &LabelContext, out: &Output, repos: &[RepoRef]) -> LabelsmithResult<()> {
    debug!(repos = repos.len(), "listing labels");

    let jobs = repos
        .iter()
        .map(|repo| {
            let api = ctx.api().clone();
            let repo = repo.clone();
            move || list_repo(api.as_ref(), &repo)
        })
        .collect::<Vec<_>>();

    run_parallel(ctx, out, repos, jobs)
}

fn list_repo(api: &dyn LabelApi, repo: &RepoRef) -> JobReport {
    let mut report = JobReport::new(repo.full_name());

    match api.list_labels(repo) {
        Ok(labels) if labels.is_empty() => report.info("no labels"),
        Ok(labels) => {
            for label in labels {
                match label.description {
                    Some(description) => {
                        report.info(format!("{} #{} {description}", label.name, label.color))
                    }
                    None => report.info(format!("{} #{}", label.name, label.color)),
                }
            }
        }
        Err(err) => report.fail(err, "failed to list labels"),
    }

    report
}
