//! Folds one label into another.
//!
//! Every issue, pull request and discussion carrying `from` gets `to` added
//! and `from` removed. The `from` label is deleted only when every item was
//! relabeled; otherwise it is kept so the merge can be re-run.

use labelsmith_core::{LabelApi, LabelsmithResult, RepoRef};
use tracing::{debug, warn};

use crate::{
    batch::{run_dry, run_parallel},
    context::LabelContext,
    output::Output,
    pool::JobReport,
};

pub fn merge_labels(
    ctx: &LabelContext,
    out: &Output,
    repos: &[RepoRef],
    from: &str,
    to: &str,
) -> LabelsmithResult<()> {
    debug!(repos = repos.len(), from, to, "merging labels");

    if ctx.is_dry_run() {
        let api = ctx.api().as_ref();
        return run_dry(out, repos, |repo, report| plan_merge(api, repo, from, to, report));
    }

    let jobs = repos
        .iter()
        .map(|repo| {
            let api = ctx.api().clone();
            let repo = repo.clone();
            let from = from.to_string();
            let to = to.to_string();
            move || merge_in_repo(api.as_ref(), &repo, &from, &to)
        })
        .collect::<Vec<_>>();

    run_parallel(ctx, out, repos, jobs)
}

/// Resolves the IDs of both labels, recording the first failure.
fn resolve_ids(
    api: &dyn LabelApi,
    repo: &RepoRef,
    from: &str,
    to: &str,
    report: &mut JobReport,
) -> Option<(String, String)> {
    let from_id = match api.label_id(repo, from) {
        Ok(id) => id,
        Err(err) => {
            report.fail(err, format!("failed to resolve label '{from}'"));
            return None;
        }
    };
    let to_id = match api.label_id(repo, to) {
        Ok(id) => id,
        Err(err) => {
            report.fail(err, format!("failed to resolve label '{to}'"));
            return None;
        }
    };
    Some((from_id, to_id))
}

fn merge_in_repo(api: &dyn LabelApi, repo: &RepoRef, from: &str, to: &str) -> JobReport {
    let mut report = JobReport::new(repo.full_name());

    let Some((from_id, to_id)) = resolve_ids(api, repo, from, to, &mut report) else {
        return report;
    };

    let items = match api.search_labelables(repo, from) {
        Ok(items) => items,
        Err(err) => {
            report.fail(err, format!("failed to search items labeled '{from}'"));
            return report;
        }
    };
    debug!(repo = %repo, count = items.len(), "relabeling items");

    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for item in &items {
        if let Err(err) = api.add_labels_to_item(&item.id, std::slice::from_ref(&to_id)) {
            report.fail(err, format!("failed to add label '{to}' to {item}"));
            failed += 1;
            continue;
        }
        if let Err(err) = api.remove_labels_from_item(&item.id, std::slice::from_ref(&from_id)) {
            report.fail(err, format!("failed to remove label '{from}' from {item}"));
            failed += 1;
            continue;
        }
        report.info(format!("relabeled {item}"));
        succeeded += 1;
    }

    if failed > 0 {
        warn!(repo = %repo, failed, "keeping source label after failed relabels");
        report.info(format!("{succeeded} items succeeded, {failed} failed"));
        report.info(format!("skipping deletion of label '{from}'"));
        return report;
    }

    match api.delete_label(from, repo) {
        Ok(()) => report.info(format!("merged label '{from}' into '{to}'")),
        Err(err) => report.fail(err, format!("failed to delete label '{from}'")),
    }

    report
}

fn plan_merge(api: &dyn LabelApi, repo: &RepoRef, from: &str, to: &str, report: &mut JobReport) {
    if resolve_ids(api, repo, from, to, report).is_none() {
        return;
    }

    let items = match api.search_labelables(repo, from) {
        Ok(items) => items,
        Err(err) => {
            return report.fail(err, format!("failed to search items labeled '{from}'"));
        }
    };

    for item in &items {
        report.info(format!("would add label '{to}' to {item}"));
        report.info(format!("would remove label '{from}' from {item}"));
    }
    report.info(format!("would delete label '{from}'"));
}
