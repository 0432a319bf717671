//! Converges each repository's label set onto a target list.
//!
//! Labels missing from the target are deleted first, then every target label
//! is updated in place or created.

use labelsmith_core::{Label, LabelApi, LabelsmithResult, RepoRef};
use tracing::debug;

use crate::{
    batch::{run_dry, run_parallel},
    context::LabelContext,
    output::Output,
    pool::JobReport,
};

pub fn sync_labels(
    ctx: &LabelContext,
    out: &Output,
    repos: &[RepoRef],
    labels: &[Label],
) -> LabelsmithResult<()> {
    debug!(repos = repos.len(), labels = labels.len(), "syncing labels");

    if ctx.is_dry_run() {
        let api = ctx.api().as_ref();
        return run_dry(out, repos, |repo, report| plan_sync(api, repo, labels, report));
    }

    let jobs = repos
        .iter()
        .map(|repo| {
            let api = ctx.api().clone();
            let repo = repo.clone();
            let labels = labels.to_vec();
            move || sync_repo(api.as_ref(), &repo, &labels)
        })
        .collect::<Vec<_>>();

    run_parallel(ctx, out, repos, jobs)
}

fn is_target(labels: &[Label], existing: &Label) -> bool {
    labels.iter().any(|label| label.same_as(existing))
}

fn sync_repo(api: &dyn LabelApi, repo: &RepoRef, labels: &[Label]) -> JobReport {
    let mut report = JobReport::new(repo.full_name());

    let existing = match api.list_labels(repo) {
        Ok(existing) => existing,
        Err(err) => {
            report.fail(err, "failed to list labels");
            return report;
        }
    };

    for stale in existing.iter().filter(|e| !is_target(labels, e)) {
        match api.delete_label(&stale.name, repo) {
            Ok(()) => report.info(format!("deleted label '{}'", stale.name)),
            Err(err) => report.fail(err, format!("failed to delete label '{}'", stale.name)),
        }
    }

    for label in labels {
        if existing.iter().any(|e| e.same_as(label)) {
            match api.update_label(label, repo) {
                Ok(()) => report.info(format!("updated label '{}'", label.name)),
                Err(err) => report.fail(err, format!("failed to update label '{}'", label.name)),
            }
        } else {
            match api.create_label(label, repo) {
                Ok(()) => report.info(format!("created label '{}'", label.name)),
                Err(err) => report.fail(err, format!("failed to create label '{}'", label.name)),
            }
        }
    }

    report
}

fn plan_sync(api: &dyn LabelApi, repo: &RepoRef, labels: &[Label], report: &mut JobReport) {
    let existing = match api.list_labels(repo) {
        Ok(existing) => existing,
        Err(err) => return report.fail(err, "failed to list labels"),
    };

    for stale in existing.iter().filter(|e| !is_target(labels, e)) {
        report.info(format!("would delete label '{}'", stale.name));
    }

    for label in labels {
        let verb = if existing.iter().any(|e| e.same_as(label)) {
            "update"
        } else {
            "create"
        };
        report.info(format!(
            "would {verb} label '{}' (#{})",
            label.name, label.color
        ));
    }
}
