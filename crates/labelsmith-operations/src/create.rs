use labelsmith_core::{Label, LabelApi, LabelsmithResult, RepoRef};
use tracing::debug;

use crate::{
    batch::{run_dry, run_parallel},
    context::LabelContext,
    output::Output,
    pool::JobReport,
};

/// Creates `labels` in every repository. With `force`, labels that already
/// exist are updated instead of reported as failures.
pub fn create_labels(
    ctx: &LabelContext,
    out: &Output,
    repos: &[RepoRef],
    labels: &[Label],
    force: bool,
) -> LabelsmithResult<()> {
    debug!(repos = repos.len(), labels = labels.len(), force, "creating labels");

    if ctx.is_dry_run() {
        let api = ctx.api().as_ref();
        return run_dry(out, repos, |repo, report| {
            plan_create(api, repo, labels, force, report)
        });
    }

    let jobs = repos
        .iter()
        .map(|repo| {
            let api = ctx.api().clone();
            let repo = repo.clone();
            let labels = labels.to_vec();
            move || create_in_repo(api.as_ref(), &repo, &labels, force)
        })
        .collect::<Vec<_>>();

    run_parallel(ctx, out, repos, jobs)
}

fn create_in_repo(api: &dyn LabelApi, repo: &RepoRef, labels: &[Label], force: bool) -> JobReport {
    let mut report = JobReport::new(repo.full_name());

    for label in labels {
        match api.create_label(label, repo) {
            Ok(()) => report.info(format!("created label '{}'", label.name)),
            Err(err) if force && err.is_already_exists() => {
                match api.update_label(label, repo) {
                    Ok(()) => report.info(format!("updated label '{}'", label.name)),
                    Err(err) => {
                        report.fail(err, format!("failed to update label '{}'", label.name))
                    }
                }
            }
            Err(err) => report.fail(err, format!("failed to create label '{}'", label.name)),
        }
    }

    report
}

fn plan_create(
    api: &dyn LabelApi,
    repo: &RepoRef,
    labels: &[Label],
    force: bool,
    report: &mut JobReport,
) {
    if !force {
        for label in labels {
            report.info(format!(
                "would create label '{}' (#{})",
                label.name, label.color
            ));
        }
        return;
    }

    let existing = match api.list_labels(repo) {
        Ok(existing) => existing,
        Err(err) => return report.fail(err, "failed to list labels"),
    };

    for label in labels {
        if existing.iter().any(|e| e.same_as(label)) {
            report.info(format!(
                "would update label '{}' (#{})",
                label.name, label.color
            ));
        } else {
            report.info(format!(
                "would create label '{}' (#{})",
                label.name, label.color
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use labelsmith_core::{error::LabelsmithError, ApiError};

    use super::*;
    use crate::{
        context::OperationParams,
        test_utils::{repos, CaptureBuffer, MemoryApi},
    };

    fn run(api: &Arc<MemoryApi>, dry_run: bool, force: bool) -> (LabelsmithResult<()>, String) {
        let ctx = LabelContext::new(
            api.clone(),
            OperationParams {
                dry_run,
                parallel_limit: 2,
            },
        );
        let buffer = CaptureBuffer::default();
        let out = Output::new(buffer.clone());
        let result = create_labels(
            &ctx,
            &out,
            &repos(&["o/a", "o/b"]),
            &[Label::new("bug", "ff0000")],
            force,
        );
        (result, buffer.contents())
    }

    #[test]
    fn test_existing_label_fails_without_force() {
        let api = Arc::new(
            MemoryApi::new()
                .with_repo("o/a", &[Label::new("bug", "ff0000")])
                .with_repo("o/b", &[]),
        );

        let (result, output) = run(&api, false, false);

        assert!(matches!(result, Err(LabelsmithError::OperationsFailed)));
        assert!(output.contains("o/a: failed to create label 'bug': label 'bug' in o/a already exists"));
        assert!(output.contains("o/b: created label 'bug'"));
        assert!(output.ends_with("Summary: 1 repositories succeeded, 1 failed\n"));
        assert_eq!(api.label_names("o/b"), vec!["bug"]);
        assert!(api.calls_to("update").is_empty());
    }

    #[test]
    fn test_second_run_is_rejected_without_mutation() {
        let api = Arc::new(MemoryApi::new().with_repo("o/a", &[]).with_repo("o/b", &[]));

        let (first, _) = run(&api, false, false);
        assert!(first.is_ok());

        let (second, output) = run(&api, false, false);
        assert!(second.is_err());
        assert_eq!(output.matches("already exists").count(), 2);
        assert_eq!(api.label_names("o/a"), vec!["bug"]);
        assert_eq!(api.label_names("o/b"), vec!["bug"]);
        assert!(api.calls_to("update").is_empty());
    }

    #[test]
    fn test_force_updates_existing_label() {
        let api = Arc::new(
            MemoryApi::new()
                .with_repo("o/a", &[Label::new("bug", "000000")])
                .with_repo("o/b", &[]),
        );

        let (result, output) = run(&api, false, true);

        assert!(result.is_ok());
        assert!(output.contains("o/a: updated label 'bug'"));
        assert!(output.contains("o/b: created label 'bug'"));
        assert!(output.ends_with("Summary: all operations completed successfully\n"));
        assert_eq!(api.label("o/a", "bug").unwrap().color, "ff0000");
    }

    #[test]
    fn test_output_follows_repository_order() {
        let api = Arc::new(MemoryApi::new().with_repo("o/a", &[]).with_repo("o/b", &[]));
        let (_, output) = run(&api, false, false);

        let a = output.find("o/a: created").unwrap();
        let b = output.find("o/b: created").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_missing_repository_fails_each_label() {
        let api = Arc::new(MemoryApi::new().with_repo("o/a", &[]));
        let (result, output) = run(&api, false, false);

        assert!(result.is_err());
        assert!(output.contains("o/b: failed to create label 'bug': repository 'o/b' not found"));
    }

    #[test]
    fn test_dry_run_does_not_mutate() {
        let api = Arc::new(
            MemoryApi::new()
                .with_repo("o/a", &[Label::new("bug", "000000")])
                .with_repo("o/b", &[]),
        );

        let (result, output) = run(&api, true, false);
        assert!(result.is_ok());
        assert!(api.calls().is_empty());
        assert!(output.contains("o/a: would create label 'bug' (#ff0000)"));

        let (result, output) = run(&api, true, true);
        assert!(result.is_ok());
        assert_eq!(api.calls(), vec!["list o/a", "list o/b"]);
        assert!(output.contains("o/a: would update label 'bug' (#ff0000)"));
        assert!(output.contains("o/b: would create label 'bug' (#ff0000)"));
        assert!(!output.contains("Summary"));
    }

    #[test]
    fn test_dry_run_records_failed_listing() {
        let api = Arc::new(
            MemoryApi::new()
                .with_repo("o/a", &[])
                .with_repo("o/b", &[])
                .fail("list o/a", ApiError::Forbidden),
        );

        let (result, output) = run(&api, true, true);
        assert!(matches!(result, Err(LabelsmithError::OperationsFailed)));
        assert!(output.contains("o/a: failed to list labels: access forbidden"));
        assert!(output.contains("o/b: would create label 'bug'"));
    }
}
