use std::{
    fmt::Display,
    io::Write,
    sync::{LazyLock, PoisonError, RwLock},
};

use labelsmith_core::{
    error::{ErrorContext, LabelsmithError},
    input::{dedup_repos, ensure_unique_labels, load_label_file, load_repo_file, parse_label_spec},
    Label, LabelsmithResult, RepoRef,
};
use nu_ansi_term::Color;
use tracing::debug;

use crate::cli::{LabelArgs, RepoArgs};

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap_or_else(PoisonError::into_inner);
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

pub fn interactive_ask(ques: &str) -> LabelsmithResult<String> {
    print!("{ques}");

    std::io::stdout()
        .flush()
        .with_context(|| "flushing stdout stream".to_string())?;

    let mut response = String::new();
    std::io::stdin()
        .read_line(&mut response)
        .with_context(|| "reading input from stdin".to_string())?;

    Ok(response.trim().to_owned())
}

pub fn confirm_action(message: &str) -> LabelsmithResult<bool> {
    let response = interactive_ask(&format!("{} [y/N]: ", message))?;
    Ok(matches!(response.to_lowercase().as_str(), "y" | "yes"))
}

/// Collects repositories from `-r` flags and the repository file, dropping
/// duplicates.
pub fn resolve_repos(args: &RepoArgs) -> LabelsmithResult<Vec<RepoRef>> {
    let mut repos = args
        .repos
        .iter()
        .map(|repo| repo.parse())
        .collect::<LabelsmithResult<Vec<RepoRef>>>()?;

    if let Some(path) = &args.repo_file {
        repos.extend(load_repo_file(path)?);
    }

    let repos = dedup_repos(repos);
    if repos.is_empty() {
        return Err(LabelsmithError::Custom(
            "No repositories given; use --repo or --repo-file".into(),
        ));
    }

    debug!(count = repos.len(), "resolved repositories");
    Ok(repos)
}

/// Collects labels from `-l` flags and the label file.
pub fn resolve_labels(args: &LabelArgs) -> LabelsmithResult<Vec<Label>> {
    let mut labels = args
        .labels
        .iter()
        .map(|spec| parse_label_spec(spec))
        .collect::<LabelsmithResult<Vec<Label>>>()?;

    if let Some(path) = &args.label_file {
        labels.extend(load_label_file(path)?);
    }

    if labels.is_empty() {
        return Err(LabelsmithError::Custom(
            "No labels given; use --label or --file".into(),
        ));
    }

    ensure_unique_labels(&labels)?;
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_resolve_repos_merges_flags_and_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "o/b\n# skipped\no/c").unwrap();

        let args = RepoArgs {
            repos: vec!["o/a".into(), "o/b".into()],
            repo_file: Some(file.path().to_path_buf()),
        };

        let repos = resolve_repos(&args).unwrap();
        assert_eq!(
            repos,
            vec![
                RepoRef::new("o", "a"),
                RepoRef::new("o", "b"),
                RepoRef::new("o", "c")
            ]
        );
    }

    #[test]
    fn test_resolve_repos_requires_one() {
        let args = RepoArgs {
            repos: vec![],
            repo_file: None,
        };
        assert!(matches!(
            resolve_repos(&args),
            Err(LabelsmithError::Custom(_))
        ));
    }

    #[test]
    fn test_resolve_labels_rejects_duplicates() {
        let args = LabelArgs {
            labels: vec!["bug:ff0000".into(), "bug:00ff00".into()],
            label_file: None,
        };
        assert!(matches!(
            resolve_labels(&args),
            Err(LabelsmithError::DuplicateLabel(_))
        ));
    }

    #[test]
    fn test_resolve_labels_from_flags() {
        let args = LabelArgs {
            labels: vec!["bug:ff0000:Broken".into(), "docs".into()],
            label_file: None,
        };
        let labels = resolve_labels(&args).unwrap();
        assert_eq!(labels[0], Label::new("bug", "ff0000").with_description("Broken"));
        assert_eq!(labels[1].name, "docs");
    }

    #[test]
    #[serial]
    fn test_colored_respects_switch() {
        *COLOR.write().unwrap() = false;
        assert_eq!(Colored(Color::Red, "bug").to_string(), "bug");
        *COLOR.write().unwrap() = true;
        assert_eq!(
            Colored(Color::Red, "bug").to_string(),
            format!("{}bug{}", Color::Red.prefix(), Color::Red.suffix())
        );
    }
}
