//! Loading repositories and labels from command-line values and files.

use std::{collections::HashSet, fs, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::{
    color::{derive_color, normalize_color},
    error::{ErrorContext, LabelsmithError},
    types::{Label, RepoRef},
    LabelsmithResult,
};

/// A label as written in a label file; color and description are optional.
#[derive(Debug, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl LabelSpec {
    pub fn into_label(self) -> LabelsmithResult<Label> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(LabelsmithError::InvalidLabel(self.name));
        }

        let color = match self.color.as_deref().map(str::trim) {
            Some(color) if !color.is_empty() => normalize_color(color)?,
            _ => derive_color(&name),
        };

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Label {
            name,
            color,
            description,
        })
    }
}

/// Parses an inline label of the form `name[:color[:description]]`.
///
/// The description may itself contain colons.
pub fn parse_label_spec(input: &str) -> LabelsmithResult<Label> {
    let mut parts = input.splitn(3, ':');
    let name = parts.next().unwrap_or_default();
    if name.trim().is_empty() {
        return Err(LabelsmithError::InvalidLabel(input.to_string()));
    }

    LabelSpec {
        name: name.to_string(),
        color: parts.next().map(String::from),
        description: parts.next().map(String::from),
    }
    .into_label()
}

/// Reads a JSON or YAML label file, choosing the format by extension.
pub fn load_label_file(path: &Path) -> LabelsmithResult<Vec<Label>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading label file {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let specs: Vec<LabelSpec> = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content)?,
        Some("yml" | "yaml") => serde_yaml::from_str(&content)?,
        _ => {
            return Err(LabelsmithError::UnsupportedLabelFile(
                path.display().to_string(),
            ))
        }
    };

    debug!(path = %path.display(), count = specs.len(), "loaded label file");

    specs.into_iter().map(LabelSpec::into_label).collect()
}

/// Rejects label lists that name the same label twice.
pub fn ensure_unique_labels(labels: &[Label]) -> LabelsmithResult<()> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label.name.as_str()) {
            return Err(LabelsmithError::DuplicateLabel(label.name.clone()));
        }
    }
    Ok(())
}

/// Parses a repository list with one `owner/name` per line. Blank lines and
/// `#` comments are ignored.
pub fn parse_repo_list(content: &str) -> LabelsmithResult<Vec<RepoRef>> {
    content
        .lines()
        .map(|line| line.split_once('#').map_or(line, |(before, _)| before).trim())
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect()
}

pub fn load_repo_file(path: &Path) -> LabelsmithResult<Vec<RepoRef>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading repository file {}", path.display()))?;
    parse_repo_list(&content)
}

/// Removes duplicate repositories, keeping the first occurrence.
pub fn dedup_repos(repos: Vec<RepoRef>) -> Vec<RepoRef> {
    let mut seen = HashSet::new();
    repos
        .into_iter()
        .filter(|repo| seen.insert(repo.full_name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::Builder;

    use super::*;

    #[test]
    fn test_parse_label_spec_full() {
        let label = parse_label_spec("bug:#D73A4A:Something isn't working: really").unwrap();
        assert_eq!(label.name, "bug");
        assert_eq!(label.color, "d73a4a");
        assert_eq!(
            label.description.as_deref(),
            Some("Something isn't working: really")
        );
    }

    #[test]
    fn test_parse_label_spec_derives_color() {
        let label = parse_label_spec("needs triage").unwrap();
        assert_eq!(label.color, derive_color("needs triage"));
        assert!(label.description.is_none());

        let label = parse_label_spec("docs::").unwrap();
        assert_eq!(label.color, derive_color("docs"));
        assert!(label.description.is_none());
    }

    #[test]
    fn test_parse_label_spec_invalid() {
        assert!(matches!(
            parse_label_spec(":ff0000"),
            Err(LabelsmithError::InvalidLabel(_))
        ));
        assert!(matches!(
            parse_label_spec("bug:red"),
            Err(LabelsmithError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_load_yaml_label_file() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "- name: bug\n  color: ff0000\n  description: Broken\n- name: feature"
        )
        .unwrap();

        let labels = load_label_file(file.path()).unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0], Label::new("bug", "ff0000").with_description("Broken"));
        assert_eq!(labels[1].color, derive_color("feature"));
    }

    #[test]
    fn test_load_json_label_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r##"[{{"name": "bug", "color": "#FF0000"}}, {{"name": "question", "description": ""}}]"##
        )
        .unwrap();

        let labels = load_label_file(file.path()).unwrap();
        assert_eq!(labels[0], Label::new("bug", "ff0000"));
        assert!(labels[1].description.is_none());
    }

    #[test]
    fn test_load_label_file_unsupported_extension() {
        let file = Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            load_label_file(file.path()),
            Err(LabelsmithError::UnsupportedLabelFile(_))
        ));
    }

    #[test]
    fn test_ensure_unique_labels() {
        let labels = vec![Label::new("bug", "ff0000"), Label::new("bug", "00ff00")];
        assert!(matches!(
            ensure_unique_labels(&labels),
            Err(LabelsmithError::DuplicateLabel(name)) if name == "bug"
        ));
        assert!(ensure_unique_labels(&labels[..1]).is_ok());
    }

    #[test]
    fn test_parse_repo_list() {
        let repos = parse_repo_list("# org repos\no/a\n\n  o/b  # trailing\n").unwrap();
        assert_eq!(repos, vec![RepoRef::new("o", "a"), RepoRef::new("o", "b")]);

        assert!(parse_repo_list("o/a\nbroken\n").is_err());
    }

    #[test]
    fn test_dedup_repos_keeps_first() {
        let repos = dedup_repos(vec![
            RepoRef::new("o", "b"),
            RepoRef::new("o", "a"),
            RepoRef::new("o", "b"),
        ]);
        assert_eq!(repos, vec![RepoRef::new("o", "b"), RepoRef::new("o", "a")]);
    }
}
