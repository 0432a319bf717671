use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::LabelsmithError;

/// A repository on the remote platform, identified by owner and name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoRef {
    owner: String,
    name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical `owner/name` form, used as the map key everywhere.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = LabelsmithError;

    /// Parses `owner/name`, also accepting `https://github.com/owner/name`
    /// and a trailing `.git`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let path = input
            .strip_prefix("https://")
            .or_else(|| input.strip_prefix("http://"))
            .map(|rest| rest.split_once('/').map_or("", |(_, path)| path))
            .unwrap_or(input);
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        match path.split_once('/') {
            Some((owner, name))
                if !owner.is_empty()
                    && !name.is_empty()
                    && !name.contains('/')
                    && !owner.contains(char::is_whitespace)
                    && !name.contains(char::is_whitespace) =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(LabelsmithError::InvalidRepository(s.to_string())),
        }
    }
}

/// A label definition. Labels are identified by name alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn same_as(&self, other: &Label) -> bool {
        self.name == other.name
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelableKind {
    Issue,
    PullRequest,
    Discussion,
}

impl fmt::Display for LabelableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => write!(f, "issue"),
            Self::PullRequest => write!(f, "pull request"),
            Self::Discussion => write!(f, "discussion"),
        }
    }
}

/// An issue, pull request or discussion that can carry labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labelable {
    pub id: String,
    pub kind: LabelableKind,
    pub number: u64,
    pub title: String,
}

impl fmt::Display for Labelable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} ({})", self.kind, self.number, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref_parse() {
        let repo: RepoRef = "pkgforge/soar".parse().unwrap();
        assert_eq!(repo.owner(), "pkgforge");
        assert_eq!(repo.name(), "soar");
        assert_eq!(repo.full_name(), "pkgforge/soar");
        assert_eq!(repo.to_string(), "pkgforge/soar");
    }

    #[test]
    fn test_repo_ref_parse_url() {
        let repo: RepoRef = "https://github.com/pkgforge/soar.git".parse().unwrap();
        assert_eq!(repo, RepoRef::new("pkgforge", "soar"));

        let repo: RepoRef = "https://github.com/pkgforge/soar/".parse().unwrap();
        assert_eq!(repo, RepoRef::new("pkgforge", "soar"));
    }

    #[test]
    fn test_repo_ref_parse_invalid() {
        for input in ["", "soar", "/soar", "pkgforge/", "a/b/c", "a b/c"] {
            assert!(
                matches!(
                    input.parse::<RepoRef>(),
                    Err(LabelsmithError::InvalidRepository(_))
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_label_same_as_compares_names_only() {
        let a = Label::new("bug", "ff0000");
        let b = Label::new("bug", "00ff00").with_description("different");
        let c = Label::new("feature", "ff0000");

        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn test_label_serialization_skips_missing_description() {
        let json = serde_json::to_string(&Label::new("bug", "ff0000")).unwrap();
        assert_eq!(json, r#"{"name":"bug","color":"ff0000"}"#);
    }

    #[test]
    fn test_labelable_display() {
        let item = Labelable {
            id: "PR_kw".into(),
            kind: LabelableKind::PullRequest,
            number: 42,
            title: "Fix parser".into(),
        };
        assert_eq!(item.to_string(), "pull request #42 (Fix parser)");
    }
}
