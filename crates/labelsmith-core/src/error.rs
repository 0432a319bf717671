//! Error types for labelsmith-core.

use labelsmith_config::error::ConfigError;
use miette::Diagnostic;
use thiserror::Error;

/// Provider failures, normalized by every [`LabelApi`](crate::LabelApi)
/// backend into this closed set.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("authentication failed")]
    #[diagnostic(
        code(labelsmith::api::unauthorized),
        help("Set GITHUB_TOKEN or GH_TOKEN to a valid token")
    )]
    Unauthorized,

    #[error("access forbidden")]
    #[diagnostic(
        code(labelsmith::api::forbidden),
        help("Check that the token has write access to the repository")
    )]
    Forbidden,

    #[error("{resource} not found")]
    #[diagnostic(code(labelsmith::api::not_found))]
    NotFound { resource: String },

    #[error("API rate limit exceeded")]
    #[diagnostic(
        code(labelsmith::api::rate_limited),
        help("Wait for the rate limit window to reset and try again")
    )]
    RateLimited,

    #[error("{resource} already exists")]
    #[diagnostic(
        code(labelsmith::api::already_exists),
        help("Use --force to update existing labels")
    )]
    AlreadyExists { resource: String },

    #[error("token is missing a required scope")]
    #[diagnostic(
        code(labelsmith::api::insufficient_scope),
        help("Grant the token the 'repo' scope (or 'public_repo' for public repositories)")
    )]
    InsufficientScope,

    #[error("{0}")]
    #[diagnostic(code(labelsmith::api::unclassified))]
    Unclassified(String),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Top-level error type for labelsmith.
#[derive(Error, Diagnostic, Debug)]
pub enum LabelsmithError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),

    #[error("Error while {action}")]
    #[diagnostic(code(labelsmith::io), help("Check file permissions and paths"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON label file: {0}")]
    #[diagnostic(
        code(labelsmith::json),
        help("Expected an array of objects with 'name', 'color' and 'description'")
    )]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse YAML label file: {0}")]
    #[diagnostic(
        code(labelsmith::yaml),
        help("Expected a list of mappings with 'name', 'color' and 'description'")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid repository '{0}'")]
    #[diagnostic(
        code(labelsmith::invalid_repository),
        help("Use the form owner/name (e.g. 'pkgforge/soar')")
    )]
    InvalidRepository(String),

    #[error("Invalid label '{0}'")]
    #[diagnostic(
        code(labelsmith::invalid_label),
        help("Use the form name[:color[:description]] (e.g. 'bug:d73a4a:Something is broken')")
    )]
    InvalidLabel(String),

    #[error("Invalid color '{0}'")]
    #[diagnostic(
        code(labelsmith::invalid_color),
        help("Colors are six hexadecimal digits, optionally prefixed with '#'")
    )]
    InvalidColor(String),

    #[error("Label '{0}' is specified more than once")]
    #[diagnostic(code(labelsmith::duplicate_label))]
    DuplicateLabel(String),

    #[error("Unsupported label file '{0}'")]
    #[diagnostic(
        code(labelsmith::unsupported_label_file),
        help("Label files must end in .json, .yml or .yaml")
    )]
    UnsupportedLabelFile(String),

    #[error("some operations failed")]
    #[diagnostic(code(labelsmith::operations_failed))]
    OperationsFailed,

    #[error("{0}")]
    #[diagnostic(code(labelsmith::error))]
    Custom(String),
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, LabelsmithError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, LabelsmithError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            LabelsmithError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
