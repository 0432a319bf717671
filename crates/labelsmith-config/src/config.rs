use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{
    error::{ConfigError, Result},
    utils::{token_from_env, xdg_config_home},
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_PARALLEL_LIMIT: usize = 5;
pub const DEFAULT_USER_AGENT: &str = "labelsmith";

/// Which API flavour talks to the remote platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Rest,
    Graphql,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "graphql" | "gql" => Ok(Self::Graphql),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "rest"),
            Self::Graphql => write!(f, "graphql"),
        }
    }
}

/// Application's configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// API backend: "rest" or "graphql".
    /// Default: rest
    pub backend: Option<Backend>,

    /// Base URL of the REST API.
    /// Default: https://api.github.com
    pub api_url: Option<String>,

    /// GraphQL endpoint.
    /// Default: https://api.github.com/graphql
    pub graphql_url: Option<String>,

    /// API token. GITHUB_TOKEN or GH_TOKEN take precedence when set.
    pub token: Option<String>,

    /// Maximum number of repositories processed concurrently.
    /// Default: 5
    pub parallel_limit: Option<usize>,

    /// User agent sent with every request.
    /// Default: labelsmith
    pub user_agent: Option<String>,

    /// Request timeout in seconds. Unset means no timeout.
    pub timeout: Option<u64>,
}

/// Location of the configuration file: `$LABELSMITH_CONFIG`, or
/// `$XDG_CONFIG_HOME/labelsmith/config.toml`.
pub fn config_path() -> PathBuf {
    match std::env::var("LABELSMITH_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => xdg_config_home().join("labelsmith").join("config.toml"),
    }
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            backend: Some(Backend::Rest),
            api_url: Some(DEFAULT_API_URL.to_string()),
            graphql_url: Some(DEFAULT_GRAPHQL_URL.to_string()),
            token: None,
            parallel_limit: Some(DEFAULT_PARALLEL_LIMIT),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            timeout: None,
        }
    }

    /// Loads the configuration from [`config_path`].
    pub fn new() -> Result<Self> {
        Self::load(&config_path())
    }

    /// Loads the configuration from `path`. A missing file yields the
    /// default configuration. Environment tokens override the file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using defaults");
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        if let Some(token) = token_from_env() {
            config.token = Some(token);
        }

        config.resolve()?;
        Ok(config)
    }

    /// Fills unset fields with defaults and validates the result.
    pub fn resolve(&mut self) -> Result<()> {
        self.backend.get_or_insert(Backend::Rest);
        self.user_agent
            .get_or_insert_with(|| DEFAULT_USER_AGENT.to_string());

        let parallel_limit = *self.parallel_limit.get_or_insert(DEFAULT_PARALLEL_LIMIT);
        if parallel_limit == 0 {
            return Err(ConfigError::InvalidParallelLimit(parallel_limit));
        }

        let api_url = self
            .api_url
            .get_or_insert_with(|| DEFAULT_API_URL.to_string());
        validate_url("api", api_url)?;
        *api_url = api_url.trim_end_matches('/').to_string();

        let graphql_url = self
            .graphql_url
            .get_or_insert_with(|| DEFAULT_GRAPHQL_URL.to_string());
        validate_url("graphql", graphql_url)?;

        if self
            .token
            .as_deref()
            .is_some_and(|token| token.trim().is_empty())
        {
            self.token = None;
        }

        Ok(())
    }

    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or_default()
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn graphql_url(&self) -> &str {
        self.graphql_url.as_deref().unwrap_or(DEFAULT_GRAPHQL_URL)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn parallel_limit(&self) -> usize {
        self.parallel_limit.unwrap_or(DEFAULT_PARALLEL_LIMIT)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Serializes the configuration with the token masked.
    pub fn to_redacted_string(&self) -> Result<String> {
        let mut redacted = self.clone();
        if redacted.token.is_some() {
            redacted.token = Some("********".to_string());
        }
        Ok(toml::to_string_pretty(&redacted)?)
    }
}

fn validate_url(field: &'static str, value: &str) -> Result<()> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => {
            Err(ConfigError::InvalidUrl {
                field,
                url: value.to_string(),
            })
        }
    }
}

/// Writes the default configuration to `path`, refusing to overwrite an
/// existing file.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let content = toml::to_string_pretty(&Config::default_config())?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)?;
    info!("Default configuration file generated at: {}", path.display());
    Ok(())
}
