use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(labelsmith_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(labelsmith_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(labelsmith_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid parallel limit: {0}")]
    #[diagnostic(
        code(labelsmith_config::invalid_parallel_limit),
        help("parallel_limit must be at least 1")
    )]
    InvalidParallelLimit(usize),

    #[error("Invalid {field} URL: {url}")]
    #[diagnostic(
        code(labelsmith_config::invalid_url),
        help("Provide an absolute http(s) URL")
    )]
    InvalidUrl { field: &'static str, url: String },

    #[error("Unknown backend: {0}")]
    #[diagnostic(
        code(labelsmith_config::unknown_backend),
        help("Supported backends are 'rest' and 'graphql'")
    )]
    UnknownBackend(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(labelsmith_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
