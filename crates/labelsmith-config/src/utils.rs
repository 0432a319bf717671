use std::{env, path::PathBuf};

/// Returns the user's home directory, falling back to the current directory
/// when `HOME` is not set.
pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns `$XDG_CONFIG_HOME`, or `$HOME/.config` when unset.
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Environment variables consulted for the API token, in priority order.
pub const TOKEN_ENV: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Reads the first non-empty token from [`TOKEN_ENV`].
pub fn token_from_env() -> Option<String> {
    TOKEN_ENV
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
}
