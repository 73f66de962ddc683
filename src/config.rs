use std::env;
use std::path::PathBuf;

pub const WORKSPACE_VAR: &str = "SLIDE_EDITOR_WORKSPACE";
pub const LOG_FILE_VAR: &str = "SLIDE_EDITOR_LOG_FILE";
pub const LOG_LEVEL_VAR: &str = "SLIDE_EDITOR_LOG_LEVEL";
pub const CACHE_VAR: &str = "SLIDE_EDITOR_CACHE";

/// Runtime configuration for the slide editor server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding `<presentation_id>.json` snapshots
    pub workspace: PathBuf,
    pub log_file: Option<PathBuf>,
    pub log_level: log::LevelFilter,
    pub cache_snapshots: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            log_file: None,
            log_level: log::LevelFilter::Info,
            cache_snapshots: true,
        }
    }
}

/// Parse a boolean-like flag value.
///
/// Truthy: `1`, `true`, `yes`, `on`. Falsy: `0`, `false`, `no`, `off`, empty.
/// Case-insensitive; surrounding whitespace is ignored.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup; unset or
    /// unparsable values fall back to the defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            workspace: non_empty(WORKSPACE_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace),
            log_file: non_empty(LOG_FILE_VAR).map(PathBuf::from),
            log_level: non_empty(LOG_LEVEL_VAR)
                .and_then(|level| level.trim().parse().ok())
                .unwrap_or(defaults.log_level),
            cache_snapshots: lookup(CACHE_VAR)
                .and_then(|value| parse_env_flag(&value))
                .unwrap_or(defaults.cache_snapshots),
        }
    }
}
