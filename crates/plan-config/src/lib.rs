//! Configuration management for the plan publisher.
//!
//! Parses `settings.json` with serde and overlays it onto defaults derived
//! from the process environment (`$USER`, `$HOME`, `$SHELL`). Fields absent
//! from the file keep their default values.
//!
//! [`PlanPaths`] resolves the `-f/--file` argument into the plan directory,
//! the tracked document, and the well-known sibling files.
//!
//! ## Environment Variable Expansion
//!
//! String settings support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;
mod paths;

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use paths::{PlanFileKind, PlanPaths};

/// Settings filename inside the plan directory.
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Default timezone used for the `onSince` token.
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Default site title.
pub const DEFAULT_TITLE: &str = "Plan";

/// Publisher configuration.
///
/// Immutable once loaded; a settings change produces a fresh value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Login name shown in the page header.
    pub username: String,
    /// Display name (`name` in `settings.json`).
    pub full_name: String,
    /// Home directory shown in the page header.
    pub directory: String,
    /// Login shell shown in the page header.
    pub shell: String,
    /// IANA timezone used to format timestamps.
    pub timezone: String,
    /// Site title, also used as the feed channel title.
    pub title: String,
    /// Public base URL prefixed to feed links (no trailing slash).
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Settings as parsed from JSON, before overlaying onto defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsRaw {
    username: Option<String>,
    name: Option<String>,
    directory: Option<String>,
    shell: Option<String>,
    timezone: Option<String>,
    title: Option<String>,
    base_url: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path does not exist.
    #[error("Plan not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error.
    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Settings field (e.g., "`base_url`").
        field: String,
        /// Error message (e.g., "${`PLAN_HOST`} not set").
        message: String,
    },
}

impl Config {
    /// Defaults derived from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_identity(
            std::env::var("USER").unwrap_or_default(),
            std::env::var("HOME").unwrap_or_default(),
            std::env::var("SHELL").ok(),
        )
    }

    /// Defaults for an explicit identity.
    ///
    /// The display name falls back to the username; the shell to `/bin/bash`.
    #[must_use]
    pub fn with_identity(username: String, directory: String, shell: Option<String>) -> Self {
        Self {
            full_name: username.clone(),
            username,
            directory,
            shell: shell
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "/bin/bash".to_owned()),
            timezone: DEFAULT_TIMEZONE.to_owned(),
            title: DEFAULT_TITLE.to_owned(),
            base_url: String::new(),
        }
    }

    /// Load settings from `path`, overlaid onto environment defaults.
    ///
    /// A missing file is not an error: the defaults are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, references
    /// an unset environment variable, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_defaults(path, Self::from_env())
    }

    /// Load settings from `path` on top of the given defaults.
    pub fn load_with_defaults(path: &Path, defaults: Self) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(defaults),
            Err(e) => return Err(e.into()),
        };
        Self::parse_with_defaults(&content, defaults)
    }

    /// Parse settings JSON on top of the given defaults.
    pub fn parse_with_defaults(json: &str, defaults: Self) -> Result<Self, ConfigError> {
        let raw: SettingsRaw = serde_json::from_str(json)?;
        let mut config = defaults;
        config.apply(raw);
        config.expand_env_vars()?;
        config.base_url = config.base_url.trim_end_matches('/').to_owned();
        config.validate()?;
        Ok(config)
    }

    /// Overlay the fields present in the settings file.
    fn apply(&mut self, raw: SettingsRaw) {
        let SettingsRaw {
            username,
            name,
            directory,
            shell,
            timezone,
            title,
            base_url,
        } = raw;

        let overlay = |target: &mut String, value: Option<String>| {
            if let Some(value) = value {
                *target = value;
            }
        };
        overlay(&mut self.username, username);
        overlay(&mut self.full_name, name);
        overlay(&mut self.directory, directory);
        overlay(&mut self.shell, shell);
        overlay(&mut self.timezone, timezone);
        overlay(&mut self.title, title);
        overlay(&mut self.base_url, base_url);
    }

    /// Expand environment variable references in every string setting.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.username = expand::expand_env(&self.username, "username")?;
        self.full_name = expand::expand_env(&self.full_name, "name")?;
        self.directory = expand::expand_env(&self.directory, "directory")?;
        self.shell = expand::expand_env(&self.shell, "shell")?;
        self.timezone = expand::expand_env(&self.timezone, "timezone")?;
        self.title = expand::expand_env(&self.title, "title")?;
        self.base_url = expand::expand_env(&self.base_url, "base_url")?;
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.title, "title")?;
        require_non_empty(&self.timezone, "timezone")?;
        if !self.base_url.is_empty() {
            require_http_url(&self.base_url, "base_url")?;
        }
        Ok(())
    }
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}
