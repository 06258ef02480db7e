//! Page renderer: conversion, composition and atomic writes.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use plan_config::Config;

use crate::template::{Template, Tokens};
use crate::{RenderError, converter};

/// `Mon Jan _2 15:04 (MST)` style, as printed by `finger`.
const ON_SINCE_FORMAT: &str = "%a %b %e %H:%M (%Z)";

/// Renders markdown into complete pages for one configuration and template.
#[derive(Clone, Debug)]
pub struct PageRenderer {
    config: Config,
    timezone: Tz,
    template: Template,
    live_reload: bool,
}

impl PageRenderer {
    /// Create a renderer.
    ///
    /// An unknown timezone name falls back to UTC with a warning.
    #[must_use]
    pub fn new(config: Config, template: Template) -> Self {
        let timezone = config.timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(timezone = %config.timezone, "Unknown timezone, using UTC");
            Tz::UTC
        });
        Self {
            config,
            timezone,
            template,
            live_reload: false,
        }
    }

    /// Inject the live-reload script into every composed page.
    #[must_use]
    pub fn with_live_reload(mut self, enabled: bool) -> Self {
        self.live_reload = enabled;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Convert markdown to an HTML fragment.
    pub fn render_fragment(&self, content: &[u8]) -> Result<String, RenderError> {
        converter::render_fragment(content)
    }

    /// Format `time` in the configured timezone for the `{{onSince}}` token.
    #[must_use]
    pub fn format_on_since(&self, time: DateTime<Utc>) -> String {
        time.with_timezone(&self.timezone)
            .format(ON_SINCE_FORMAT)
            .to_string()
    }

    /// Compose a full page around `fragment`.
    pub fn compose(
        &self,
        fragment: &str,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    ) -> Result<String, RenderError> {
        let on_since = self.format_on_since(created);
        let tokens = Tokens {
            username: &self.config.username,
            fullname: &self.config.full_name,
            directory: &self.config.directory,
            shell: &self.config.shell,
            title: &self.config.title,
            on_since: &on_since,
            mod_time_unix: updated.timestamp(),
        };
        self.template.fill(&tokens, fragment, self.live_reload)
    }

    /// Render `content` and write the composed page to `path`.
    ///
    /// Missing parent directories are created. Returns the HTML fragment so
    /// callers can reuse it (e.g., for feed items).
    pub fn render_and_write(
        &self,
        content: &[u8],
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
        path: &Path,
    ) -> Result<String, RenderError> {
        let fragment = self.render_fragment(content)?;
        let page = self.compose(&fragment, created, updated)?;
        write_atomic(path, page.as_bytes()).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(fragment)
    }
}

/// Write `contents` to a temporary file next to `path`, then rename it over
/// `path`. Creates parent directories as needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = temp_builder().tempfile_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn temp_builder() -> tempfile::Builder<'static, 'static> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".plan-");
    // Temp files default to 0600; published pages must be world-readable.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    builder
}
