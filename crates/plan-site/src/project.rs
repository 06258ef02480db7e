//! A plan together with everything needed to build it.

use std::path::Path;
use std::sync::Arc;

use plan_config::{Config, ConfigError, PlanFileKind, PlanPaths};
use plan_renderer::{PageRenderer, Template};
use plan_vcs::{GitHistory, HistorySource};

use crate::builder::{BuildError, BuildReport, SiteBuilder};

/// Resolved paths, loaded settings and template, and a history source.
///
/// The renderer is replaced wholesale when settings or the template change,
/// never mutated in place.
pub struct Project {
    paths: PlanPaths,
    renderer: PageRenderer,
    source: Arc<dyn HistorySource>,
    live_reload: bool,
}

impl Project {
    /// Open the plan named by `input` (a plan file or its directory), reading
    /// history from git.
    ///
    /// Unreadable settings or template fall back to defaults with a warning.
    pub fn open(input: &Path) -> Result<Self, ConfigError> {
        let paths = PlanPaths::resolve(input)?;
        let source = Arc::new(GitHistory::new(
            paths.plan_dir.clone(),
            paths.plan_file.clone(),
        ));
        Ok(Self::with_source(paths, source))
    }

    /// Open a plan with an explicit history source.
    pub fn with_source(paths: PlanPaths, source: Arc<dyn HistorySource>) -> Self {
        let renderer = PageRenderer::new(load_config(&paths), load_template(&paths));
        Self {
            paths,
            renderer,
            source,
            live_reload: false,
        }
    }

    /// Inject the live-reload script into every page built from now on.
    #[must_use]
    pub fn with_live_reload(mut self, enabled: bool) -> Self {
        self.live_reload = enabled;
        self.renderer = self.renderer.with_live_reload(enabled);
        self
    }

    #[must_use]
    pub fn paths(&self) -> &PlanPaths {
        &self.paths
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        self.renderer.config()
    }

    #[must_use]
    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    #[must_use]
    pub fn source(&self) -> &dyn HistorySource {
        self.source.as_ref()
    }

    /// Reload settings and/or template after the given files changed.
    ///
    /// Returns `true` if a new renderer was constructed.
    pub fn apply_changes(&mut self, changed: &[PlanFileKind]) -> bool {
        let settings = changed.contains(&PlanFileKind::Settings);
        let template = changed.contains(&PlanFileKind::Template);
        if !settings && !template {
            return false;
        }

        let config = if settings {
            tracing::info!("Reloading settings");
            load_config(&self.paths)
        } else {
            self.renderer.config().clone()
        };
        let template = if template {
            tracing::info!("Reloading template");
            load_template(&self.paths)
        } else {
            self.renderer.template().clone()
        };

        self.renderer = PageRenderer::new(config, template).with_live_reload(self.live_reload);
        true
    }

    /// Build the site into the output directory.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        SiteBuilder::new(&self.paths, &self.renderer, self.source.as_ref()).build()
    }
}

fn load_config(paths: &PlanPaths) -> Config {
    Config::load(&paths.settings_path()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load settings, using defaults");
        Config::default()
    })
}

fn load_template(paths: &PlanPaths) -> Template {
    match paths.load_template() {
        Ok(template) => Template::from_custom(template),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read template, using built-in template");
            Template::embedded()
        }
    }
}
