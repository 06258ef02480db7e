//! Plan location resolution.
//!
//! The CLI accepts either the plan file itself or the directory holding it.
//! Everything else (settings, template, output tree) lives next to the plan.

use std::path::{Path, PathBuf};

use crate::{ConfigError, SETTINGS_FILENAME};

/// Plan filename used when the input path is a directory.
pub const DEFAULT_PLAN_FILE: &str = "plan.md";

/// Custom template filename inside the plan directory.
pub const TEMPLATE_FILENAME: &str = "template.html";

/// Output directory name inside the plan directory.
pub const OUTPUT_DIRNAME: &str = "public";

/// The role a file in the plan directory plays in a build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlanFileKind {
    /// The tracked markdown document.
    Document,
    /// The custom page template.
    Template,
    /// The `settings.json` file.
    Settings,
}

/// Resolved locations for one plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanPaths {
    /// Absolute directory containing the plan.
    pub plan_dir: PathBuf,
    /// Plan file name, relative to `plan_dir`.
    pub plan_file: String,
    /// Root of the generated site.
    pub output_dir: PathBuf,
}

impl PlanPaths {
    /// Resolve an input path that names either a plan file or its directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the path does not exist.
    pub fn resolve(input: &Path) -> Result<Self, ConfigError> {
        let metadata = std::fs::metadata(input).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(input.to_path_buf()),
            _ => ConfigError::Io(e),
        })?;

        let (dir, file) = if metadata.is_dir() {
            (input.to_path_buf(), DEFAULT_PLAN_FILE.to_owned())
        } else {
            let file = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    ConfigError::Validation(format!("not a plan file: {}", input.display()))
                })?;
            let dir = match input.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            (dir, file)
        };

        // Watcher events carry the resolved path, so symlinks must be resolved too.
        Ok(Self::new(dir.canonicalize()?, file))
    }

    /// Build paths for an already-canonical plan directory.
    #[must_use]
    pub fn new(plan_dir: PathBuf, plan_file: impl Into<String>) -> Self {
        let output_dir = plan_dir.join(OUTPUT_DIRNAME);
        Self {
            plan_dir,
            plan_file: plan_file.into(),
            output_dir,
        }
    }

    /// Full path to the tracked document.
    #[must_use]
    pub fn plan_path(&self) -> PathBuf {
        self.plan_dir.join(&self.plan_file)
    }

    /// Full path to `settings.json`.
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.plan_dir.join(SETTINGS_FILENAME)
    }

    /// Full path to the custom template.
    #[must_use]
    pub fn template_path(&self) -> PathBuf {
        self.plan_dir.join(TEMPLATE_FILENAME)
    }

    /// Read the custom template, if one exists.
    pub fn load_template(&self) -> Result<Option<String>, ConfigError> {
        match std::fs::read_to_string(self.template_path()) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Classify a path reported by the file watcher.
    ///
    /// Only direct children of the plan directory are recognized.
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<PlanFileKind> {
        let name = path.file_name()?.to_str()?;
        if let Some(parent) = path.parent()
            && parent != self.plan_dir
        {
            return None;
        }

        if name == self.plan_file {
            Some(PlanFileKind::Document)
        } else if name == TEMPLATE_FILENAME {
            Some(PlanFileKind::Template)
        } else if name == SETTINGS_FILENAME {
            Some(PlanFileKind::Settings)
        } else {
            None
        }
    }
}
