//! `plan debug` command implementation.

use std::path::Path;

use chrono::{DateTime, Utc};
use plan_site::Project;
use plan_vcs::GitRepo;

use super::open_project;
use crate::error::CliError;
use crate::output::Output;

/// Execute the debug command.
pub(crate) fn execute(input: &Path, version: &str) -> Result<(), CliError> {
    let output = Output::new();
    let project = open_project(input)?;
    let paths = project.paths();

    output.highlight("Environment");
    output.field("version", version);
    output.field(
        "platform",
        &format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
    );
    let cwd = std::env::current_dir()?;
    output.field("working dir", &cwd.display().to_string());

    output.highlight("Paths");
    output.field("plan", &paths.plan_path().display().to_string());
    output.field("output", &paths.output_dir.display().to_string());
    output.field("settings file", &presence(&paths.settings_path()));
    output.field("template file", &presence(&paths.template_path()));

    output.highlight("Configuration");
    let config = project.config();
    output.field("username", &config.username);
    output.field("name", &config.full_name);
    output.field("directory", &config.directory);
    output.field("shell", &config.shell);
    output.field("timezone", &project.renderer().timezone().to_string());
    output.field("title", &config.title);
    output.field("base url", &config.base_url);
    let template = if project.renderer().template().is_custom() {
        "custom"
    } else {
        "built-in"
    };
    output.field("template", template);
    match creation_time(&project) {
        Some(created) => output.field("on since", &project.renderer().format_on_since(created)),
        None => output.field("on since", "unknown"),
    }

    output.highlight("Git");
    let repo = GitRepo::new(paths.plan_dir.clone(), paths.plan_file.clone());
    match repo.status_short() {
        Ok(status) if status.is_empty() => output.field("status", "clean"),
        Ok(status) => output.field("status", &status),
        Err(e) => output.warning(&format!("git status failed: {e}")),
    }
    match repo.last_commit_summary() {
        Ok(Some(summary)) => output.field("last commit", &summary),
        Ok(None) => output.field("last commit", "none"),
        Err(e) => output.warning(&format!("git log failed: {e}")),
    }
    Ok(())
}

fn presence(path: &Path) -> String {
    let state = if path.is_file() { "found" } else { "missing" };
    format!("{} ({state})", path.display())
}

/// First revision time, or the plan's modification time.
fn creation_time(project: &Project) -> Option<DateTime<Utc>> {
    if let Ok(Some(time)) = project.source().first_revision_time() {
        return Some(time);
    }
    let modified = std::fs::metadata(project.paths().plan_path())
        .and_then(|m| m.modified())
        .ok()?;
    Some(modified.into())
}
