//! `plan edit` command implementation.

use std::path::Path;
use std::process::Command;

use plan_config::PlanPaths;

use crate::error::CliError;

/// Execute the edit command.
pub(crate) fn execute(input: &Path) -> Result<(), CliError> {
    let paths = PlanPaths::resolve(input)?;
    let editor = resolve_editor(std::env::var("EDITOR").ok(), std::env::var("VISUAL").ok());
    let plan = paths.plan_path();
    tracing::info!(editor = %editor, path = %plan.display(), "Launching editor");

    let status = editor_command(&editor, &plan).status()?;
    if !status.success() {
        return Err(CliError::Editor { editor, status });
    }
    Ok(())
}

/// `$EDITOR`, then `$VISUAL`, then a platform default.
fn resolve_editor(editor: Option<String>, visual: Option<String>) -> String {
    editor
        .filter(|e| !e.trim().is_empty())
        .or_else(|| visual.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| default_editor().to_owned())
}

fn default_editor() -> &'static str {
    if cfg!(target_os = "macos") {
        "open -t"
    } else if cfg!(target_os = "windows") {
        "notepad"
    } else {
        "vi"
    }
}

/// Editor strings may carry arguments (`code --wait`), so Unix runs them
/// through the shell with the path passed as `$1`.
fn editor_command(editor: &str, path: &Path) -> Command {
    if cfg!(unix) {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(format!("{editor} \"$1\""))
            .arg("sh")
            .arg(path);
        command
    } else {
        let mut parts = editor.split_whitespace();
        let mut command = Command::new(parts.next().unwrap_or(editor));
        command.args(parts).arg(path);
        command
    }
}
