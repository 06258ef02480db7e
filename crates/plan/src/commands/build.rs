//! `plan build` command implementation.

use std::path::Path;

use super::{open_project, report_warnings};
use crate::error::CliError;
use crate::output::Output;

/// Execute the build command.
pub(crate) fn execute(input: &Path) -> Result<(), CliError> {
    let output = Output::new();
    let project = open_project(input)?;

    output.info(&format!("Plan: {}", project.paths().plan_path().display()));
    output.info(&format!("Output: {}", project.paths().output_dir.display()));

    let report = project.build()?;
    report_warnings(&output, &report);

    output.success(&format!(
        "Built {} pages ({} history days, {} feed items) in {} ms",
        report.pages_written,
        report.history_days,
        report.feed_items,
        report.elapsed.as_millis()
    ));
    Ok(())
}
