//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod debug;
pub(crate) mod edit;
mod git;
mod preview;

use std::path::Path;

use plan_site::{BuildReport, Project};

pub(crate) use git::GitCommand;
pub(crate) use preview::PreviewArgs;

use crate::error::CliError;
use crate::output::Output;

/// Open the plan named by `--file`.
fn open_project(input: &Path) -> Result<Project, CliError> {
    Ok(Project::open(input)?)
}

/// Print the warnings a build can finish with.
fn report_warnings(output: &Output, report: &BuildReport) {
    if let Some(warning) = &report.history_warning {
        output.warning(&format!("History skipped: {warning}"));
    }
    for date in &report.skipped_dates {
        output.warning(&format!("Skipped {date}: content unavailable or not UTF-8"));
    }
}
