//! Git shortcuts: `plan save`, `publish`, `revert` and `rollback`.

use std::path::Path;

use clap::Subcommand;
use plan_config::PlanPaths;
use plan_vcs::{GitRepo, SaveOutcome};

use crate::error::CliError;
use crate::output::Output;

/// Git commands acting on the plan file only.
#[derive(Subcommand)]
pub(crate) enum GitCommand {
    /// Commit the plan file.
    Save,
    /// Commit the plan file and push.
    Publish,
    /// Discard uncommitted changes to the plan file.
    Revert,
    /// Restore the plan file from an earlier commit, commit and push.
    Rollback {
        /// Commit to restore from (default: HEAD~1).
        commit: Option<String>,
    },
}

impl GitCommand {
    pub(crate) fn execute(self, input: &Path) -> Result<(), CliError> {
        let output = Output::new();
        let paths = PlanPaths::resolve(input)?;
        let repo = GitRepo::new(paths.plan_dir.clone(), paths.plan_file.clone());

        match self {
            Self::Save => report_save(&output, repo.save()?),
            Self::Publish => {
                let outcome = repo.publish()?;
                report_save(&output, outcome);
                output.success("Pushed");
            }
            Self::Revert => {
                repo.revert()?;
                output.success(&format!("Reverted {}", paths.plan_file));
            }
            Self::Rollback { commit } => {
                let target = repo.rollback(commit.as_deref())?;
                output.success(&format!("Rolled back {} to {target}", paths.plan_file));
            }
        }
        Ok(())
    }
}

fn report_save(output: &Output, outcome: SaveOutcome) {
    match outcome {
        SaveOutcome::Committed => output.success("Saved"),
        SaveOutcome::Unchanged => output.info("Nothing to save"),
    }
}
