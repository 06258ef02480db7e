//! Side-effecting git commands on the plan file.
//!
//! These run with inherited stdio so git's own progress and prompts reach the
//! terminal.

use std::path::PathBuf;
use std::process::Command;

use crate::history::VcsError;

/// Commit message used by [`GitRepo::save`].
pub const SAVE_MESSAGE: &str = "Update plan";

/// Default rollback target.
pub const PREVIOUS_REVISION: &str = "HEAD~1";

/// Result of [`GitRepo::save`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new commit was created.
    Committed,
    /// `git commit` declined (usually nothing to commit).
    Unchanged,
}

/// The repository holding the plan file.
#[derive(Clone, Debug)]
pub struct GitRepo {
    dir: PathBuf,
    file: String,
}

impl GitRepo {
    pub fn new(dir: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file: file.into(),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.dir).args(args);
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<(), VcsError> {
        let status = self.command(args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(VcsError::CommandFailed {
                command: args.join(" "),
                status,
            })
        }
    }

    /// Stage and commit the plan file.
    ///
    /// A failing commit is reported as [`SaveOutcome::Unchanged`] rather than
    /// an error.
    pub fn save(&self) -> Result<SaveOutcome, VcsError> {
        self.run(&["add", &self.file])?;
        let status = self.command(&["commit", "-m", SAVE_MESSAGE]).status()?;
        if status.success() {
            Ok(SaveOutcome::Committed)
        } else {
            Ok(SaveOutcome::Unchanged)
        }
    }

    /// Push the current branch to its upstream.
    pub fn push(&self) -> Result<(), VcsError> {
        self.run(&["push"])
    }

    /// Save then push.
    pub fn publish(&self) -> Result<SaveOutcome, VcsError> {
        let outcome = self.save()?;
        self.push()?;
        Ok(outcome)
    }

    /// Discard uncommitted changes to the plan file.
    pub fn revert(&self) -> Result<(), VcsError> {
        self.run(&["checkout", &self.file])
    }

    /// Restore the plan file from `target` (default `HEAD~1`), commit and push.
    ///
    /// Returns the target that was restored.
    pub fn rollback(&self, target: Option<&str>) -> Result<String, VcsError> {
        let target = target
            .filter(|t| !t.is_empty())
            .unwrap_or(PREVIOUS_REVISION)
            .to_owned();
        self.run(&["checkout", &target, "--", &self.file])?;
        let message = format!("Rollback {} to {target}", self.file);
        self.run(&["commit", "-m", &message])?;
        self.push()?;
        Ok(target)
    }

    /// Short status line for the plan file; empty when clean.
    pub fn status_short(&self) -> Result<String, VcsError> {
        let output = self.command(&["status", "-s", "--", &self.file]).output()?;
        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                command: "status -s".to_owned(),
                status: output.status,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    /// `<hash> - <subject> (<author>)` of the last commit touching the plan.
    ///
    /// Returns `None` outside a repository or when the file has no commits.
    pub fn last_commit_summary(&self) -> Result<Option<String>, VcsError> {
        let output = self
            .command(&["log", "-1", "--format=%h - %s (%an)", "--", &self.file])
            .output()?;
        if !output.status.success() {
            return Ok(None);
        }
        let summary = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        Ok((!summary.is_empty()).then_some(summary))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::git::test_support::{commit_file, git_available, run_git};

    fn init_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init", "-q"], None);
        run_git(dir.path(), &["config", "user.name", "Plan Test"], None);
        run_git(dir.path(), &["config", "user.email", "plan@test.invalid"], None);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"], None);
        dir
    }

    #[test]
    fn test_save_commits_then_reports_unchanged() {
        if !git_available() {
            return;
        }
        let dir = init_repo();
        std::fs::write(dir.path().join("plan.md"), "# Plan").unwrap();
        let repo = GitRepo::new(dir.path(), "plan.md");

        assert_eq!(repo.save().unwrap(), SaveOutcome::Committed);
        assert_eq!(repo.save().unwrap(), SaveOutcome::Unchanged);

        let summary = repo.last_commit_summary().unwrap().unwrap();
        assert!(summary.contains("Update plan"));
        assert!(summary.contains("Plan Test"));
    }

    #[test]
    fn test_revert_discards_changes() {
        if !git_available() {
            return;
        }
        let dir = init_repo();
        commit_file(dir.path(), "plan.md", "committed", "2024-01-01T00:00:00Z");
        std::fs::write(dir.path().join("plan.md"), "scratch").unwrap();
        let repo = GitRepo::new(dir.path(), "plan.md");

        assert!(repo.status_short().unwrap().contains("plan.md"));
        repo.revert().unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("plan.md")).unwrap(),
            "committed"
        );
        assert_eq!(repo.status_short().unwrap(), "");
    }

    #[test]
    fn test_last_commit_summary_without_commits() {
        if !git_available() {
            return;
        }
        let dir = init_repo();
        let repo = GitRepo::new(dir.path(), "plan.md");
        assert_eq!(repo.last_commit_summary().unwrap(), None);
    }
}
