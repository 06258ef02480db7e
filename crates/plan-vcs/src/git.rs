//! History source backed by the `git` command-line tool.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{DateTime, Utc};

use crate::history::{HistoryMap, HistorySource, Revision, VcsError, parse_log};

/// Reads the history of one file from the git repository containing it.
#[derive(Clone, Debug)]
pub struct GitHistory {
    dir: PathBuf,
    file: String,
}

impl GitHistory {
    /// Create a source for `file`, relative to `dir`.
    ///
    /// Git commands run with `dir` as their working directory.
    pub fn new(dir: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file: file.into(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn git(&self, args: &[&str]) -> Result<Output, VcsError> {
        Ok(Command::new("git")
            .current_dir(&self.dir)
            .args(args)
            .output()?)
    }

    /// A repository exists but `HEAD` does not resolve to a commit yet.
    fn is_unborn(&self) -> bool {
        let succeeds = |args: &[&str]| self.git(args).is_ok_and(|o| o.status.success());
        succeeds(&["rev-parse", "--git-dir"])
            && !succeeds(&["rev-parse", "--verify", "-q", "HEAD"])
    }
}

fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
    if stderr.is_empty() {
        format!("git exited with {}", output.status)
    } else {
        stderr
    }
}

impl HistorySource for GitHistory {
    fn fetch_history(&self) -> Result<HistoryMap, VcsError> {
        let output = self.git(&[
            "log",
            "--date=format:%Y-%m-%d",
            "--format=%H %ad",
            "--",
            &self.file,
        ])?;
        if !output.status.success() {
            if self.is_unborn() {
                tracing::debug!(file = %self.file, "Repository has no commits yet");
                return Ok(HistoryMap::new());
            }
            return Err(VcsError::SourceUnavailable(stderr_message(&output)));
        }

        let history = parse_log(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(days = history.len(), file = %self.file, "Fetched history");
        Ok(history)
    }

    fn fetch_content(&self, revision: &Revision) -> Result<Vec<u8>, VcsError> {
        let spec = format!("{revision}:./{}", self.file);
        let output = self.git(&["show", &spec])?;
        if !output.status.success() {
            tracing::debug!(%revision, error = %stderr_message(&output), "git show failed");
            return Err(VcsError::ContentUnavailable {
                revision: revision.clone(),
            });
        }
        Ok(output.stdout)
    }

    fn first_revision_time(&self) -> Result<Option<DateTime<Utc>>, VcsError> {
        let output = self.git(&["log", "--reverse", "--format=%aI", "--", &self.file])?;
        if !output.status.success() {
            if self.is_unborn() {
                return Ok(None);
            }
            return Err(VcsError::SourceUnavailable(stderr_message(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let first = stdout.lines().next().map(str::trim).unwrap_or_default();
        Ok(DateTime::parse_from_rfc3339(first)
            .ok()
            .map(|t| t.with_timezone(&Utc)))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::process::Command;

    pub(crate) fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    /// Run git in `dir`, pinning author and committer dates when given.
    pub(crate) fn run_git(dir: &Path, args: &[&str], date: Option<&str>) {
        let mut cmd = Command::new("git");
        cmd.current_dir(dir)
            .args(["-c", "user.name=Plan Test", "-c", "user.email=plan@test.invalid"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args);
        if let Some(date) = date {
            cmd.env("GIT_AUTHOR_DATE", date)
                .env("GIT_COMMITTER_DATE", date);
        }
        let status = cmd.output().unwrap();
        assert!(
            status.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&status.stderr)
        );
    }

    pub(crate) fn commit_file(dir: &Path, file: &str, content: &str, date: &str) {
        std::fs::write(dir.join(file), content).unwrap();
        run_git(dir, &["add", file], None);
        run_git(dir, &["commit", "-q", "-m", "edit"], Some(date));
    }
}
