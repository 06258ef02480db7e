//! History source trait and error types.
//!
//! Provides the core [`HistorySource`] trait for retrieving the dated edit
//! history of the tracked file, along with [`VcsError`].
//!
//! # First-seen-wins
//!
//! A version-control log lists revisions newest first. When several revisions
//! fall on the same calendar day, the first one scanned (the newest) is that
//! day's snapshot; older ones are ignored.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::date::DateKey;

/// Opaque revision identifier (a commit hash for git).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One revision per calendar day, the latest recorded on that day.
pub type HistoryMap = BTreeMap<DateKey, Revision>;

/// Version-control error.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// The log query itself failed (e.g., not a repository).
    #[error("History unavailable: {0}")]
    SourceUnavailable(String),
    /// A revision no longer resolves to the tracked file.
    #[error("Content unavailable at revision {revision}")]
    ContentUnavailable {
        /// The revision that could not be read.
        revision: Revision,
    },
    /// The version-control tool could not be started.
    #[error("Failed to run git: {0}")]
    Command(#[from] std::io::Error),
    /// A side-effecting git command exited unsuccessfully.
    #[error("`git {command}` failed ({status})")]
    CommandFailed {
        /// Subcommand and arguments.
        command: String,
        /// Exit status reported by git.
        status: std::process::ExitStatus,
    },
}

/// Dated history of the tracked file.
///
/// Implementations must be thread-safe (`Send + Sync`) so a project can be
/// moved into blocking rebuild tasks.
pub trait HistorySource: Send + Sync {
    /// Date-to-revision map for the tracked file.
    ///
    /// Returns an empty map when the file has no history.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::SourceUnavailable`] if the log query fails.
    fn fetch_history(&self) -> Result<HistoryMap, VcsError>;

    /// Full content of the tracked file as of `revision`.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::ContentUnavailable`] if the revision does not
    /// contain the file.
    fn fetch_content(&self, revision: &Revision) -> Result<Vec<u8>, VcsError>;

    /// Author time of the first revision touching the tracked file.
    ///
    /// Sources without that information return `Ok(None)`.
    fn first_revision_time(&self) -> Result<Option<DateTime<Utc>>, VcsError> {
        Ok(None)
    }
}

/// Parse `<revision> <YYYY-MM-DD>` log lines, newest first.
///
/// Applies first-seen-wins per date. Lines that do not split into a revision
/// and a valid date are skipped.
#[must_use]
pub fn parse_log(output: &str) -> HistoryMap {
    let mut history = HistoryMap::new();
    for line in output.lines() {
        let Some((revision, date)) = line.trim().split_once(' ') else {
            continue;
        };
        let Ok(date) = date.trim().parse::<DateKey>() else {
            tracing::debug!(line, "Skipping malformed log line");
            continue;
        };
        history
            .entry(date)
            .or_insert_with(|| Revision::new(revision));
    }
    history
}
