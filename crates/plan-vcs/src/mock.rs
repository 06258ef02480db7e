//! Mock history source for testing.
//!
//! Provides [`MockHistory`] for unit testing without a git repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::date::DateKey;
use crate::history::{HistoryMap, HistorySource, Revision, VcsError};

/// In-memory history for testing.
///
/// Use the builder methods to configure revisions and failures.
///
/// # Example
///
/// ```ignore
/// use plan_vcs::{DateKey, HistorySource, MockHistory};
///
/// let source = MockHistory::new()
///     .with_revision("2024-01-05", "rev1", "# Day one");
///
/// let history = source.fetch_history().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockHistory {
    history: HistoryMap,
    contents: HashMap<Revision, Vec<u8>>,
    log_error: Option<String>,
    first_revision: Option<DateTime<Utc>>,
}

impl MockHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `revision` as the snapshot for `date` with the given content.
    ///
    /// # Panics
    ///
    /// Panics if `date` is not `YYYY-MM-DD`.
    #[must_use]
    pub fn with_revision(
        mut self,
        date: &str,
        revision: &str,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let revision = Revision::new(revision);
        self.history.insert(parse_date(date), revision.clone());
        self.contents.insert(revision, content.into());
        self
    }

    /// Record `revision` for `date` without content, so fetching it fails
    /// with [`VcsError::ContentUnavailable`].
    ///
    /// # Panics
    ///
    /// Panics if `date` is not `YYYY-MM-DD`.
    #[must_use]
    pub fn with_missing_content(mut self, date: &str, revision: &str) -> Self {
        self.history.insert(parse_date(date), Revision::new(revision));
        self
    }

    /// Make the log query fail with [`VcsError::SourceUnavailable`].
    #[must_use]
    pub fn with_log_error(mut self, message: impl Into<String>) -> Self {
        self.log_error = Some(message.into());
        self
    }

    /// Set the first revision time.
    #[must_use]
    pub fn with_first_revision(mut self, time: DateTime<Utc>) -> Self {
        self.first_revision = Some(time);
        self
    }
}

fn parse_date(date: &str) -> DateKey {
    date.parse()
        .unwrap_or_else(|e| panic!("invalid mock date {date:?}: {e}"))
}

impl HistorySource for MockHistory {
    fn fetch_history(&self) -> Result<HistoryMap, VcsError> {
        match &self.log_error {
            Some(message) => Err(VcsError::SourceUnavailable(message.clone())),
            None => Ok(self.history.clone()),
        }
    }

    fn fetch_content(&self, revision: &Revision) -> Result<Vec<u8>, VcsError> {
        self.contents
            .get(revision)
            .cloned()
            .ok_or_else(|| VcsError::ContentUnavailable {
                revision: revision.clone(),
            })
    }

    fn first_revision_time(&self) -> Result<Option<DateTime<Utc>>, VcsError> {
        Ok(self.first_revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_history_round_trip() {
        let source = MockHistory::new()
            .with_revision("2024-01-05", "rev1", "one")
            .with_missing_content("2024-01-06", "rev2");

        let history = source.fetch_history().unwrap();
        assert_eq!(history.len(), 2);

        assert_eq!(source.fetch_content(&Revision::new("rev1")).unwrap(), b"one");
        assert!(matches!(
            source.fetch_content(&Revision::new("rev2")),
            Err(VcsError::ContentUnavailable { .. })
        ));
    }

    #[test]
    fn test_mock_log_error() {
        let source = MockHistory::new().with_log_error("not a git repository");
        assert!(matches!(
            source.fetch_history(),
            Err(VcsError::SourceUnavailable(_))
        ));
    }
}
