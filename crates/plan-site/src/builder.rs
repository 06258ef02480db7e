//! Build orchestration.
//!
//! Renders the current document as the site root, rebuilds history, and
//! writes the aggregate feed. Only the root page and the feed are fatal;
//! a failed history build is logged and contributes zero feed items.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use plan_config::PlanPaths;
use plan_renderer::{PageRenderer, RenderError, write_atomic};
use plan_vcs::{DateKey, HistorySource};

use crate::feed::{Channel, FEED_FILENAME, Feed, FeedError, FeedItem};
use crate::history::HistoryBuilder;

/// Build error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The plan document could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The site root page could not be rendered or written.
    #[error("Failed to build current page: {0}")]
    CurrentPage(#[source] RenderError),
    /// The feed could not be serialized.
    #[error("Failed to serialize feed: {0}")]
    Feed(#[from] FeedError),
    /// The feed could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    WriteFeed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Summary of one build.
#[derive(Debug)]
pub struct BuildReport {
    /// Pages written, including the root page and synthetic indexes.
    pub pages_written: usize,
    /// Historical day pages written.
    pub history_days: usize,
    /// Days skipped because their content was unavailable or unconvertible.
    pub skipped_dates: Vec<DateKey>,
    /// Items in the feed.
    pub feed_items: usize,
    /// Why the history build failed, if it did.
    pub history_warning: Option<String>,
    pub elapsed: Duration,
}

/// One-shot site build for a plan.
pub struct SiteBuilder<'a> {
    paths: &'a PlanPaths,
    renderer: &'a PageRenderer,
    source: &'a dyn HistorySource,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(
        paths: &'a PlanPaths,
        renderer: &'a PageRenderer,
        source: &'a dyn HistorySource,
    ) -> Self {
        Self {
            paths,
            renderer,
            source,
        }
    }

    /// Build the site, stamping synthetic index pages with the current time.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        self.build_at(Utc::now())
    }

    /// Build the site, stamping synthetic index pages with `now`.
    pub fn build_at(&self, now: DateTime<Utc>) -> Result<BuildReport, BuildError> {
        let started = Instant::now();
        let plan_path = self.paths.plan_path();
        let read_error = |source| BuildError::ReadDocument {
            path: plan_path.clone(),
            source,
        };

        let content = std::fs::read(&plan_path).map_err(read_error)?;
        let modified: DateTime<Utc> = std::fs::metadata(&plan_path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .map_err(read_error)?;
        let created = self.creation_time(modified);

        let root_page = self.paths.output_dir.join("index.html");
        let fragment = self
            .renderer
            .render_and_write(&content, created, modified, &root_page)
            .map_err(BuildError::CurrentPage)?;
        tracing::info!(path = %root_page.display(), "Wrote current page");

        let config = self.renderer.config();
        let mut items = vec![FeedItem::new(
            config.title.clone(),
            format!("{}/", config.base_url),
            &fragment,
            modified,
        )];

        let mut report = BuildReport {
            pages_written: 1,
            history_days: 0,
            skipped_dates: Vec::new(),
            feed_items: 0,
            history_warning: None,
            elapsed: Duration::ZERO,
        };

        match HistoryBuilder::new(self.renderer, self.source, &self.paths.output_dir).build(now) {
            Ok(history) => {
                report.history_days = history.items.len();
                report.pages_written += history.items.len() + history.index_pages;
                report.skipped_dates = history.skipped;
                items.extend(history.items);
            }
            Err(e) => {
                tracing::warn!(error = %e, "History build failed, continuing without history");
                report.history_warning = Some(e.to_string());
            }
        }

        report.feed_items = items.len();
        let feed = Feed {
            channel: Channel::from_config(config),
            items,
        };
        let feed_path = self.paths.output_dir.join(FEED_FILENAME);
        write_atomic(&feed_path, &feed.to_xml()?).map_err(|source| BuildError::WriteFeed {
            path: feed_path.clone(),
            source,
        })?;

        report.elapsed = started.elapsed();
        tracing::info!(
            pages = report.pages_written,
            feed_items = report.feed_items,
            elapsed_ms = report.elapsed.as_millis(),
            "Build complete"
        );
        Ok(report)
    }

    /// First revision time, falling back to the document's mtime.
    fn creation_time(&self, modified: DateTime<Utc>) -> DateTime<Utc> {
        match self.source.first_revision_time() {
            Ok(Some(time)) => time,
            Ok(None) => modified,
            Err(e) => {
                tracing::debug!(error = %e, "No first revision, using modification time");
                modified
            }
        }
    }
}
