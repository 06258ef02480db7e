//! Historical page reconstruction.
//!
//! Renders one page per day in the history map, newest first, then one
//! synthetic index page per year and per month.
//!
//! # Failure semantics
//!
//! - A day whose content cannot be fetched or converted is skipped with a
//!   warning.
//! - Any page or index write failure aborts the rest of the history build.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use plan_renderer::{PageRenderer, RenderError};
use plan_vcs::{DateKey, HistorySource, VcsError};

use crate::feed::FeedItem;
use crate::index::{self, IndexTree};

const INDEX_FILENAME: &str = "index.html";

/// History build error.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The history could not be read.
    #[error("{0}")]
    Source(#[from] VcsError),
    /// A day page could not be rendered or written.
    #[error("Failed to build page for {date}: {source}")]
    Page {
        date: DateKey,
        #[source]
        source: RenderError,
    },
    /// A year or month index page could not be rendered or written.
    #[error("Failed to build index {}: {source}", path.display())]
    Index {
        path: PathBuf,
        #[source]
        source: RenderError,
    },
}

/// Result of a successful history build.
#[derive(Debug, Default)]
pub struct HistoryOutput {
    /// One item per day written, newest first.
    pub items: Vec<FeedItem>,
    /// Days whose content was unavailable or could not be converted.
    pub skipped: Vec<DateKey>,
    /// Synthetic year and month pages written.
    pub index_pages: usize,
}

/// Output path of a day page: `{root}/YYYY/MM/DD/index.html`.
#[must_use]
pub fn day_page_path(output_dir: &Path, date: DateKey) -> PathBuf {
    month_dir(output_dir, date.year(), date.month())
        .join(format!("{:02}", date.day()))
        .join(INDEX_FILENAME)
}

fn year_dir(output_dir: &Path, year: i32) -> PathBuf {
    output_dir.join(format!("{year:04}"))
}

fn month_dir(output_dir: &Path, year: i32, month: u32) -> PathBuf {
    year_dir(output_dir, year).join(format!("{month:02}"))
}

/// Builds historical pages from a [`HistorySource`].
pub struct HistoryBuilder<'a> {
    renderer: &'a PageRenderer,
    source: &'a dyn HistorySource,
    output_dir: &'a Path,
}

impl<'a> HistoryBuilder<'a> {
    pub fn new(
        renderer: &'a PageRenderer,
        source: &'a dyn HistorySource,
        output_dir: &'a Path,
    ) -> Self {
        Self {
            renderer,
            source,
            output_dir,
        }
    }

    /// Build every day page and index page.
    ///
    /// `now` stamps the synthetic index pages; day pages use the day itself.
    pub fn build(&self, now: DateTime<Utc>) -> Result<HistoryOutput, HistoryError> {
        let history = self.source.fetch_history()?;
        let base_url = &self.renderer.config().base_url;

        let mut output = HistoryOutput::default();
        let mut tree = IndexTree::new();

        for (date, revision) in history.iter().rev() {
            let content = match self.source.fetch_content(revision) {
                Ok(content) => content,
                Err(VcsError::ContentUnavailable { .. }) => {
                    tracing::warn!(%date, %revision, "Skipping date, content unavailable");
                    output.skipped.push(*date);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let timestamp = date.canonical_timestamp();
            let path = day_page_path(self.output_dir, *date);
            let fragment = match self
                .renderer
                .render_and_write(&content, timestamp, timestamp, &path)
            {
                Ok(fragment) => fragment,
                Err(RenderError::Conversion(reason)) => {
                    tracing::warn!(%date, %revision, %reason, "Skipping date, content not convertible");
                    output.skipped.push(*date);
                    continue;
                }
                Err(source) => {
                    return Err(HistoryError::Page {
                        date: *date,
                        source,
                    });
                }
            };
            tracing::debug!(%date, path = %path.display(), "Wrote history page");

            output.items.push(FeedItem::new(
                date.to_string(),
                format!("{base_url}{}", date.link_path()),
                &fragment,
                timestamp,
            ));
            tree.insert(*date);
        }

        output.index_pages = self.write_indexes(&tree, now)?;
        Ok(output)
    }

    fn write_indexes(&self, tree: &IndexTree, now: DateTime<Utc>) -> Result<usize, HistoryError> {
        let mut written = 0;
        for year in tree.years() {
            let markdown = index::year_markdown(year, &tree.year_entries(year));
            let path = year_dir(self.output_dir, year).join(INDEX_FILENAME);
            self.write_index(&markdown, now, path)?;
            written += 1;

            for month in tree.months(year) {
                let markdown = index::month_markdown(year, month, &tree.month_entries(year, month));
                let path = month_dir(self.output_dir, year, month).join(INDEX_FILENAME);
                self.write_index(&markdown, now, path)?;
                written += 1;
            }
        }
        Ok(written)
    }

    fn write_index(
        &self,
        markdown: &str,
        now: DateTime<Utc>,
        path: PathBuf,
    ) -> Result<(), HistoryError> {
        match self
            .renderer
            .render_and_write(markdown.as_bytes(), now, now, &path)
        {
            Ok(_) => Ok(()),
            Err(source) => Err(HistoryError::Index { path, source }),
        }
    }
}
