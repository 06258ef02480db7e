//! Static site generation for the plan publisher.
//!
//! Turns the plan document and its history into a browsable site:
//!
//! ```text
//! public/
//! ├── index.html            current document
//! ├── feed.xml              RSS 2.0, current item first
//! └── 2024/
//!     ├── index.html        every day in 2024, newest first
//!     └── 01/
//!         ├── index.html    every day in January 2024
//!         └── 05/index.html the document as of 2024-01-05
//! ```
//!
//! [`Project`] is the entry point used by the CLI and the preview server;
//! [`SiteBuilder`] and [`HistoryBuilder`] can be driven directly with any
//! [`HistorySource`](plan_vcs::HistorySource).

mod builder;
mod feed;
mod history;
mod index;
mod project;

pub use builder::{BuildError, BuildReport, SiteBuilder};
pub use feed::{CONTENT_NAMESPACE, Channel, FEED_FILENAME, Feed, FeedError, FeedItem};
pub use history::{HistoryBuilder, HistoryError, HistoryOutput, day_page_path};
pub use index::{DayEntry, IndexTree, month_markdown, month_name, year_markdown};
pub use project::Project;
