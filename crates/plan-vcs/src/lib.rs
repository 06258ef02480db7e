//! Version-control access for the plan publisher.
//!
//! This crate provides a [`HistorySource`] trait for retrieving the dated edit
//! history of the tracked plan file. This enables:
//!
//! - **Unit testing** of the site builder without a git repository
//! - **Clean separation** between history reconstruction and process plumbing
//!
//! # Architecture
//!
//! The crate provides:
//! - [`DateKey`] and [`Revision`], the keys of a [`HistoryMap`]
//! - [`HistorySource`] trait with `fetch_history()` and `fetch_content()`
//! - [`GitHistory`] implementation over the `git` command-line tool
//! - [`GitRepo`] for the side-effecting save/publish/revert/rollback commands
//! - [`MockHistory`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use plan_vcs::{GitHistory, HistorySource};
//!
//! let source = GitHistory::new("/home/me/plan", "plan.md");
//! for (date, revision) in source.fetch_history()? {
//!     let content = source.fetch_content(&revision)?;
//!     println!("{date}: {} bytes", content.len());
//! }
//! ```

mod date;
mod git;
mod history;
#[cfg(feature = "mock")]
mod mock;
mod ops;

pub use date::DateKey;
pub use git::GitHistory;
pub use history::{HistoryMap, HistorySource, Revision, VcsError, parse_log};
#[cfg(feature = "mock")]
pub use mock::MockHistory;
pub use ops::{GitRepo, SaveOutcome};
