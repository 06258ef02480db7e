//! Page rendering for the plan publisher.
//!
//! Turns markdown into finished HTML pages:
//!
//! - [`render_fragment`] converts markdown to an HTML fragment
//! - [`Template`] substitutes configuration tokens into the page shell
//! - [`PageRenderer`] combines both and writes pages atomically
//!
//! A [`PageRenderer`] is immutable once constructed. Reloading settings or
//! the template means constructing a new one.
//!
//! # Example
//!
//! ```ignore
//! use plan_renderer::{PageRenderer, Template};
//!
//! let renderer = PageRenderer::new(config, Template::embedded());
//! let fragment = renderer.render_and_write(b"# Hello", created, updated, &path)?;
//! ```

mod converter;
mod highlight;
mod page;
mod template;

use std::path::PathBuf;

pub use converter::render_fragment;
pub use page::{PageRenderer, write_atomic};
pub use template::{CONTENT_MARKER, LIVE_RELOAD_SCRIPT, Template, Tokens};

/// Rendering error.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Markdown conversion failed.
    #[error("Markdown conversion failed: {0}")]
    Conversion(String),
    /// Template does not contain exactly one content marker.
    #[error("Invalid template: expected one {{{{content}}}} marker, found {found}")]
    MissingMarker {
        /// Number of markers present.
        found: usize,
    },
    /// Page could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
