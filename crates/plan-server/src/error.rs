//! Server error type.

use std::net::SocketAddr;
use std::path::PathBuf;

use plan_site::BuildError;

/// Preview server error. Every variant is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The plan directory could not be watched.
    #[error("Failed to watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    /// Host and port do not form a socket address.
    #[error("Invalid listen address: {0}")]
    Address(String),
    /// The listen socket could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The initial build failed.
    #[error(transparent)]
    Build(#[from] BuildError),
    /// The HTTP server stopped with an error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}
