//! CLI error types.

use plan_config::ConfigError;
use plan_server::ServerError;
use plan_site::BuildError;
use plan_vcs::VcsError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Git(#[from] VcsError),

    #[error("Editor `{editor}` exited with {status}")]
    Editor {
        editor: String,
        status: std::process::ExitStatus,
    },
}
