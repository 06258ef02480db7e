//! `plan preview` command implementation.

use std::path::Path;

use clap::Args;
use plan_server::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig, run_server};

use super::open_project;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the preview command.
#[derive(Args)]
pub(crate) struct PreviewArgs {
    /// Host to bind to.
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port to bind to.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Do not open a browser.
    #[arg(long)]
    no_open: bool,
}

impl PreviewArgs {
    pub(crate) fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            open_browser: !self.no_open,
            ..ServerConfig::default()
        }
    }

    /// Execute the preview command.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial build fails or the server fails to start.
    pub(crate) async fn execute(self, input: &Path) -> Result<(), CliError> {
        let output = Output::new();
        let project = open_project(input)?;
        let config = self.server_config();

        output.info(&format!("Plan: {}", project.paths().plan_path().display()));
        output.info(&format!(
            "Serving at http://{}:{}/ (Ctrl-C to stop)",
            config.host, config.port
        ));

        run_server(config, project).await?;
        Ok(())
    }
}
