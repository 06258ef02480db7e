//! Live preview server for the plan publisher.
//!
//! Builds the site once, then serves the output directory over HTTP while a
//! watcher rebuilds on every change to the plan, its template or its
//! settings. Open pages learn about rebuilds through a server-sent event
//! stream at `/events`.
//!
//! # Architecture
//!
//! ```text
//! notify ──► watcher task ──► Project::build (blocking pool)
//!                 │
//!                 └─ broadcast ──► broker task ──► session 1 ──► GET /events
//!                                       ▲     └──► session N
//!                          register / deregister
//!
//! GET /*  ──► ServeDir(output_dir)
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use plan_server::{ServerConfig, run_server};
//! use plan_site::Project;
//!
//! let project = Project::open(std::path::Path::new("."))?;
//! run_server(ServerConfig::default(), project).await?;
//! ```

mod app;
mod browser;
mod error;
mod live_reload;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use plan_site::Project;
use state::AppState;

pub use error::ServerError;

/// Default host address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port.
pub const DEFAULT_PORT: u16 = 8081;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Interval between keep-alive comments on event streams.
    pub heartbeat: Duration,
    /// Quiet period before a burst of file events triggers a rebuild.
    pub debounce: Duration,
    /// Open the preview in a browser once listening.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            heartbeat: Duration::from_secs(15),
            debounce: Duration::from_millis(100),
            open_browser: true,
        }
    }
}

impl ServerConfig {
    fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ServerError::Address(addr))
    }
}

/// Build the project, then serve and watch it until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the initial build fails, the plan directory cannot be
/// watched, or the address cannot be bound.
pub async fn run_server(config: ServerConfig, project: Project) -> Result<(), ServerError> {
    serve(config, project, shutdown_signal()).await
}

async fn serve(
    config: ServerConfig,
    project: Project,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let addr = config.socket_addr()?;
    let project = initial_build(project.with_live_reload(true)).await?;
    let output_dir = project.paths().output_dir.clone();

    let broker = live_reload::spawn_broker();
    let _watcher = live_reload::start_watcher(project, broker.clone(), config.debounce)?;

    let state = Arc::new(AppState {
        broker,
        heartbeat: config.heartbeat,
    });
    let app = app::create_router(state, &output_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr().map_err(ServerError::Serve)?;
    let url = format!("http://{local}/");
    tracing::info!(address = %local, "Starting server");

    if config.open_browser {
        browser::open(&url);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

/// Run the first build on the blocking pool and hand the project back.
async fn initial_build(project: Project) -> Result<Project, ServerError> {
    let (project, result) = tokio::task::spawn_blocking(move || {
        let result = project.build();
        (project, result)
    })
    .await
    .map_err(|e| ServerError::Serve(std::io::Error::other(e)))?;

    let report = result?;
    if let Some(warning) = &report.history_warning {
        tracing::warn!(warning = %warning, "Serving without history");
    }
    Ok(project)
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use plan_config::PlanPaths;
    use plan_vcs::MockHistory;
    use pretty_assertions::assert_eq;

    use super::*;

    fn project(dir: &Path, template: Option<&str>) -> Project {
        std::fs::write(dir.join("plan.md"), "# Hello").unwrap();
        if let Some(template) = template {
            std::fs::write(dir.join("template.html"), template).unwrap();
        }
        let paths = PlanPaths::new(dir.to_path_buf(), "plan.md");
        Project::with_source(paths, Arc::new(MockHistory::new()))
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            port: 0,
            open_browser: false,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8081");
        assert_eq!(config.heartbeat, Duration::from_secs(15));
        assert!(config.open_browser);
    }

    #[test]
    fn test_invalid_address() {
        let config = ServerConfig {
            host: "not a host".to_owned(),
            ..ServerConfig::default()
        };
        assert!(matches!(config.socket_addr(), Err(ServerError::Address(_))));
    }

    #[tokio::test]
    async fn test_initial_build_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let project = project(dir.path(), Some("<html>no marker</html>"));

        let err = serve(test_config(), project, std::future::ready(()))
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::Build(_)));
    }

    #[tokio::test]
    async fn test_builds_with_live_reload_then_shuts_down() {
        let dir = tempfile::tempdir().unwrap();
        let project = project(dir.path(), None);

        serve(test_config(), project, std::future::ready(()))
            .await
            .unwrap();

        let index = std::fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert!(index.contains("<h1>Hello</h1>"));
        assert!(index.contains("EventSource(\"/events\")"));
    }
}
