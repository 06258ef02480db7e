//! Plan CLI - publish a plan file and its history as a static site.
//!
//! Provides commands for:
//! - `build`: Generate the site once
//! - `preview`: Build, serve and rebuild on change
//! - `save`, `publish`, `revert`, `rollback`: Git shortcuts for the plan file
//! - `edit`: Open the plan in an editor
//! - `debug`: Print resolved configuration and repository state

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{GitCommand, PreviewArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Plan - publish a plan file and its history.
#[derive(Parser)]
#[command(name = "plan", version, about)]
struct Cli {
    /// Plan file, or the directory containing `plan.md`.
    #[arg(short, long, global = true, env = "PLAN_FILE", default_value = ".")]
    file: PathBuf,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into `public/`.
    Build,
    /// Build, serve on localhost and rebuild on change.
    Preview(PreviewArgs),
    /// Open the plan in your editor.
    Edit,
    /// Print diagnostic information.
    Debug,
    #[command(flatten)]
    Git(GitCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build => commands::build::execute(&cli.file),
        Commands::Preview(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute(&cli.file))
        }
        Commands::Edit => commands::edit::execute(&cli.file),
        Commands::Debug => commands::debug::execute(&cli.file, VERSION),
        Commands::Git(cmd) => cmd.execute(&cli.file),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
