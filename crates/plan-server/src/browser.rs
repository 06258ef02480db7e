//! Open the preview in the user's browser.

use std::process::{Command, Stdio};
use std::thread::JoinHandle;

fn opener(url: &str) -> Command {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(url);
        command
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("rundll32");
        command.args(["url.dll,FileProtocolHandler", url]);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}

/// Launch the platform browser opener without waiting for it.
///
/// Failure only costs convenience, so it is logged and ignored.
pub(crate) fn open(url: &str) {
    match launch(opener(url)) {
        Ok(_) => tracing::debug!(url, "Opened browser"),
        Err(e) => tracing::warn!(url, error = %e, "Failed to open browser"),
    }
}

/// Spawn `command` with null stdio and reap it on a background thread.
fn launch(mut command: Command) -> std::io::Result<JoinHandle<()>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(std::thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => {
            tracing::debug!(%status, "Browser opener exited with failure");
        }
        Ok(_) => {}
        Err(e) => tracing::debug!(error = %e, "Failed to wait for browser opener"),
    }))
}
