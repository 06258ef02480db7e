//! Plan directory watcher.
//!
//! Watches the plan directory (non-recursively) for changes to the plan
//! document, the template and `settings.json`. Bursts of editor events are
//! debounced, then the project reloads whatever changed, rebuilds, and asks
//! the broker to signal every open preview session.

use std::path::Path;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use plan_config::PlanFileKind;
use plan_site::Project;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::broker::BrokerHandle;
use super::debouncer::{EventDebouncer, FsEvent, FsEventKind};
use crate::error::ServerError;

/// Raw events buffered between the notify thread and the watcher task.
const EVENT_BUFFER: usize = 100;

/// Running watcher. Stops watching and rebuilding when dropped.
pub(crate) struct PlanWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for PlanWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start watching the project's plan directory.
///
/// The project moves into the watcher task, which owns it from now on.
pub(crate) fn start(
    project: Project,
    broker: BrokerHandle,
    debounce: Duration,
) -> Result<PlanWatcher, ServerError> {
    let (tx, rx) = mpsc::channel::<Event>(EVENT_BUFFER);
    let plan_dir = project.paths().plan_dir.clone();
    let watch_error = |source| ServerError::Watch {
        path: plan_dir.clone(),
        source,
    };

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            // Callback runs on notify's own thread.
            Ok(event) => {
                let _ = tx.blocking_send(event);
            }
            Err(e) => tracing::warn!(error = %e, "File watcher error"),
        }
    })
    .map_err(watch_error)?;
    watcher
        .watch(&plan_dir, RecursiveMode::NonRecursive)
        .map_err(watch_error)?;
    tracing::info!(path = %plan_dir.display(), "Watching for changes");

    let task = tokio::spawn(run(project, rx, broker, debounce));
    Ok(PlanWatcher {
        _watcher: watcher,
        task,
    })
}

async fn run(
    mut project: Project,
    mut events: mpsc::Receiver<Event>,
    broker: BrokerHandle,
    debounce: Duration,
) {
    let mut debouncer = EventDebouncer::new(debounce);

    loop {
        let deadline = debouncer.next_deadline();
        let wake = deadline.map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std);

        tokio::select! {
            event = events.recv() => match event {
                Some(event) => record_event(&event, &project, &mut debouncer),
                None => break,
            },
            () = tokio::time::sleep_until(wake), if deadline.is_some() => {
                let changed = changed_kinds(&project, debouncer.drain_ready());
                if changed.is_empty() {
                    continue;
                }
                let Some((returned, built)) = rebuild(project, changed).await else {
                    return;
                };
                project = returned;
                if built {
                    broker.broadcast();
                }
            }
        }
    }

    tracing::debug!("Watcher stopped");
}

/// Map a notify event onto the debouncer, ignoring unrelated files.
fn record_event(event: &Event, project: &Project, debouncer: &mut EventDebouncer) {
    let kind = match event.kind {
        // Permission and timestamp changes leave content as is.
        EventKind::Modify(ModifyKind::Metadata(_)) => return,
        EventKind::Create(_) | EventKind::Modify(_) => FsEventKind::Written,
        EventKind::Remove(_) => FsEventKind::Removed,
        _ => return,
    };

    for path in &event.paths {
        if is_relevant(path, project) {
            debouncer.record(path.clone(), kind);
            tracing::debug!(path = %path.display(), ?kind, "Recorded filesystem event");
        }
    }
}

fn is_relevant(path: &Path, project: &Project) -> bool {
    project.paths().classify(path).is_some()
}

/// Kinds of plan file whose latest event was a write. Removals never
/// trigger a rebuild.
fn changed_kinds(project: &Project, events: Vec<FsEvent>) -> Vec<PlanFileKind> {
    events
        .into_iter()
        .filter(|event| event.kind == FsEventKind::Written)
        .filter_map(|event| project.paths().classify(&event.path))
        .collect()
}

/// Reload and rebuild on the blocking pool.
///
/// Returns the project for reuse and whether the build succeeded, or `None`
/// if the build task panicked.
async fn rebuild(mut project: Project, changed: Vec<PlanFileKind>) -> Option<(Project, bool)> {
    tracing::info!(?changed, "Plan changed, rebuilding");

    let joined = tokio::task::spawn_blocking(move || {
        project.apply_changes(&changed);
        let result = project.build();
        (project, result)
    })
    .await;

    match joined {
        Ok((project, Ok(report))) => {
            tracing::info!(
                pages = report.pages_written,
                elapsed_ms = report.elapsed.as_millis(),
                "Rebuilt"
            );
            Some((project, true))
        }
        // Sessions keep showing the last good build.
        Ok((project, Err(e))) => {
            tracing::error!(error = %e, "Rebuild failed");
            Some((project, false))
        }
        Err(e) => {
            tracing::error!(error = %e, "Rebuild task failed, stopping watcher");
            None
        }
    }
}
