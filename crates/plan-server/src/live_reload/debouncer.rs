//! Per-path debouncing of watcher events.
//!
//! Each path keeps only its latest event. Every new event for a path pushes
//! its deadline out by the debounce window; the path is released once the
//! window passes without further events.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What last happened to a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FsEventKind {
    /// Created or written.
    Written,
    Removed,
}

/// A path whose window has closed, with its latest kind.
#[derive(Clone, Debug)]
pub(crate) struct FsEvent {
    pub path: PathBuf,
    pub kind: FsEventKind,
}

/// Pending events keyed by path. Owned by the watcher task.
pub(crate) struct EventDebouncer {
    pending: HashMap<PathBuf, (FsEventKind, Instant)>,
    window: Duration,
}

impl EventDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            window,
        }
    }

    /// Record an event. It replaces whatever was pending for the path.
    pub fn record(&mut self, path: PathBuf, kind: FsEventKind) {
        self.pending.insert(path, (kind, Instant::now() + self.window));
    }

    /// Take every path whose window has closed.
    pub fn drain_ready(&mut self) -> Vec<FsEvent> {
        let now = Instant::now();
        let mut ready = Vec::new();
        self.pending.retain(|path, (kind, deadline)| {
            if *deadline > now {
                return true;
            }
            ready.push(FsEvent {
                path: path.clone(),
                kind: *kind,
            });
            false
        });
        ready
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(_, deadline)| *deadline).min()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use pretty_assertions::assert_eq;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(20);

    fn plan() -> PathBuf {
        PathBuf::from("/plans/me/plan.md")
    }

    #[test]
    fn test_held_until_window_closes() {
        let mut debouncer = EventDebouncer::new(WINDOW);
        debouncer.record(plan(), FsEventKind::Written);

        assert!(debouncer.drain_ready().is_empty());
        thread::sleep(WINDOW + Duration::from_millis(5));

        let events = debouncer.drain_ready();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, plan());
        assert_eq!(events[0].kind, FsEventKind::Written);
        assert!(debouncer.next_deadline().is_none());
    }

    #[test]
    fn test_editor_save_burst_yields_one_write() {
        let mut debouncer = EventDebouncer::new(WINDOW);

        // Delete-then-create save followed by a couple of writes.
        debouncer.record(plan(), FsEventKind::Removed);
        debouncer.record(plan(), FsEventKind::Written);
        debouncer.record(plan(), FsEventKind::Written);
        thread::sleep(WINDOW + Duration::from_millis(5));

        let events = debouncer.drain_ready();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, FsEventKind::Written);
    }

    #[test]
    fn test_removal_after_write_wins() {
        let mut debouncer = EventDebouncer::new(WINDOW);

        debouncer.record(plan(), FsEventKind::Written);
        debouncer.record(plan(), FsEventKind::Removed);
        thread::sleep(WINDOW + Duration::from_millis(5));

        let events = debouncer.drain_ready();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, FsEventKind::Removed);
    }

    #[test]
    fn test_new_event_pushes_deadline_out() {
        let mut debouncer = EventDebouncer::new(Duration::from_millis(100));

        debouncer.record(plan(), FsEventKind::Written);
        let first = debouncer.next_deadline().unwrap();
        thread::sleep(Duration::from_millis(5));
        debouncer.record(plan(), FsEventKind::Written);

        assert!(debouncer.next_deadline().unwrap() > first);
    }

    #[test]
    fn test_only_expired_paths_are_drained() {
        let mut debouncer = EventDebouncer::new(WINDOW);
        let settings = PathBuf::from("/plans/me/settings.json");

        debouncer.record(plan(), FsEventKind::Written);
        thread::sleep(WINDOW + Duration::from_millis(5));
        debouncer.record(settings.clone(), FsEventKind::Written);

        let events = debouncer.drain_ready();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, plan());
        assert!(debouncer.next_deadline().is_some());

        thread::sleep(WINDOW + Duration::from_millis(5));
        let events = debouncer.drain_ready();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].path, settings);
    }
}
