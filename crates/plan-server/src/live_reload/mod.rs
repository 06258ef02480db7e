//! Live reload: file watching, rebuilds, and reload notifications.

mod broker;
mod debouncer;
mod sse;
mod watcher;

pub(crate) use broker::{BrokerHandle, spawn as spawn_broker};
pub(crate) use sse::events;
pub(crate) use watcher::start as start_watcher;

#[cfg(test)]
pub(crate) use sse::RELOAD_EVENT;
