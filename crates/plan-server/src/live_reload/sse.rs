//! Server-sent event stream for live reload.
//!
//! Each connection owns one [`Subscription`]. The stream yields a `reload`
//! event per broadcast and a comment on every heartbeat tick. When the client
//! goes away axum drops the stream, which drops the subscription and
//! deregisters it from the broker.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::Stream;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::broker::Subscription;
use crate::state::AppState;

/// Data payload sent to the browser on rebuild.
pub(crate) const RELOAD_EVENT: &str = "reload";

/// Handle `GET /events`.
pub(crate) async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.broker.subscribe();
    tracing::debug!("Preview session opened");
    Sse::new(session_stream(subscription, state.heartbeat))
}

fn heartbeat_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    // A late tick is dropped, never replayed.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Turn a subscription into an event stream that ends when the broker stops.
fn session_stream(
    subscription: Subscription,
    heartbeat: Duration,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let state = (subscription, heartbeat_interval(heartbeat));
    futures::stream::unfold(state, |(mut subscription, mut interval)| async move {
        let event = tokio::select! {
            signal = subscription.recv() => {
                signal?;
                Event::default().data(RELOAD_EVENT)
            }
            _ = interval.tick() => Event::default().comment("heartbeat"),
        };
        Some((Ok(event), (subscription, interval)))
    })
}
