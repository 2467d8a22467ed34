//! Server-sent timer events

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::state::{AppState, TimerState};

/// Stream the current timer snapshot, then every change after it.
///
/// Ends when the sender side of the channel is dropped.
pub fn timer_updates(rx: watch::Receiver<TimerState>) -> impl Stream<Item = TimerState> {
    stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        Some((snapshot, (rx, false)))
    })
}

/// Handle GET /timer/events - SSE stream of timer snapshots
pub async fn timer_events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Timer event stream opened");

    let events = timer_updates(state.subscribe_timer()).map(|timer| {
        Ok::<_, Infallible>(match Event::default().event("timer").json_data(&timer) {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to encode timer event: {}", e);
                Event::default().event("timer").data(timer.display)
            }
        })
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
