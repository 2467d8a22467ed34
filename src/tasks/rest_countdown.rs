//! Rest countdown background task

use std::sync::Arc;
use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, error, info};

use crate::state::{AppState, TickOutcome};

/// Handle to a spawned countdown. Dropping it cancels the task.
#[derive(Debug)]
pub struct RestCountdown {
    generation: u64,
    cancel_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl RestCountdown {
    /// Spawn the countdown for the rest period tagged `generation`
    pub fn spawn(state: Arc<AppState>, generation: u64) -> Self {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let handle = tokio::spawn(rest_countdown_task(state, generation, cancel_rx));
        Self {
            generation,
            cancel_tx,
            handle,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fire the cancellation token. The task exits at its next poll.
    pub fn cancel(self) {
        if self.handle.is_finished() || self.cancel_tx.send(()).is_err() {
            debug!("Countdown {} already stopped", self.generation);
        }
    }
}

/// Tick the rest timer once per period until it finishes, goes stale or is cancelled
async fn rest_countdown_task(
    state: Arc<AppState>,
    generation: u64,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let period = state.tick_period;
    debug!("Starting rest countdown {} with {:?} ticks", generation, period);

    // First tick lands one period after start, not immediately
    let mut interval = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match state.tick_rest(generation) {
                    Ok(TickOutcome::Ticked(remaining)) => {
                        debug!("Rest countdown {}: {}s left", generation, remaining);
                    }
                    Ok(TickOutcome::Finished) => {
                        info!("Rest period finished");
                        break;
                    }
                    Ok(TickOutcome::Stale) => {
                        debug!("Rest countdown {} superseded, stopping", generation);
                        break;
                    }
                    Err(e) => {
                        error!("Failed to tick rest timer: {}", e);
                        break;
                    }
                }
            }

            _ = &mut cancel_rx => {
                debug!("Rest countdown {} cancelled", generation);
                break;
            }
        }
    }
}
