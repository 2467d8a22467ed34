//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Exercise, ExerciseView, NewExercise, RestPeriod, SetOutcome, TickOutcome, TimerState, Tracker};
use crate::{error::TrackerError, tasks::RestCountdown};

/// Main application state that owns the tracker and the running countdown
#[derive(Debug)]
pub struct AppState {
    /// Exercise list and rest timer
    pub tracker: Arc<Mutex<Tracker>>,
    /// Countdown tick period, one second outside of tests and demos
    pub tick_period: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for timer updates
    pub timer_update_tx: watch::Sender<TimerState>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerState>,
    /// The one countdown task allowed to run
    countdown: Mutex<Option<RestCountdown>>,
}

impl AppState {
    /// Create a new AppState with an empty tracker
    pub fn new(port: u16, host: String, tick_period: Duration) -> Self {
        let (timer_update_tx, timer_update_rx) = watch::channel(TimerState::inactive());

        Self {
            tracker: Arc::new(Mutex::new(Tracker::new())),
            tick_period,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
            countdown: Mutex::new(None),
        }
    }

    /// Apply `updater` to the tracker and publish the timer if it changed.
    ///
    /// Also returns the tracker's last issued timer generation, read under
    /// the same lock.
    pub fn update_tracker<F, R>(&self, action: Option<&str>, updater: F) -> Result<(R, u64), TrackerError>
    where
        F: FnOnce(&mut Tracker) -> Result<R, TrackerError>,
    {
        let mut tracker = self.tracker.lock().map_err(|_| TrackerError::LockPoisoned)?;

        let before = tracker.timer_state();
        let result = updater(&mut *tracker)?;
        let after = tracker.timer_state();
        let last_generation = tracker.timer().last_generation();

        // Publish under the lock so watchers see updates in order
        if before != after {
            if let Err(e) = self.timer_update_tx.send(after) {
                warn!("Failed to send timer update: {}", e);
            }
        }
        drop(tracker);

        if let Some(action) = action {
            if let Ok(mut last_action) = self.last_action.lock() {
                *last_action = Some(action.to_string());
            }
            if let Ok(mut last_time) = self.last_action_time.lock() {
                *last_time = Some(Utc::now());
            }
        }

        Ok((result, last_generation))
    }

    /// Add an exercise to the head of the list
    pub fn add_exercise(&self, input: &NewExercise) -> Result<Exercise, TrackerError> {
        let (exercise, _) = self.update_tracker(Some("add"), |tracker| tracker.add(input))?;
        info!("Added exercise '{}' ({} sets, {}s rest)", exercise.name, exercise.total_sets, exercise.rest);
        Ok(exercise)
    }

    /// Delete an exercise and stop its countdown if it owned the timer
    pub fn remove_exercise(&self, id: u64) -> Result<Exercise, TrackerError> {
        let ((exercise, cancelled), _) = self.update_tracker(Some("delete"), |tracker| tracker.remove(id))?;
        info!("Deleted exercise '{}'", exercise.name);

        if let Some(period) = cancelled {
            info!("Rest timer for '{}' cancelled by delete", period.exercise_name);
            self.retire_countdown(period.generation)?;
        }
        Ok(exercise)
    }

    /// Record a set and start the rest countdown
    pub fn complete_set(self: &Arc<Self>, id: u64) -> Result<SetOutcome, TrackerError> {
        let (outcome, last_generation) =
            self.update_tracker(Some("complete-set"), |tracker| tracker.complete_set(id))?;

        match &outcome {
            SetOutcome::Resting { exercise, generation } => {
                info!(
                    "Set done for '{}' ({} left), resting {}s",
                    exercise.name, exercise.remaining_sets, exercise.rest
                );
                self.schedule_countdown(*generation)?;
            }
            SetOutcome::NoRest { exercise } => {
                info!("Set done for '{}' ({} left), no rest", exercise.name, exercise.remaining_sets);
                self.retire_countdown(last_generation)?;
            }
            SetOutcome::AlreadyCompleted { exercise } => {
                debug!("'{}' already completed, ignoring", exercise.name);
            }
            SetOutcome::RestInProgress { exercise } => {
                debug!("'{}' is still resting, ignoring", exercise.name);
            }
        }

        Ok(outcome)
    }

    /// Skip or cancel the running rest period
    pub fn skip_rest(&self) -> Result<Option<RestPeriod>, TrackerError> {
        let (skipped, _) = self.update_tracker(Some("skip"), |tracker| Ok(tracker.skip_rest()))?;
        if let Some(period) = &skipped {
            info!(
                "Skipped rest for '{}' with {}s left",
                period.exercise_name, period.remaining_seconds
            );
            self.retire_countdown(period.generation)?;
        }
        Ok(skipped)
    }

    /// Remove every exercise and stop the timer
    pub fn clear_exercises(&self) -> Result<usize, TrackerError> {
        let (removed, last_generation) = self.update_tracker(Some("clear"), |tracker| Ok(tracker.clear()))?;
        info!("Cleared {} exercises", removed);
        self.retire_countdown(last_generation)?;
        Ok(removed)
    }

    /// Advance the rest timer by one tick on behalf of countdown `generation`
    pub fn tick_rest(&self, generation: u64) -> Result<TickOutcome, TrackerError> {
        self.update_tracker(None, |tracker| Ok(tracker.tick(generation)))
            .map(|(outcome, _)| outcome)
    }

    /// Current exercises and timer, read under one lock
    pub fn snapshot(&self) -> Result<(Vec<ExerciseView>, TimerState), TrackerError> {
        self.tracker
            .lock()
            .map(|tracker| (tracker.views(), tracker.timer_state()))
            .map_err(|_| TrackerError::LockPoisoned)
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> Result<TimerState, TrackerError> {
        self.tracker
            .lock()
            .map(|tracker| tracker.timer_state())
            .map_err(|_| TrackerError::LockPoisoned)
    }

    /// Subscribe to timer snapshots
    pub fn subscribe_timer(&self) -> watch::Receiver<TimerState> {
        self.timer_update_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Stop whatever countdown is running, used on shutdown
    pub fn shutdown(&self) {
        if let Ok(mut slot) = self.countdown.lock() {
            if let Some(countdown) = slot.take() {
                countdown.cancel();
            }
        }
    }

    /// Replace the running countdown with one for `generation`.
    ///
    /// A newer countdown already in the slot wins; this only happens when two
    /// completions race between the tracker update and here.
    fn schedule_countdown(self: &Arc<Self>, generation: u64) -> Result<(), TrackerError> {
        let mut slot = self.countdown.lock().map_err(|_| TrackerError::LockPoisoned)?;

        if let Some(current) = slot.as_ref() {
            if current.generation() > generation {
                debug!("Countdown {} is newer than {}, keeping it", current.generation(), generation);
                return Ok(());
            }
        }
        if let Some(previous) = slot.take() {
            previous.cancel();
        }

        *slot = Some(RestCountdown::spawn(Arc::clone(self), generation));
        Ok(())
    }

    /// Cancel the running countdown if it is not newer than `generation`
    fn retire_countdown(&self, generation: u64) -> Result<(), TrackerError> {
        let mut slot = self.countdown.lock().map_err(|_| TrackerError::LockPoisoned)?;

        if slot.as_ref().is_some_and(|current| current.generation() <= generation) {
            if let Some(countdown) = slot.take() {
                countdown.cancel();
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn countdown_generation(&self) -> Option<u64> {
        self.countdown
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(RestCountdown::generation))
    }
}
