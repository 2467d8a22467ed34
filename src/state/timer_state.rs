//! Rest timer state machine and its serializable snapshot

use serde::{Deserialize, Serialize};

use super::Exercise;

/// Format seconds as zero-padded `MM:SS`. Minutes are not wrapped into hours.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One rest period between sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestPeriod {
    pub exercise_id: u64,
    pub exercise_name: String,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    /// Tags the countdown task driving this period
    pub generation: u64,
}

/// Result of feeding one tick to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running with this many seconds left
    Ticked(u64),
    /// Reached zero and went idle
    Finished,
    /// Timer idle or tick belongs to an older period
    Stale,
}

/// Single-slot rest countdown: `Idle` or `Running`
#[derive(Debug, Clone, Default)]
pub struct RestTimer {
    running: Option<RestPeriod>,
    last_generation: u64,
}

impl RestTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin resting after a set of `exercise`, replacing any running period.
    ///
    /// Returns the new generation, or `None` when the exercise has no rest
    /// and the timer stays idle.
    pub fn start(&mut self, exercise: &Exercise) -> Option<u64> {
        self.cancel();
        if exercise.rest == 0 {
            return None;
        }

        self.last_generation += 1;
        self.running = Some(RestPeriod {
            exercise_id: exercise.id,
            exercise_name: exercise.name.clone(),
            remaining_seconds: exercise.rest,
            total_seconds: exercise.rest,
            generation: self.last_generation,
        });
        Some(self.last_generation)
    }

    /// Advance the period tagged `generation` by one second
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        let Some(period) = self.running.as_mut() else {
            return TickOutcome::Stale;
        };
        if period.generation != generation {
            return TickOutcome::Stale;
        }

        period.remaining_seconds = period.remaining_seconds.saturating_sub(1);
        if period.remaining_seconds == 0 {
            self.running = None;
            TickOutcome::Finished
        } else {
            TickOutcome::Ticked(period.remaining_seconds)
        }
    }

    /// Stop the running period, if any, and hand it back
    pub fn cancel(&mut self) -> Option<RestPeriod> {
        self.running.take()
    }

    /// Stop the running period only if it belongs to `exercise_id`
    pub fn cancel_for(&mut self, exercise_id: u64) -> Option<RestPeriod> {
        if self.is_resting_for(exercise_id) {
            self.cancel()
        } else {
            None
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn is_resting_for(&self, exercise_id: u64) -> bool {
        self.running
            .as_ref()
            .is_some_and(|period| period.exercise_id == exercise_id && period.remaining_seconds > 0)
    }

    pub fn current(&self) -> Option<&RestPeriod> {
        self.running.as_ref()
    }

    /// Most recently issued generation, zero before the first rest
    pub fn last_generation(&self) -> u64 {
        self.last_generation
    }

    pub fn snapshot(&self) -> TimerState {
        match &self.running {
            Some(period) => TimerState::active(period),
            None => TimerState::inactive(),
        }
    }
}

/// Timer snapshot published to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub active: bool,
    pub exercise_id: Option<u64>,
    pub exercise_name: Option<String>,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    /// `remaining_seconds` as `MM:SS`
    pub display: String,
}

impl TimerState {
    /// Create an active timer state from a running period
    pub fn active(period: &RestPeriod) -> Self {
        Self {
            active: true,
            exercise_id: Some(period.exercise_id),
            exercise_name: Some(period.exercise_name.clone()),
            remaining_seconds: period.remaining_seconds,
            total_seconds: period.total_seconds,
            display: format_time(period.remaining_seconds),
        }
    }

    /// Create an inactive timer state
    pub fn inactive() -> Self {
        Self {
            active: false,
            exercise_id: None,
            exercise_name: None,
            remaining_seconds: 0,
            total_seconds: 0,
            display: format_time(0),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::inactive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: u64, rest: u64) -> Exercise {
        Exercise::new(id, format!("exercise-{}", id), 3, rest)
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(9), "00:09");
        assert_eq!(format_time(75), "01:15");
        assert_eq!(format_time(3600), "60:00");
    }

    #[test]
    fn counts_down_one_second_per_tick_then_stops() {
        let mut timer = RestTimer::new();
        let generation = timer.start(&exercise(1, 3)).unwrap();
        assert_eq!(timer.snapshot().remaining_seconds, 3);

        assert_eq!(timer.tick(generation), TickOutcome::Ticked(2));
        assert_eq!(timer.tick(generation), TickOutcome::Ticked(1));
        assert_eq!(timer.tick(generation), TickOutcome::Finished);
        assert!(!timer.is_running());
        assert_eq!(timer.snapshot(), TimerState::inactive());

        assert_eq!(timer.tick(generation), TickOutcome::Stale);
    }

    #[test]
    fn starting_again_replaces_running_period() {
        let mut timer = RestTimer::new();
        let first = timer.start(&exercise(1, 30)).unwrap();
        timer.tick(first);
        let second = timer.start(&exercise(2, 10)).unwrap();

        assert!(second > first);
        assert_eq!(timer.tick(first), TickOutcome::Stale);
        let current = timer.current().unwrap();
        assert_eq!(current.exercise_id, 2);
        assert_eq!(current.remaining_seconds, 10);
    }

    #[test]
    fn zero_rest_leaves_timer_idle() {
        let mut timer = RestTimer::new();
        timer.start(&exercise(1, 30));
        assert_eq!(timer.start(&exercise(2, 0)), None);
        assert!(!timer.is_running());
    }

    #[test]
    fn cancel_for_only_touches_matching_exercise() {
        let mut timer = RestTimer::new();
        timer.start(&exercise(1, 30));
        assert!(timer.cancel_for(2).is_none());
        assert!(timer.is_resting_for(1));
        assert_eq!(timer.cancel_for(1).map(|p| p.exercise_id), Some(1));
        assert!(!timer.is_running());
    }

    #[test]
    fn active_snapshot_carries_display() {
        let mut timer = RestTimer::new();
        timer.start(&exercise(7, 90));
        let snapshot = timer.snapshot();
        assert!(snapshot.is_active());
        assert_eq!(snapshot.exercise_id, Some(7));
        assert_eq!(snapshot.exercise_name.as_deref(), Some("exercise-7"));
        assert_eq!(snapshot.total_seconds, 90);
        assert_eq!(snapshot.display, "01:30");
    }
}
