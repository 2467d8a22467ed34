//! The tracker controller: exercise list plus rest timer

use tracing::debug;

use super::{Exercise, ExerciseView, NewExercise, RestPeriod, RestTimer, TickOutcome, TimerState};
use crate::error::TrackerError;

/// What happened when a set was marked complete
#[derive(Debug, Clone, PartialEq)]
pub enum SetOutcome {
    /// Set recorded and a rest period started
    Resting { exercise: Exercise, generation: u64 },
    /// Set recorded; the exercise has no rest so the timer is idle
    NoRest { exercise: Exercise },
    /// Nothing to do, every set is already done
    AlreadyCompleted { exercise: Exercise },
    /// Nothing done, this exercise is still resting
    RestInProgress { exercise: Exercise },
}

impl SetOutcome {
    pub fn exercise(&self) -> &Exercise {
        match self {
            SetOutcome::Resting { exercise, .. }
            | SetOutcome::NoRest { exercise }
            | SetOutcome::AlreadyCompleted { exercise }
            | SetOutcome::RestInProgress { exercise } => exercise,
        }
    }

    /// Whether a set was actually recorded
    pub fn recorded(&self) -> bool {
        matches!(self, SetOutcome::Resting { .. } | SetOutcome::NoRest { .. })
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            SetOutcome::Resting { generation, .. } => Some(*generation),
            _ => None,
        }
    }
}

/// Owns every exercise and the single rest timer.
///
/// Exercises are kept newest first. Ids come from a counter and are never
/// reused.
#[derive(Debug, Clone)]
pub struct Tracker {
    exercises: Vec<Exercise>,
    next_id: u64,
    timer: RestTimer,
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            exercises: Vec::new(),
            next_id: 1,
            timer: RestTimer::new(),
        }
    }

    /// Validate the submission and put the new exercise at the head of the list
    pub fn add(&mut self, input: &NewExercise) -> Result<Exercise, TrackerError> {
        let valid = input.validate()?;
        let exercise = Exercise::new(self.next_id, valid.name, valid.total_sets, valid.rest);
        self.next_id += 1;
        self.exercises.insert(0, exercise.clone());
        debug!("Added exercise {} ({})", exercise.id, exercise.name);
        Ok(exercise)
    }

    /// Delete an exercise, stopping its rest period if it owns the timer.
    ///
    /// Returns the removed exercise and the cancelled period, if there was one.
    pub fn remove(&mut self, id: u64) -> Result<(Exercise, Option<RestPeriod>), TrackerError> {
        let index = self.position(id)?;
        let cancelled = self.timer.cancel_for(id);
        let exercise = self.exercises.remove(index);
        debug!("Removed exercise {} ({})", exercise.id, exercise.name);
        Ok((exercise, cancelled))
    }

    /// Mark one set of `id` done and start its rest period
    pub fn complete_set(&mut self, id: u64) -> Result<SetOutcome, TrackerError> {
        let index = self.position(id)?;
        if self.exercises[index].completed {
            return Ok(SetOutcome::AlreadyCompleted {
                exercise: self.exercises[index].clone(),
            });
        }
        if self.timer.is_resting_for(id) {
            return Ok(SetOutcome::RestInProgress {
                exercise: self.exercises[index].clone(),
            });
        }

        let exercise = &mut self.exercises[index];
        exercise.complete_set();
        let exercise = exercise.clone();

        match self.timer.start(&exercise) {
            Some(generation) => Ok(SetOutcome::Resting { exercise, generation }),
            None => Ok(SetOutcome::NoRest { exercise }),
        }
    }

    /// Stop the current rest period early
    pub fn skip_rest(&mut self) -> Option<RestPeriod> {
        self.timer.cancel()
    }

    /// Feed one countdown tick for the period tagged `generation`
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        self.timer.tick(generation)
    }

    /// Remove every exercise and stop the timer. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        self.timer.cancel();
        let removed = self.exercises.len();
        self.exercises.clear();
        removed
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn get(&self, id: u64) -> Option<&Exercise> {
        self.exercises.iter().find(|exercise| exercise.id == id)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn timer(&self) -> &RestTimer {
        &self.timer
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.snapshot()
    }

    /// Exercises with their derived display fields, newest first
    pub fn views(&self) -> Vec<ExerciseView> {
        self.exercises
            .iter()
            .map(|exercise| ExerciseView::new(exercise, self.timer.is_resting_for(exercise.id)))
            .collect()
    }

    fn position(&self, id: u64) -> Result<usize, TrackerError> {
        self.exercises
            .iter()
            .position(|exercise| exercise.id == id)
            .ok_or(TrackerError::NotFound(id))
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}
