//! State management module
//!
//! This module contains the exercise tracker, the rest timer state machine
//! and the shared application state wrapped around them.

pub mod app_state;
pub mod exercise;
pub mod timer_state;
pub mod tracker;

// Re-export main types
pub use app_state::AppState;
pub use exercise::{Exercise, ExerciseView, FormNumber, NewExercise, ValidExercise};
pub use timer_state::{format_time, RestPeriod, RestTimer, TickOutcome, TimerState};
pub use tracker::{SetOutcome, Tracker};
