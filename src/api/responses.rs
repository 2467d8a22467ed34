//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{ExerciseView, TimerState};

/// API response structure for action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub count: usize,
    pub exercises: Vec<ExerciseView>,
    pub timer: TimerState,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, exercises: Vec<ExerciseView>, timer: TimerState) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            count: exercises.len(),
            exercises,
            timer,
        }
    }

    /// The action changed state
    pub fn ok(message: String, exercises: Vec<ExerciseView>, timer: TimerState) -> Self {
        Self::new("ok", message, exercises, timer)
    }

    /// The action was a no-op, e.g. an invalid add submission
    pub fn ignored(message: String, exercises: Vec<ExerciseView>, timer: TimerState) -> Self {
        Self::new("ignored", message, exercises, timer)
    }

    /// A set was recorded and a rest period is running
    pub fn resting(message: String, exercises: Vec<ExerciseView>, timer: TimerState) -> Self {
        Self::new("resting", message, exercises, timer)
    }

    /// The timer is idle after the action
    pub fn idle(message: String, exercises: Vec<ExerciseView>, timer: TimerState) -> Self {
        Self::new("idle", message, exercises, timer)
    }
}

/// Exercise list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseListResponse {
    pub count: usize,
    pub exercises: Vec<ExerciseView>,
}

/// Status response with timer and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub count: usize,
    pub exercises: Vec<ExerciseView>,
    pub timer: TimerState,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub tick_millis: u64,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
