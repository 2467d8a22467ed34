//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, error};

use crate::{
    error::TrackerError,
    state::{AppState, ExerciseView, NewExercise, SetOutcome, TimerState},
};
use super::responses::{ApiResponse, ExerciseListResponse, HealthResponse, StatusResponse};

type ApiResult = Result<Json<ApiResponse>, StatusCode>;

/// Log a tracker error and turn it into a status code
fn reject(context: &str, e: TrackerError) -> StatusCode {
    let status = e.status_code();
    if status.is_server_error() {
        error!("{}: {}", context, e);
    } else {
        debug!("{}: {}", context, e);
    }
    status
}

/// Build a response around the current exercises and timer
fn respond<F>(state: &AppState, build: F, message: String) -> ApiResult
where
    F: FnOnce(String, Vec<ExerciseView>, TimerState) -> ApiResponse,
{
    let (exercises, timer) = state
        .snapshot()
        .map_err(|e| reject("Failed to read tracker", e))?;
    Ok(Json(build(message, exercises, timer)))
}

/// Handle GET /exercises - List exercises, newest first
pub async fn list_exercises_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExerciseListResponse>, StatusCode> {
    let (exercises, _) = state
        .snapshot()
        .map_err(|e| reject("Failed to read tracker", e))?;
    Ok(Json(ExerciseListResponse {
        count: exercises.len(),
        exercises,
    }))
}

/// Handle POST /exercises - Add an exercise; invalid input is ignored
pub async fn add_exercise_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewExercise>, JsonRejection>,
) -> ApiResult {
    // Malformed bodies and wrongly typed fields are ignored like any other bad submission
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            debug!("Ignoring unreadable add submission: {}", rejection.body_text());
            return respond(&state, ApiResponse::ignored, "Submission ignored".to_string());
        }
    };

    match state.add_exercise(&input) {
        Ok(exercise) => respond(&state, ApiResponse::ok, format!("Added {}", exercise.name)),
        Err(TrackerError::InvalidExercise(reason)) => {
            debug!("Ignoring add submission: {}", reason);
            respond(&state, ApiResponse::ignored, "Submission ignored".to_string())
        }
        Err(e) => Err(reject("Failed to add exercise", e)),
    }
}

/// Handle DELETE /exercises - Remove every exercise
pub async fn clear_exercises_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let removed = state
        .clear_exercises()
        .map_err(|e| reject("Failed to clear exercises", e))?;
    respond(&state, ApiResponse::ok, format!("Removed {} exercises", removed))
}

/// Handle DELETE /exercises/:id - Remove one exercise
pub async fn delete_exercise_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult {
    let exercise = state
        .remove_exercise(id)
        .map_err(|e| reject("Failed to delete exercise", e))?;
    respond(&state, ApiResponse::ok, format!("Deleted {}", exercise.name))
}

/// Handle POST /exercises/:id/complete-set - Record a set and start resting
pub async fn complete_set_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult {
    let outcome = state
        .complete_set(id)
        .map_err(|e| reject("Failed to complete set", e))?;

    match outcome {
        SetOutcome::Resting { exercise, .. } => respond(
            &state,
            ApiResponse::resting,
            format!("Set done for {}, resting {}s", exercise.name, exercise.rest),
        ),
        SetOutcome::NoRest { exercise } => respond(
            &state,
            ApiResponse::idle,
            format!("Set done for {}", exercise.name),
        ),
        SetOutcome::AlreadyCompleted { exercise } => respond(
            &state,
            ApiResponse::ignored,
            format!("{} is already completed", exercise.name),
        ),
        SetOutcome::RestInProgress { exercise } => respond(
            &state,
            ApiResponse::ignored,
            format!("{} is still resting", exercise.name),
        ),
    }
}

/// Handle GET /timer - Return the rest timer snapshot
pub async fn timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerState>, StatusCode> {
    state
        .get_timer_state()
        .map(Json)
        .map_err(|e| reject("Failed to get timer state", e))
}

/// Handle POST /timer/skip - Skip the running rest period
pub async fn skip_timer_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    match state.skip_rest().map_err(|e| reject("Failed to skip rest", e))? {
        Some(period) => respond(
            &state,
            ApiResponse::idle,
            format!("Skipped rest for {}", period.exercise_name),
        ),
        None => respond(&state, ApiResponse::ignored, "No rest running".to_string()),
    }
}

/// Handle GET /status - Return exercises, timer and server info
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let (exercises, timer) = state
        .snapshot()
        .map_err(|e| reject("Failed to read tracker", e))?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        count: exercises.len(),
        exercises,
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        tick_millis: u64::try_from(state.tick_period.as_millis()).unwrap_or(u64::MAX),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
