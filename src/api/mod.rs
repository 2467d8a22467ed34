//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod events;
pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use events::timer_events_handler;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/exercises",
            get(list_exercises_handler)
                .post(add_exercise_handler)
                .delete(clear_exercises_handler),
        )
        .route("/exercises/:id", delete(delete_exercise_handler))
        .route("/exercises/:id/complete-set", post(complete_set_handler))
        .route("/timer", get(timer_handler))
        .route("/timer/skip", post(skip_timer_handler))
        .route("/timer/events", get(timer_events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
