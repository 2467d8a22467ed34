//! Fitness Timer - A state-managed HTTP server for set-and-rest workouts
//!
//! This library tracks exercises with a target set count and rest duration,
//! records sets one at a time and runs a single cancellable rest countdown
//! between them.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::TrackerError;
pub use state::{AppState, Tracker};
pub use utils::signals::shutdown_signal;
