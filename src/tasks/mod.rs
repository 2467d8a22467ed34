//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod rest_countdown;

// Re-export main types
pub use rest_countdown::RestCountdown;
