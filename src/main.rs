//! Fitness Timer - A state-managed HTTP server for set-and-rest workouts
//!
//! This is the main entry point for the fitness-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use fitness_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("fitness_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting fitness-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms",
          config.host, config.port, config.tick_millis);

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), config.tick_period()));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /exercises                   - List exercises");
    info!("  POST   /exercises                   - Add an exercise");
    info!("  DELETE /exercises                   - Remove all exercises");
    info!("  DELETE /exercises/:id               - Remove an exercise");
    info!("  POST   /exercises/:id/complete-set  - Complete a set and rest");
    info!("  GET    /timer                       - Rest timer snapshot");
    info!("  POST   /timer/skip                  - Skip the rest");
    info!("  GET    /timer/events                - Rest timer event stream");
    info!("  GET    /status                      - Full status");
    info!("  GET    /health                      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to listen for signals: {}", e),
            }
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
