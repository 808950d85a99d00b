//! screentimed - A state-managed HTTP service for screen-time budgets
//!
//! This is the main entry point for the screentimed application.

use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing::info;

use screentimed::{
    api::create_router,
    config::Config,
    events,
    notify::limit_notice_task,
    state::AppState,
    store::{Store, KEY_CONFIG},
    tasks::{daily_reset, tick},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "screentimed={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting screentimed v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, session_reset_delay={}s",
        config.host, config.port, config.session_reset_delay
    );

    let store_path = config.store_path()?;
    info!("Opening store at {:?}", store_path);
    let store = Arc::new(Store::open(store_path)?);

    // Create application state around the injected store handle
    let state = Arc::new(AppState::new(
        store,
        config.host.clone(),
        config.port,
        Duration::from_secs(config.session_reset_delay),
    ));

    // Start the overlay listener for limit notices
    let notice_state = Arc::clone(&state);
    tokio::spawn(async move {
        limit_notice_task(notice_state).await;
    });

    // Setup already completed before this launch: resume ticking and the
    // midnight reset without waiting for another configuration save
    if state.store.get_bool(KEY_CONFIG).unwrap_or(false) {
        info!("Configuration flag set, resuming tick coordinator and daily reset");
        tick::start(&state);
        daily_reset::schedule(&state);
    }

    // Boot signal: reschedule the session-reset alarm if it was armed
    match events::handle_boot(&state) {
        Ok(true) => info!("Session-reset alarm rescheduled after boot"),
        Ok(false) => {}
        Err(e) => tracing::warn!("Failed to reschedule session-reset alarm: {}", e),
    }

    state.refresh_widget();

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /screen-on  - Resume timers, disarm session-reset alarm");
    info!("  POST /screen-off - Pause timers, arm session-reset alarm");
    info!("  POST /config     - Save limits and start the coordinator");
    info!("  POST /reset      - Stop schedulers and clear persisted state");
    info!("  GET  /status     - Check timers and coordinator status");
    info!("  GET  /health     - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
