//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info};

use crate::{
    events::{self, ScreenEvent},
    state::AppState,
    store::KEY_CONFIG,
    tasks::{daily_reset, session_reset, tick},
};

use super::responses::{ApiResponse, ConfigureRequest, HealthResponse, StatusResponse};

/// Handle POST /screen-on - Resume both timers and disarm the session-reset alarm
pub async fn screen_on_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    state.record_event("screen-on");

    match events::handle_screen_event(&state, ScreenEvent::On) {
        Ok(()) => {
            info!("Screen-on endpoint called - timers resumed");
            Ok(Json(ApiResponse::running(
                "Screen on, timers resumed".to_string(),
                state.snapshot(),
            )))
        }
        Err(e) => {
            error!("Failed to handle screen-on: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /screen-off - Pause both timers and arm the session-reset alarm
pub async fn screen_off_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    state.record_event("screen-off");

    match events::handle_screen_event(&state, ScreenEvent::Off) {
        Ok(()) => {
            info!("Screen-off endpoint called - timers paused, session-reset alarm armed");
            Ok(Json(ApiResponse::paused(
                "Screen off, timers paused".to_string(),
                state.snapshot(),
            )))
        }
        Err(e) => {
            error!("Failed to handle screen-off: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /config - Save limits, complete first-time setup, and start
/// the tick coordinator and daily reset (both idempotent)
pub async fn configure_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigureRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if request.daily_limit < 0 || request.session_limit < 0 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    state.record_event("config");

    let result = apply_configuration(&state, &request);
    match result {
        Ok(()) => {
            tick::start(&state);
            daily_reset::schedule(&state);
            state.refresh_widget();

            info!(
                "Configuration saved: daily={}s, session={}s",
                request.daily_limit, request.session_limit
            );
            Ok(Json(ApiResponse::ok(
                "Configuration saved, timers started".to_string(),
                state.snapshot(),
            )))
        }
        Err(e) => {
            error!("Failed to save configuration: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn apply_configuration(state: &AppState, request: &ConfigureRequest) -> Result<(), String> {
    state.daily.set_limit(request.daily_limit)?;
    state.session.set_limit(request.session_limit)?;
    // Fresh budgets start full and counting
    state.daily.update_current_value(request.daily_limit)?;
    state.session.update_current_value(request.session_limit)?;
    state.pause_timers(false)?;
    state.store.set_bool(KEY_CONFIG, true)
}

/// Handle POST /reset - Widget removed: stop all schedulers and clear the store
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    state.record_event("reset");

    tick::stop(&state);
    daily_reset::stop(&state);

    if let Err(e) = session_reset::cancel(&state) {
        error!("Failed to cancel session-reset alarm: {}", e);
    }

    match state.store.reset() {
        Ok(()) => {
            state.refresh_widget();
            info!("Reset endpoint called - schedulers stopped, store cleared");
            Ok(Json(ApiResponse::ok(
                "Timers stopped and state cleared".to_string(),
                state.snapshot(),
            )))
        }
        Err(e) => {
            error!("Failed to clear store: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current timer and coordinator status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_event, last_event_time) = state.last_event();

    Json(StatusResponse {
        timers: state.snapshot(),
        configured: state.store.get_bool(KEY_CONFIG).unwrap_or(false),
        coordinator_active: state.tick.is_active(),
        session_alarm_scheduled: state.session_alarm.is_scheduled(),
        uptime: state.uptime(),
        port: state.port,
        host: state.host.clone(),
        last_event,
        last_event_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
