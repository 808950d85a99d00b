//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::WidgetSnapshot;

/// API response structure for signal and configuration endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timers: WidgetSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timers: WidgetSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timers,
        }
    }

    /// Create a response for resumed timers
    pub fn running(message: String, timers: WidgetSnapshot) -> Self {
        Self::new("running".to_string(), message, timers)
    }

    /// Create a response for paused timers
    pub fn paused(message: String, timers: WidgetSnapshot) -> Self {
        Self::new("paused".to_string(), message, timers)
    }

    /// Create an ok response
    pub fn ok(message: String, timers: WidgetSnapshot) -> Self {
        Self::new("ok".to_string(), message, timers)
    }
}

/// Configuration request written by the configuration UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureRequest {
    /// Daily budget in seconds
    pub daily_limit: i32,
    /// Session budget in seconds
    pub session_limit: i32,
}

/// Enhanced status response with coordinator information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: WidgetSnapshot,
    pub configured: bool,
    pub coordinator_active: bool,
    pub session_alarm_scheduled: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_event: Option<String>,
    pub last_event_time: Option<DateTime<Utc>>,
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
