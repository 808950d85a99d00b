//! screentimed - A state-managed HTTP service for screen-time budgets
//!
//! This library tracks two countdown timers (a daily budget and a
//! per-session budget), decrements them once per second while the screen is
//! on, emits a limit notice when either reaches its boundary, and persists
//! all state across process death and reboot.

pub mod api;
pub mod config;
pub mod events;
pub mod notify;
pub mod state;
pub mod store;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use store::Store;
pub use timer::{Timer, TimerKind};
pub use utils::signals::shutdown_signal;
