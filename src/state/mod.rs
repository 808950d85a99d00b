//! State management module
//!
//! This module contains all state-related structures and their management logic.

pub mod app_state;
pub mod widget_state;

// Re-export main types
pub use app_state::AppState;
pub use widget_state::{TimerSnapshot, WidgetSnapshot};
