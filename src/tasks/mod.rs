//! Background tasks module
//!
//! This module contains the three schedulers that converge on the shared
//! store: the 1 Hz tick, the one-shot session-reset alarm, and the
//! midnight daily reset.

pub mod daily_reset;
pub mod session_reset;
pub mod tick;

// Re-export task handles held by AppState
pub use daily_reset::DailyResetScheduler;
pub use session_reset::SessionResetAlarm;
pub use tick::TickCoordinator;
