//! Snapshot structures consumed by the widget rendering layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Timer;

/// Display values for one timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub current_value: i32,
    pub limit: i32,
    pub running: bool,
}

impl TimerSnapshot {
    /// Capture the timer's store-backed values
    pub fn of(timer: &Timer) -> Self {
        Self {
            current_value: timer.current_value(),
            limit: timer.limit(),
            running: timer.is_running(),
        }
    }

    fn empty() -> Self {
        Self {
            current_value: 0,
            limit: 0,
            running: false,
        }
    }
}

/// Display values for both timers, published on the watch channel after
/// every tick and reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetSnapshot {
    pub daily: TimerSnapshot,
    pub session: TimerSnapshot,
    pub updated_at: DateTime<Utc>,
}

impl WidgetSnapshot {
    /// Initial snapshot before the first refresh
    pub fn empty() -> Self {
        Self {
            daily: TimerSnapshot::empty(),
            session: TimerSnapshot::empty(),
            updated_at: Utc::now(),
        }
    }
}
