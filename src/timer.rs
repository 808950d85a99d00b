//! Countdown timer entities backed by the persisted store
//!
//! One generic [`Timer`] covers both budgets; [`TimerKind`] selects the
//! store keys, the limit-reached predicate, and the reset semantics.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::store::Store;

/// Which budget a timer tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Total screen time allowed per day, reset at local midnight
    Daily,
    /// Screen time allowed in one sitting, reset after the screen stays off
    Session,
}

impl TimerKind {
    /// Stable string id used in store keys and limit notices
    pub fn id(&self) -> &'static str {
        match self {
            TimerKind::Daily => "daily",
            TimerKind::Session => "session",
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A named countdown timer with a limit, current value, and running flag.
///
/// Holds no state of its own: every accessor reads the store, every mutator
/// writes it, so all components observe the same values.
#[derive(Debug, Clone)]
pub struct Timer {
    kind: TimerKind,
    store: Arc<Store>,
}

impl Timer {
    pub fn new(kind: TimerKind, store: Arc<Store>) -> Self {
        Self { kind, store }
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Remaining seconds, 0 when unset
    pub fn current_value(&self) -> i32 {
        self.store.get_int(&self.current_key()).unwrap_or(0)
    }

    /// Configured limit in seconds, 0 when unset
    pub fn limit(&self) -> i32 {
        self.store.get_int(&self.limit_key()).unwrap_or(0)
    }

    /// Whether the timer is counting down, false when unset
    pub fn is_running(&self) -> bool {
        self.store.get_bool(&self.running_key()).unwrap_or(false)
    }

    /// Set the configured limit. No bounds validation at this layer; that
    /// belongs to the configuration surface.
    pub fn set_limit(&self, value: i32) -> Result<(), String> {
        self.store.set_int(&self.limit_key(), value)
    }

    /// Overwrite the current value directly
    pub fn update_current_value(&self, value: i32) -> Result<(), String> {
        self.store.set_int(&self.current_key(), value)
    }

    pub fn set_running(&self, running: bool) -> Result<(), String> {
        self.store.set_bool(&self.running_key(), running)
    }

    /// Whether the budget is exhausted.
    ///
    /// The predicates differ per kind and are kept that way on purpose:
    /// Daily is exhausted exactly at zero, Session whenever the current
    /// value is at or below its limit.
    pub fn is_limit_reached(&self) -> bool {
        match self.kind {
            TimerKind::Daily => self.current_value() == 0,
            TimerKind::Session => self.current_value() <= self.limit(),
        }
    }

    /// Restore the timer to its boundary state: Daily back to its full
    /// limit, Session to zero and stopped.
    pub fn reset(&self) -> Result<(), String> {
        match self.kind {
            TimerKind::Daily => self.update_current_value(self.limit()),
            TimerKind::Session => {
                self.update_current_value(0)?;
                self.set_running(false)
            }
        }
    }

    fn current_key(&self) -> String {
        format!("{}_current", self.kind.id())
    }

    fn limit_key(&self) -> String {
        format!("{}_limit", self.kind.id())
    }

    fn running_key(&self) -> String {
        format!("{}_running", self.kind.id())
    }
}
