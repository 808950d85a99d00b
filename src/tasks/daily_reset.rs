//! Daily-reset background task
//!
//! Restores the Daily timer to its configured limit at the next local
//! midnight and every 24 hours thereafter.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::{DateTime, Local, TimeZone};
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, error, info};

use crate::state::AppState;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Handle for the recurring midnight reset task
#[derive(Debug, Default)]
pub struct DailyResetScheduler {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl DailyResetScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the reset task is currently scheduled
    pub fn is_scheduled(&self) -> bool {
        self.handle
            .lock()
            .map(|h| h.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }
}

/// Schedule the midnight reset task. An already-running task is kept, so
/// repeated configuration saves never stack duplicate resets. Returns
/// whether a new task was scheduled.
pub fn schedule(state: &Arc<AppState>) -> bool {
    let mut handle = match state.daily_scheduler.handle.lock() {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to lock daily scheduler handle: {}", e);
            return false;
        }
    };

    if handle.as_ref().is_some_and(|h| !h.is_finished()) {
        debug!("Daily reset task already scheduled, keeping it");
        return false;
    }

    let task_state = Arc::clone(state);
    *handle = Some(tokio::spawn(reset_loop(task_state)));
    true
}

/// Cancel the recurring reset task. No-op when nothing is scheduled.
pub fn stop(state: &AppState) {
    let taken = state
        .daily_scheduler
        .handle
        .lock()
        .ok()
        .and_then(|mut handle| handle.take());

    if let Some(handle) = taken {
        handle.abort();
        info!("Daily reset task stopped");
    }
}

async fn reset_loop(state: Arc<AppState>) {
    let initial = until_next_midnight(Local::now());
    info!(
        "Daily reset scheduled, first fire in {}s, then every 24h",
        initial.as_secs()
    );
    sleep(initial).await;

    loop {
        if let Err(e) = fire(&state) {
            error!("Daily reset failed: {}", e);
        }
        sleep(DAY).await;
    }
}

/// Reset the Daily timer to its configured limit regardless of prior value
pub fn fire(state: &AppState) -> Result<(), String> {
    info!("Daily reset fired, restoring daily timer to its limit");
    state.daily.reset()?;
    state.refresh_widget();
    Ok(())
}

/// Time remaining until the next local midnight. Falls back to a full day
/// on calendar edge cases (end of representable range, skipped midnights).
pub fn until_next_midnight(now: DateTime<Local>) -> Duration {
    let next_midnight = now
        .date_naive()
        .succ_opt()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest());

    match next_midnight {
        Some(midnight) => (midnight - now).to_std().unwrap_or(DAY),
        None => DAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use chrono::Timelike;
    use tempfile::TempDir;

    fn test_state(dir: &TempDir) -> Arc<AppState> {
        let store = Arc::new(Store::open(dir.path().join("store.json")).unwrap());
        Arc::new(AppState::new(
            store,
            "127.0.0.1".to_string(),
            0,
            Duration::from_secs(60),
        ))
    }

    #[test]
    fn fire_restores_limit_regardless_of_prior_value() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state.daily.set_limit(21600).unwrap();
        for prior in [0, 5, 21600, 99999] {
            state.daily.update_current_value(prior).unwrap();
            fire(&state).unwrap();
            assert_eq!(state.daily.current_value(), 21600);
        }
    }

    #[test]
    fn until_next_midnight_is_at_most_a_day() {
        let now = Local::now();
        let delay = until_next_midnight(now);
        assert!(delay <= DAY);
        assert!(delay > Duration::ZERO);
    }

    #[test]
    fn until_next_midnight_lands_on_midnight() {
        let now = Local::now();
        let delay = until_next_midnight(now);
        let fire_at = now + chrono::Duration::from_std(delay).unwrap();

        assert_eq!(fire_at.hour(), 0);
        assert_eq!(fire_at.minute(), 0);
        assert_eq!(fire_at.second(), 0);
    }

    #[tokio::test]
    async fn repeated_schedule_keeps_existing_task() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        assert!(schedule(&state));
        assert!(state.daily_scheduler.is_scheduled());
        // Second configuration save keeps the existing task
        assert!(!schedule(&state));

        stop(&state);
        assert!(!state.daily_scheduler.is_scheduled());
    }
}
