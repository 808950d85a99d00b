//! Session-reset alarm background task
//!
//! A one-shot wake-up armed when the screen goes off. If it fires before
//! the screen comes back on, the session timer is reset. The armed flag and
//! the deadline are persisted so a reboot can reschedule the alarm with the
//! elapsed downtime compensated.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use chrono::Utc;
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, error, info};

use crate::{
    state::AppState,
    store::{KEY_ALARM_DEADLINE, KEY_ALARM_WAS_SET},
};

/// Handle for the pending session-reset alarm, if any
#[derive(Debug, Default)]
pub struct SessionResetAlarm {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SessionResetAlarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an alarm is currently pending
    pub fn is_scheduled(&self) -> bool {
        self.handle
            .lock()
            .map(|h| h.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }
}

/// Arm the alarm to fire after the configured delay
pub fn schedule(state: &Arc<AppState>) -> Result<(), String> {
    schedule_in(state, state.session_reset_delay)
}

/// Arm the alarm to fire after an explicit delay, replacing any pending
/// alarm. The deadline and armed flag are persisted before the task is
/// spawned so a crash between the two cannot lose the alarm.
pub fn schedule_in(state: &Arc<AppState>, delay: Duration) -> Result<(), String> {
    let deadline = Utc::now().timestamp_millis() + delay.as_millis() as i64;
    state.store.set_long(KEY_ALARM_DEADLINE, deadline)?;
    state.store.set_bool(KEY_ALARM_WAS_SET, true)?;

    let mut handle = state
        .session_alarm
        .handle
        .lock()
        .map_err(|e| format!("Failed to lock session alarm handle: {}", e))?;

    if let Some(pending) = handle.take() {
        pending.abort();
        debug!("Replaced pending session-reset alarm");
    }

    let task_state = Arc::clone(state);
    *handle = Some(tokio::spawn(async move {
        sleep(delay).await;
        if let Err(e) = fire(&task_state) {
            error!("Session-reset alarm failed to fire: {}", e);
        }
    }));

    info!("Session-reset alarm set for {}s from now", delay.as_secs());
    Ok(())
}

/// Disarm the pending alarm and clear the armed flag. No-op when nothing
/// is scheduled.
pub fn cancel(state: &AppState) -> Result<(), String> {
    let taken = state
        .session_alarm
        .handle
        .lock()
        .map_err(|e| format!("Failed to lock session alarm handle: {}", e))?
        .take();

    if let Some(pending) = taken {
        pending.abort();
        info!("Session-reset alarm canceled");
    }

    state.store.set_bool(KEY_ALARM_WAS_SET, false)
}

/// Reset the session timer and clear the armed flag
pub fn fire(state: &AppState) -> Result<(), String> {
    info!("Session-reset alarm fired, resetting session timer");
    state.session.reset()?;
    state.store.set_bool(KEY_ALARM_WAS_SET, false)?;
    state.refresh_widget();
    Ok(())
}

/// Reschedule the alarm after a reboot if it was armed before shutdown.
/// Scheduled wake-ups do not survive a reboot, so the persisted deadline
/// is used to make up the remaining delay; an overdue alarm fires promptly.
/// Returns whether an alarm was rescheduled.
pub fn reschedule_after_boot(state: &Arc<AppState>) -> Result<bool, String> {
    if !state.store.get_bool(KEY_ALARM_WAS_SET).unwrap_or(false) {
        return Ok(false);
    }

    let remaining = match state.store.get_long(KEY_ALARM_DEADLINE) {
        Some(deadline) => {
            let millis = deadline.saturating_sub(Utc::now().timestamp_millis());
            Duration::from_millis(millis.max(0) as u64)
        }
        // No recorded deadline, fall back to the full delay
        None => state.session_reset_delay,
    };

    info!(
        "Rescheduling session-reset alarm after boot, {}s remaining",
        remaining.as_secs()
    );
    schedule_in(state, remaining)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
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

    #[tokio::test]
    async fn schedule_persists_armed_flag_and_deadline() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        schedule(&state).unwrap();

        assert!(state.session_alarm.is_scheduled());
        assert_eq!(state.store.get_bool(KEY_ALARM_WAS_SET), Some(true));
        let deadline = state.store.get_long(KEY_ALARM_DEADLINE).unwrap();
        assert!(deadline > Utc::now().timestamp_millis());
    }

    #[tokio::test]
    async fn cancel_clears_flag_and_pending_alarm() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        schedule(&state).unwrap();
        cancel(&state).unwrap();

        assert!(!state.session_alarm.is_scheduled());
        assert_eq!(state.store.get_bool(KEY_ALARM_WAS_SET), Some(false));
    }

    #[tokio::test]
    async fn cancel_without_schedule_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        cancel(&state).unwrap();
        assert_eq!(state.store.get_bool(KEY_ALARM_WAS_SET), Some(false));
    }

    #[tokio::test]
    async fn fire_resets_session_and_clears_flag() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state.session.set_limit(3600).unwrap();
        state.session.update_current_value(1800).unwrap();
        state.session.set_running(true).unwrap();
        state.store.set_bool(KEY_ALARM_WAS_SET, true).unwrap();

        fire(&state).unwrap();

        assert_eq!(state.session.current_value(), 0);
        assert!(!state.session.is_running());
        assert_eq!(state.store.get_bool(KEY_ALARM_WAS_SET), Some(false));
    }

    #[tokio::test]
    async fn armed_flag_reschedules_exactly_once_at_boot() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let future = Utc::now().timestamp_millis() + 45_000;
        state.store.set_bool(KEY_ALARM_WAS_SET, true).unwrap();
        state.store.set_long(KEY_ALARM_DEADLINE, future).unwrap();

        assert!(reschedule_after_boot(&state).unwrap());
        assert!(state.session_alarm.is_scheduled());
    }

    #[tokio::test]
    async fn unarmed_flag_does_not_reschedule_at_boot() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        assert!(!reschedule_after_boot(&state).unwrap());
        assert!(!state.session_alarm.is_scheduled());
    }

    #[tokio::test]
    async fn overdue_deadline_fires_promptly() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state.session.update_current_value(500).unwrap();
        state.store.set_bool(KEY_ALARM_WAS_SET, true).unwrap();
        let past = Utc::now().timestamp_millis() - 10_000;
        state.store.set_long(KEY_ALARM_DEADLINE, past).unwrap();

        assert!(reschedule_after_boot(&state).unwrap());

        // Zero remaining delay, the reset lands on the next scheduler turn
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(state.session.current_value(), 0);
        assert_eq!(state.store.get_bool(KEY_ALARM_WAS_SET), Some(false));
    }
}
