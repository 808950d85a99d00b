//! Tick coordinator background task
//!
//! Fires once per second while active, decrementing every running timer and
//! publishing limit notices and widget snapshots. Idle until [`start`] is
//! called; [`start`] while active is a no-op, [`stop`] cancels pending ticks.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{task::JoinHandle, time};
use tracing::{debug, error, info};

use crate::{
    notify::LimitNotice,
    state::AppState,
    store::KEY_CONFIG,
    timer::TimerKind,
};

/// Handle for the 1 Hz tick task, Idle until started.
///
/// The `notified` latches keep a timer parked at its boundary from spamming
/// the overlay: a notice fires on the transition into the limit-reached
/// state and re-arms once the predicate turns false again.
#[derive(Debug, Default)]
pub struct TickCoordinator {
    handle: Mutex<Option<JoinHandle<()>>>,
    notified_daily: AtomicBool,
    notified_session: AtomicBool,
}

impl TickCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the tick task is currently scheduled
    pub fn is_active(&self) -> bool {
        self.handle
            .lock()
            .map(|h| h.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    fn latch(&self, kind: TimerKind) -> &AtomicBool {
        match kind {
            TimerKind::Daily => &self.notified_daily,
            TimerKind::Session => &self.notified_session,
        }
    }
}

/// Transition the coordinator from Idle to Active. Returns false without
/// spawning a second task when already Active.
pub fn start(state: &Arc<AppState>) -> bool {
    let mut handle = match state.tick.handle.lock() {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to lock tick coordinator handle: {}", e);
            return false;
        }
    };

    if handle.as_ref().is_some_and(|h| !h.is_finished()) {
        debug!("Tick coordinator already active, start ignored");
        return false;
    }

    info!("Starting tick coordinator");
    let task_state = Arc::clone(state);
    *handle = Some(tokio::spawn(tick_loop(task_state)));
    true
}

/// Cancel all pending ticks and return the coordinator to Idle. No-op when
/// already Idle.
pub fn stop(state: &AppState) {
    let taken = state
        .tick
        .handle
        .lock()
        .ok()
        .and_then(|mut handle| handle.take());

    if let Some(handle) = taken {
        handle.abort();
        info!("Tick coordinator stopped");
    }
}

async fn tick_loop(state: Arc<AppState>) {
    // First decrement lands a full second after start
    let mut interval = time::interval_at(
        time::Instant::now() + Duration::from_secs(1),
        Duration::from_secs(1),
    );

    loop {
        interval.tick().await;

        // A failed tick is logged and swallowed; the next one stays on schedule
        if let Err(e) = tick_once(&state) {
            error!("Tick failed: {}", e);
        }
    }
}

/// One tick: decrement running timers, check limits, refresh the widget.
/// Inactive until the user has completed first-time setup.
pub fn tick_once(state: &AppState) -> Result<(), String> {
    if !state.store.get_bool(KEY_CONFIG).unwrap_or(false) {
        return Ok(());
    }

    advance(state, TimerKind::Daily)?;
    advance(state, TimerKind::Session)?;
    state.refresh_widget();
    Ok(())
}

fn advance(state: &AppState, kind: TimerKind) -> Result<(), String> {
    let timer = state.timer(kind);

    if !timer.is_running() {
        return Ok(());
    }

    // Decrements saturate at zero; negative excursions are disallowed
    let current = timer.current_value();
    if current > 0 {
        timer.update_current_value(current - 1)?;
    }

    let latch = state.tick.latch(kind);
    if timer.is_limit_reached() {
        if !latch.swap(true, Ordering::Relaxed) {
            info!("{} limit reached, notifying overlay", kind);
            state.send_notice(LimitNotice::now(kind));
        }
    } else {
        latch.store(false, Ordering::Relaxed);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use tempfile::TempDir;

    fn test_state(dir: &TempDir) -> Arc<AppState> {
        let store = Arc::new(Store::open(dir.path().join("store.json")).unwrap());
        store.set_bool(KEY_CONFIG, true).unwrap();
        Arc::new(AppState::new(
            store,
            "127.0.0.1".to_string(),
            0,
            Duration::from_secs(60),
        ))
    }

    #[test]
    fn five_ticks_decrement_running_daily_by_five() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state.daily.set_limit(3600).unwrap();
        state.daily.update_current_value(3600).unwrap();
        state.daily.set_running(true).unwrap();

        for _ in 0..5 {
            tick_once(&state).unwrap();
        }

        assert_eq!(state.daily.current_value(), 3595);
    }

    #[test]
    fn paused_timers_are_not_decremented() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state.daily.update_current_value(100).unwrap();
        state.session.update_current_value(100).unwrap();
        state.pause_timers(true).unwrap();

        tick_once(&state).unwrap();

        assert_eq!(state.daily.current_value(), 100);
        assert_eq!(state.session.current_value(), 100);
    }

    #[test]
    fn ticks_are_inert_before_first_time_setup() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        state.store.set_bool(KEY_CONFIG, false).unwrap();

        state.daily.update_current_value(50).unwrap();
        state.daily.set_running(true).unwrap();

        tick_once(&state).unwrap();
        assert_eq!(state.daily.current_value(), 50);
    }

    #[test]
    fn daily_does_not_go_negative() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state.daily.update_current_value(1).unwrap();
        state.daily.set_running(true).unwrap();

        for _ in 0..3 {
            tick_once(&state).unwrap();
        }

        assert_eq!(state.daily.current_value(), 0);
    }

    #[test]
    fn daily_reaching_zero_notifies_once() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let mut notice_rx = state.notice_tx.subscribe();

        state.daily.set_limit(3600).unwrap();
        state.daily.update_current_value(2).unwrap();
        state.daily.set_running(true).unwrap();

        for _ in 0..4 {
            tick_once(&state).unwrap();
        }

        let notice = notice_rx.try_recv().unwrap();
        assert_eq!(notice.kind, TimerKind::Daily);
        // Parked at zero across further ticks, no repeat notice
        assert!(notice_rx.try_recv().is_err());
    }

    #[test]
    fn session_at_zero_notifies_with_session_kind() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let mut notice_rx = state.notice_tx.subscribe();

        state.session.set_limit(3600).unwrap();
        state.session.update_current_value(0).unwrap();
        state.session.set_running(true).unwrap();

        assert!(state.session.is_limit_reached());
        tick_once(&state).unwrap();

        let notice = notice_rx.try_recv().unwrap();
        assert_eq!(notice.kind, TimerKind::Session);
        assert_eq!(notice.kind.id(), "session");
    }

    #[test]
    fn notice_rearms_after_timer_leaves_limit() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let mut notice_rx = state.notice_tx.subscribe();

        state.daily.set_limit(3600).unwrap();
        state.daily.update_current_value(1).unwrap();
        state.daily.set_running(true).unwrap();

        tick_once(&state).unwrap();
        assert_eq!(notice_rx.try_recv().unwrap().kind, TimerKind::Daily);

        // Daily reset pulls the value back above zero, re-arming the notice
        state.daily.reset().unwrap();
        tick_once(&state).unwrap();
        assert!(notice_rx.try_recv().is_err());

        state.daily.update_current_value(1).unwrap();
        tick_once(&state).unwrap();
        assert_eq!(notice_rx.try_recv().unwrap().kind, TimerKind::Daily);
    }

    #[test]
    fn tick_refreshes_widget_snapshot() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let widget_rx = state.widget_tx.subscribe();

        state.session.update_current_value(10).unwrap();
        state.session.set_running(true).unwrap();

        tick_once(&state).unwrap();
        assert_eq!(widget_rx.borrow().session.current_value, 9);
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        assert!(start(&state));
        assert!(state.tick.is_active());
        // Second start must not spawn a second tick loop
        assert!(!start(&state));

        stop(&state);
        assert!(!state.tick.is_active());
    }

    #[tokio::test]
    async fn stop_without_start_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        stop(&state);
        assert!(!state.tick.is_active());
    }
}
