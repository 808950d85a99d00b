//! Main application state shared by the API, the tick coordinator, and the
//! reset schedulers

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::warn;

use super::{TimerSnapshot, WidgetSnapshot};
use crate::{
    notify::LimitNotice,
    store::Store,
    tasks::{DailyResetScheduler, SessionResetAlarm, TickCoordinator},
    timer::{Timer, TimerKind},
};

/// Shared state: the injected store handle, the two timer entities bound to
/// it, the coordinator/scheduler handles, and the channels collaborators
/// subscribe to
#[derive(Debug)]
pub struct AppState {
    /// Persisted key-value store, the single source of truth
    pub store: Arc<Store>,
    pub daily: Timer,
    pub session: Timer,
    /// Delay before a screen-off period resets the session timer
    pub session_reset_delay: Duration,
    /// Task handles
    pub tick: TickCoordinator,
    pub session_alarm: SessionResetAlarm,
    pub daily_scheduler: DailyResetScheduler,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last event tracking
    pub last_event: Arc<Mutex<Option<String>>>,
    pub last_event_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for limit notices (the overlay collaborator subscribes)
    pub notice_tx: broadcast::Sender<LimitNotice>,
    /// Channel for widget snapshot refreshes
    pub widget_tx: watch::Sender<WidgetSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _widget_rx: watch::Receiver<WidgetSnapshot>,
}

impl AppState {
    /// Create a new AppState around an opened store handle
    pub fn new(store: Arc<Store>, host: String, port: u16, session_reset_delay: Duration) -> Self {
        let (notice_tx, _) = broadcast::channel(16);
        let (widget_tx, widget_rx) = watch::channel(WidgetSnapshot::empty());

        Self {
            daily: Timer::new(TimerKind::Daily, Arc::clone(&store)),
            session: Timer::new(TimerKind::Session, Arc::clone(&store)),
            store,
            session_reset_delay,
            tick: TickCoordinator::new(),
            session_alarm: SessionResetAlarm::new(),
            daily_scheduler: DailyResetScheduler::new(),
            start_time: Instant::now(),
            port,
            host,
            last_event: Arc::new(Mutex::new(None)),
            last_event_time: Arc::new(Mutex::new(None)),
            notice_tx,
            widget_tx,
            _widget_rx: widget_rx,
        }
    }

    /// Get the timer entity for a kind
    pub fn timer(&self, kind: TimerKind) -> &Timer {
        match kind {
            TimerKind::Daily => &self.daily,
            TimerKind::Session => &self.session,
        }
    }

    /// Pause (`true`) or resume (`false`) both timers
    pub fn pause_timers(&self, paused: bool) -> Result<(), String> {
        self.daily.set_running(!paused)?;
        self.session.set_running(!paused)
    }

    /// Capture current display values for both timers
    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            daily: TimerSnapshot::of(&self.daily),
            session: TimerSnapshot::of(&self.session),
            updated_at: Utc::now(),
        }
    }

    /// Push a fresh snapshot to the widget rendering layer
    pub fn refresh_widget(&self) {
        if let Err(e) = self.widget_tx.send(self.snapshot()) {
            warn!("Failed to publish widget snapshot: {}", e);
        }
    }

    /// Send a limit notice to the overlay collaborator. A missing
    /// subscriber is not an error; the notice is simply dropped.
    pub fn send_notice(&self, notice: LimitNotice) {
        let _ = self.notice_tx.send(notice);
    }

    /// Record the last external event for the status endpoint
    pub fn record_event(&self, event: &str) {
        if let Ok(mut last) = self.last_event.lock() {
            *last = Some(event.to_string());
        }
        if let Ok(mut time) = self.last_event_time.lock() {
            *time = Some(Utc::now());
        }
    }

    /// Get last event information
    pub fn last_event(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let event = self.last_event.lock().ok().and_then(|e| e.clone());
        let time = self.last_event_time.lock().ok().and_then(|t| *t);
        (event, time)
    }

    /// Calculate server uptime as a formatted string
    pub fn uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_state(dir: &TempDir) -> AppState {
        let store = Arc::new(Store::open(dir.path().join("store.json")).unwrap());
        AppState::new(store, "127.0.0.1".to_string(), 0, Duration::from_secs(60))
    }

    #[test]
    fn pause_stops_both_timers() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state.daily.set_running(true).unwrap();
        state.session.set_running(true).unwrap();

        state.pause_timers(true).unwrap();
        assert!(!state.daily.is_running());
        assert!(!state.session.is_running());
    }

    #[test]
    fn resume_starts_both_timers() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state.pause_timers(false).unwrap();
        assert!(state.daily.is_running());
        assert!(state.session.is_running());
    }

    #[test]
    fn snapshot_reflects_store_values() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state.daily.set_limit(21600).unwrap();
        state.daily.update_current_value(10800).unwrap();
        state.daily.set_running(true).unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.daily.current_value, 10800);
        assert_eq!(snapshot.daily.limit, 21600);
        assert!(snapshot.daily.running);
        assert_eq!(snapshot.session.current_value, 0);
    }
}
