//! External signal dispatch
//!
//! Each signal from the platform glue (screen state source, boot signal)
//! maps to one handler operating on the shared state. The API layer is a
//! thin wrapper over these handlers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{state::AppState, tasks::session_reset};

/// Screen power signal from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenEvent {
    On,
    Off,
}

/// Dispatch a screen signal: screen-off pauses both timers and arms the
/// session-reset alarm, screen-on resumes them and disarms it.
pub fn handle_screen_event(state: &Arc<AppState>, event: ScreenEvent) -> Result<(), String> {
    debug!("Screen event: {:?}", event);

    match event {
        ScreenEvent::Off => {
            state.pause_timers(true)?;
            session_reset::schedule(state)
        }
        ScreenEvent::On => {
            state.pause_timers(false)?;
            session_reset::cancel(state)
        }
    }
}

/// Dispatch the boot signal: reschedule the session-reset alarm if it was
/// armed before shutdown. Returns whether an alarm was rescheduled.
pub fn handle_boot(state: &Arc<AppState>) -> Result<bool, String> {
    session_reset::reschedule_after_boot(state)
}
