//! Limit notices for the overlay collaborator

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{state::AppState, timer::TimerKind};

/// Emitted when a running timer exhausts its budget. The kind serializes
/// to `"daily"` / `"session"` for the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitNotice {
    pub kind: TimerKind,
    pub at: DateTime<Utc>,
}

impl LimitNotice {
    pub fn now(kind: TimerKind) -> Self {
        Self {
            kind,
            at: Utc::now(),
        }
    }
}

/// Background task standing in for the blocking overlay: consumes limit
/// notices and surfaces the user-facing message
pub async fn limit_notice_task(state: Arc<AppState>) {
    info!("Starting limit notice task");

    let mut notice_rx = state.notice_tx.subscribe();

    loop {
        match notice_rx.recv().await {
            Ok(notice) => {
                info!(
                    "You have reached your {} limit. Please consider taking a break from your screen for a bit!",
                    notice.kind
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Limit notice listener lagged, skipped {} notices", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
