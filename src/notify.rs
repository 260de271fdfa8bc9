//! Single-slot notification channel with auto-hide.
//!
//! Each `trigger` replaces the current message and starts a fresh hide timer.
//! Timers carry the generation they were started for; when one fires it only
//! hides the notification if no newer message has been triggered since. The
//! previous timer task is also aborted, so superseded timers are inert twice over.

use log::{debug, warn};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub visible: bool,
}

/// Identifies the notification a hide timer was started for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryTicket(u64);

#[derive(Default)]
struct ChannelState {
    current: Option<Notification>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct NotificationChannel {
    state: Arc<Mutex<ChannelState>>,
    timeout: Duration,
}

impl NotificationChannel {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChannelState::default())),
            timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChannelState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Show `message`, replacing whatever is displayed, and restart the hide timer.
    ///
    /// Outside a tokio runtime no timer is started; the message then stays
    /// until it is dismissed or replaced.
    pub fn trigger(&self, message: impl Into<String>, severity: Severity) -> ExpiryTicket {
        let mut state = self.lock();
        state.generation += 1;
        let ticket = ExpiryTicket(state.generation);
        state.current = Some(Notification {
            message: message.into(),
            severity,
            visible: true,
        });
        if let Some(old) = state.timer.take() {
            old.abort();
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let channel = self.clone();
                let timeout = self.timeout;
                state.timer = Some(handle.spawn(async move {
                    tokio::time::sleep(timeout).await;
                    channel.expire(ticket);
                }));
            }
            Err(_) => warn!("No async runtime; notification will not auto-hide"),
        }
        ticket
    }

    /// Hide the notification if `ticket` still names the current one.
    /// Returns whether anything was hidden.
    pub fn expire(&self, ticket: ExpiryTicket) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.0 {
            debug!("Ignoring stale notification timer {}", ticket.0);
            return false;
        }
        state.timer = None;
        match state.current.as_mut() {
            Some(n) if n.visible => {
                n.visible = false;
                true
            }
            _ => false,
        }
    }

    /// User close: hide immediately regardless of timers
    pub fn dismiss(&self) {
        let mut state = self.lock();
        if let Some(n) = state.current.as_mut() {
            n.visible = false;
        }
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }

    pub fn current(&self) -> Option<Notification> {
        self.lock().current.clone()
    }

    /// The current notification if it is showing
    pub fn visible(&self) -> Option<Notification> {
        self.current().filter(|n| n.visible)
    }
}
