//! Session registry for recurring scan tasks.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

/// Identifier of a chat session driving the bot.
pub type SessionId = i64;

/// Handle to one session's recurring scan task.
///
/// The task loop watches the shutdown channel and exits when signalled;
/// dropping the handle without cancelling leaves the task running.
#[derive(Debug)]
pub struct SessionHandle {
    shutdown: watch::Sender<bool>,
    period: Duration,
}

impl SessionHandle {
    /// Creates a handle from the task's shutdown channel and its scan
    /// period.
    #[must_use]
    pub const fn new(shutdown: watch::Sender<bool>, period: Duration) -> Self {
        Self { shutdown, period }
    }

    /// Returns the scan period of this session.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Signals the task to stop. The task exits on its next loop
    /// iteration.
    fn cancel(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// Maps session ids to their recurring task handles.
///
/// Cancelling one session never affects another; there is no global
/// stop besides [`SessionRegistry::clear`] at shutdown.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, SessionHandle>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session's task handle. A previously registered task
    /// for the same session is cancelled first.
    pub fn insert(&mut self, id: SessionId, handle: SessionHandle) {
        if let Some(previous) = self.sessions.insert(id, handle) {
            debug!("Replacing running task for session {}", id);
            previous.cancel();
        }
    }

    /// Cancels and removes a session's task. Returns `false` when the
    /// session was not running.
    pub fn remove(&mut self, id: SessionId) -> bool {
        match self.sessions.remove(&id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Checks whether a session has a running task.
    #[must_use]
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Returns the scan period of a running session.
    #[must_use]
    pub fn period_of(&self, id: SessionId) -> Option<Duration> {
        self.sessions.get(&id).map(SessionHandle::period)
    }

    /// Returns the number of running sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Checks if no sessions are running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Cancels all sessions. Used at shutdown only.
    pub fn clear(&mut self) {
        for handle in self.sessions.values() {
            handle.cancel();
        }
        self.sessions.clear();
    }
}
