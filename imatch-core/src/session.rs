//! Session management for the iMatch link
//!
//! A session tracks the connection lifecycle and hands out the
//! synthetic correlation ids that back the client's pending-request
//! table. The wire protocol itself is correlation-free; the ids only
//! ever live on this side of the link.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No link
    Disconnected,

    /// Discovery and link establishment in progress
    Connecting,

    /// Link up with the notification subscription live
    Connected,
}

/// Session manager
///
/// Thread-safe and cheap to clone (Arc internally); the dispatcher
/// task and the client share one session.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    /// Correlation id source for pending requests
    correlation: AtomicU64,

    /// Current session state
    state: parking_lot::RwLock<SessionState>,
}

impl Session {
    /// Create a new disconnected session
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                correlation: AtomicU64::new(1),
                state: parking_lot::RwLock::new(SessionState::Disconnected),
            }),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if the link is up
    pub fn is_connected(&self) -> bool {
        matches!(self.state(), SessionState::Connected)
    }

    /// Enter discovery; only valid from `Disconnected`
    pub fn begin_connect(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Disconnected {
            return Err(Error::InvalidSessionState(format!(
                "Cannot start connecting from state: {:?}",
                *state
            )));
        }

        *state = SessionState::Connecting;
        Ok(())
    }

    /// Mark the link up; only valid from `Connecting`
    pub fn open(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Connecting {
            return Err(Error::InvalidSessionState(format!(
                "Cannot open from state: {:?}",
                *state
            )));
        }

        *state = SessionState::Connected;
        Ok(())
    }

    /// Drop to `Disconnected` from any state
    pub fn close(&self) {
        *self.inner.state.write() = SessionState::Disconnected;
    }

    /// Next correlation id, unique for the life of the session
    pub fn next_correlation_id(&self) -> u64 {
        self.inner.correlation.fetch_add(1, Ordering::AcqRel)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
