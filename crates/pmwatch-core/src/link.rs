use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Connected,
    Disconnected,
    Failed(String),
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
            Self::Failed(_) => f.write_str("failed"),
        }
    }
}

/// Connection status of the sensor link, written by the acquisition thread.
#[derive(Clone)]
pub struct Link {
    inner: Arc<(Mutex<LinkState>, Condvar)>,
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}

impl Link {
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(LinkState::Connecting), Condvar::new())),
        }
    }

    pub fn state(&self) -> LinkState {
        self.inner.0.lock().clone()
    }

    pub fn is_connected(&self) -> bool {
        *self.inner.0.lock() == LinkState::Connected
    }

    pub fn set(&self, state: LinkState) {
        let (lock, cvar) = &*self.inner;
        *lock.lock() = state;
        cvar.notify_all();
    }

    /// Blocks until the link is up, has failed, or `timeout` passes.
    /// Only meant for startup.
    pub fn wait_until_ready(&self, timeout: Duration) -> Result<()> {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut state = lock.lock();
        loop {
            match &*state {
                LinkState::Connected => return Ok(()),
                LinkState::Failed(reason) => return Err(Error::LinkFailed(reason.clone())),
                LinkState::Connecting | LinkState::Disconnected => {}
            }
            if cvar.wait_until(&mut state, deadline).timed_out() {
                return match &*state {
                    LinkState::Connected => Ok(()),
                    _ => Err(Error::LinkTimeout(timeout)),
                };
            }
        }
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Link").field(&self.state()).finish()
    }
}
