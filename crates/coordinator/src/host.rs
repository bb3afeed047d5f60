//! Host environment capabilities: full reload and wall-clock time.

use chrono::{DateTime, Utc};

/// The embedding environment (browser window, desktop shell, ...).
pub trait Host: Send + Sync {
    /// Discards in-memory state and reloads the whole application.
    fn reload(&self);
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
