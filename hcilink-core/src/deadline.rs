//! Request deadlines

use embassy_time::{Duration, Instant};

/// Shortest timeout a request can have
pub const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Monotonic deadline for one pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    /// Deadline `timeout` from now, never shorter than [`MIN_TIMEOUT`]
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now() + timeout.max(MIN_TIMEOUT),
        }
    }

    /// Check if the deadline has passed
    pub fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Instant at which the deadline passes
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}
