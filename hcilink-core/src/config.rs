//! Runtime configuration for the HCI core

use embassy_time::Duration;

/// Default response timeout (100 ms)
pub const DEFAULT_TIMEOUT_MS: u32 = 100;

/// HCI core configuration
///
/// Pool size is a compile-time parameter of [`crate::Hci`]; everything
/// else lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HciConfig {
    /// Response timeout used when a request does not set its own (ms)
    pub default_timeout_ms: u32,
    /// Free buffers to guarantee before sending a request
    ///
    /// `None` means half the pool.
    pub reserve_free: Option<u8>,
    /// Log every outbound command at trace level
    pub log_traffic: bool,
}

impl Default for HciConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            reserve_free: None,
            log_traffic: false,
        }
    }
}

impl HciConfig {
    /// Default timeout as a duration
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms as u64)
    }

    /// Number of free buffers to guarantee for a pool of `capacity`
    pub fn reserve_for(&self, capacity: usize) -> usize {
        match self.reserve_free {
            Some(n) => (n as usize).min(capacity),
            None => capacity / 2,
        }
    }
}
