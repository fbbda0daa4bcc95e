//! Mailbox configuration.

use std::time::Duration;

use serde::Deserialize;

fn default_capacity() -> usize {
    1000
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Settings of a [`DeadlineMailbox`](crate::mailbox::DeadlineMailbox).
///
/// Deserializes from any serde format; missing fields take their defaults:
///
/// ```text
/// capacity = 1000
/// default_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MailboxConfig {
    /// Maximum number of buffered deliveries. Overflow drops the newest.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Timeout used by `receive_default`, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            default_timeout_ms: default_timeout_ms(),
        }
    }
}

impl MailboxConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}
