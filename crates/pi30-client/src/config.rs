use std::time::Duration;

use pi30_frame::DEFAULT_MAX_FRAME_LEN;

/// Default wait for a terminated reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default settle time between writing a command and reading its reply, also
/// used as the pause between attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Default number of attempts `query` makes before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Tunables for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Maximum wait for a terminated reply after the settle delay.
    pub timeout: Duration,
    /// Pre-read settle time and inter-attempt pause.
    pub base_delay: Duration,
    /// Total attempts per `query`, first try included. Zero is treated as one.
    pub max_attempts: u32,
    /// Longest inbound frame accepted, terminator included.
    pub max_frame_len: usize,
    /// Discard buffered and late-arriving bytes after a failed attempt.
    pub resync_on_error: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            base_delay: DEFAULT_BASE_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            resync_on_error: true,
        }
    }
}

impl ExchangeConfig {
    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}
