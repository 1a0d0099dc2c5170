//! Pacing of paged traversal against a rate-limited service.
//!
//! A window is one page of the listing endpoint during backup, and a group
//! of the same number of create calls during restore. The configured delay
//! elapses between consecutive windows only: never before the first window,
//! never after the last.

use std::time::Duration;

use tracing::debug;

/// Default window size: the largest page the listing endpoint returns.
pub const DEFAULT_PAGE_SIZE: u32 = 60;

/// Windowing configuration shared by backup and restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Page size requested from the listing endpoint, and the number of
    /// create calls per restore window (default: 60).
    pub page_size: u32,
    /// Idle period between windows (default: none).
    pub delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            delay: Duration::ZERO,
        }
    }
}

impl BatchConfig {
    /// Default windows with a delay of `millis` milliseconds between them.
    pub fn with_delay_ms(millis: u64) -> Self {
        Self {
            delay: Duration::from_millis(millis),
            ..Self::default()
        }
    }

    /// The page size clamped to what the service accepts (1..=60).
    pub fn window_size(&self) -> u32 {
        self.page_size.clamp(1, DEFAULT_PAGE_SIZE)
    }
}

/// Inserts the configured idle period between successive windows.
#[derive(Debug)]
pub struct RateLimitedBatcher {
    delay: Duration,
    windows: u64,
}

impl RateLimitedBatcher {
    /// Create a batcher that waits `delay` between windows.
    pub fn new(delay: Duration) -> Self {
        Self { delay, windows: 0 }
    }

    /// Wait until the next window may start.
    ///
    /// Returns immediately for the first window. Call it only when another
    /// window is actually about to be issued, so no delay trails the last.
    pub async fn next_window(&mut self) {
        if self.windows > 0 && !self.delay.is_zero() {
            debug!(
                window = self.windows + 1,
                delay_ms = self.delay.as_millis() as u64,
                "pausing between windows"
            );
            tokio::time::sleep(self.delay).await;
        }
        self.windows += 1;
    }

    /// Number of windows started so far.
    pub fn windows(&self) -> u64 {
        self.windows
    }
}
