//! Polling waits
//!
//! Page state settles asynchronously after clicks and navigation, so
//! interactions and expectations retry until a probe succeeds or the
//! deadline passes.

use crate::error::{Result, SuiteError};
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for expectations (30 seconds)
pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a whole scenario (60 seconds)
pub const DEFAULT_SCENARIO_TIMEOUT: Duration = Duration::from_secs(60);

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_EXPECT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Run `probe` until it yields `Some`, or fail with [`SuiteError::Timeout`]
///
/// The probe always runs at least once, even with a zero timeout. Errors
/// returned by the probe abort the wait immediately; probes that should
/// tolerate transient failures map them to `Ok(None)` themselves.
pub async fn wait_for<T, F, Fut>(options: &WaitOptions, waited_for: &str, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            return Err(SuiteError::Timeout(format!(
                "{} (waited {:?})",
                waited_for, elapsed
            )));
        }

        let remaining = options.timeout - elapsed;
        tokio::time::sleep(options.poll_interval.min(remaining)).await;
    }
}
