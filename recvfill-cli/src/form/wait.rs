//! Readiness waits: poll a condition until it holds or a deadline passes

use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::{Instant, sleep};

use super::{DriverError, PageSession};

/// How to decide that a freshly loaded page can be used
#[derive(Debug, Clone, PartialEq)]
pub enum PageWait {
    /// Sleep for a fixed time
    Fixed(Duration),
    /// Poll until an element with this id exists
    Element {
        id: String,
        timeout: Duration,
        interval: Duration,
    },
}

impl PageWait {
    pub fn fixed(settle: Duration) -> Self {
        PageWait::Fixed(settle)
    }

    pub fn element(id: impl Into<String>, timeout: Duration, interval: Duration) -> Self {
        PageWait::Element {
            id: id.into(),
            timeout,
            interval,
        }
    }
}

/// Time budget for a polling loop
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    timeout: Duration,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Sleep for `interval` (capped at the time left). Returns `false` once the
    /// deadline has passed, without sleeping.
    pub async fn pause(&self, interval: Duration) -> bool {
        let elapsed = self.elapsed();
        if elapsed >= self.timeout {
            return false;
        }
        sleep(interval.min(self.timeout - elapsed)).await;
        true
    }
}

/// Run `probe` until it returns `true` or `timeout` passes.
///
/// The probe always runs at least once. Errors from the probe end the wait.
pub async fn poll_until<F, Fut, E>(timeout: Duration, interval: Duration, mut probe: F) -> Result<bool, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let deadline = Deadline::after(timeout);
    loop {
        if probe().await? {
            return Ok(true);
        }
        if !deadline.pause(interval).await {
            return Ok(false);
        }
    }
}

/// Poll the page until element `id` exists or `timeout` passes
pub async fn wait_for_element(
    page: &mut dyn PageSession,
    id: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<bool, DriverError> {
    let deadline = Deadline::after(timeout);
    loop {
        if page.element_exists(id).await? {
            debug!("Element '{}' present after {:?}", id, deadline.elapsed());
            return Ok(true);
        }
        if !deadline.pause(interval).await {
            return Ok(false);
        }
    }
}
