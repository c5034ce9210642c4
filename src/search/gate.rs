//! Fixed-interval request gate.
//!
//! Every outbound request in a run waits on the gate first, so requests
//! leave the process no faster than one per interval.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::time::Duration;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default pause between outbound requests.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Paces outbound requests to one per interval.
pub struct RequestGate {
    limiter: Option<DirectLimiter>,
    interval: Duration,
}

impl RequestGate {
    /// A gate that admits one request per `interval`. The first request passes
    /// immediately. A zero interval disables pacing.
    pub fn fixed_interval(interval: Duration) -> Self {
        Self {
            limiter: Quota::with_period(interval).map(RateLimiter::direct),
            interval,
        }
    }

    /// A gate that never waits.
    pub fn disabled() -> Self {
        Self::fixed_interval(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next request may be sent.
    pub async fn wait(&self) {
        if let Some(ref limiter) = self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::fixed_interval(DEFAULT_REQUEST_DELAY)
    }
}

impl std::fmt::Debug for RequestGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGate")
            .field("interval", &self.interval)
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}
