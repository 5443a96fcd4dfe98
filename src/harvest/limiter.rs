//! Global rate gate applied once per input URL

use std::time::{Duration, Instant};

/// Enforces a minimum interval between the starts of successive items
///
/// The reference point is a monotonic [`Instant`], so wall-clock adjustments
/// can neither shorten nor stretch the wait. The gate is taken once per
/// input URL; image downloads within a page are not gated separately.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until `min_interval` has passed since the previous call returned
    ///
    /// The first call never waits.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                tracing::trace!("Rate gate sleeping for {:?}", remaining);
                tokio::time::sleep(remaining).await;
            }
        }

        self.last = Some(Instant::now());
    }
}
