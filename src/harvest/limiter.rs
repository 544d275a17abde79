// src/harvest/limiter.rs
//! Minimum-interval rate limiter: one timestamp behind an async mutex.
//!
//! Callers serialize through the lock, so concurrent users of one limiter
//! (e.g. several harvesters sharing an `Arc<RateLimiter>`) still respect
//! the configured spacing.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use super::HarvestError;

#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Limiter allowing `qps` calls per second. Fails unless `qps` is
    /// positive, finite and yields a representable interval.
    pub fn per_second(qps: f64) -> Result<Self, HarvestError> {
        if !(qps.is_finite() && qps > 0.0) {
            return Err(HarvestError::Config(format!(
                "rate must be a positive number, got {qps}"
            )));
        }
        let interval = Duration::try_from_secs_f64(1.0 / qps).map_err(|e| {
            HarvestError::Config(format!("rate {qps} gives no usable interval: {e}"))
        })?;
        Ok(Self::new(interval))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until at least `min_interval` has passed since the previous
    /// call, then record now as the latest call.
    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
