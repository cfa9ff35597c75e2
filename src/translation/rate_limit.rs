/*!
 * Token bucket rate limiter shared by all in-flight provider requests.
 *
 * One limiter is created per job and handed to the translation client behind
 * an `Arc`; workers acquire a token before every network call, so the global
 * requests-per-second ceiling holds regardless of how many batches are being
 * translated concurrently.
 */

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Requests-per-second ceiling shared across concurrent workers.
///
/// The bucket holds at most `capacity` tokens and refills continuously at
/// `refill_per_sec`. `acquire` suspends until a token is available; a
/// disabled limiter (no configured ceiling) never suspends.
#[derive(Debug)]
pub struct RateLimiter {
    state: Option<Mutex<Bucket>>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    capacity: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a limiter with the given requests-per-second ceiling.
    /// The burst capacity equals one second worth of requests, at least 1.
    pub fn new(requests_per_sec: f64) -> Self {
        let rate = requests_per_sec.max(0.1);
        let capacity = rate.max(1.0);
        RateLimiter {
            state: Some(Mutex::new(Bucket {
                tokens: capacity,
                capacity,
                refill_per_sec: rate,
                last_refill: Instant::now(),
            })),
        }
    }

    /// Create a limiter that never delays
    pub fn disabled() -> Self {
        RateLimiter { state: None }
    }

    /// Build from an optional configured ceiling
    pub fn from_config(requests_per_sec: Option<f64>) -> Self {
        match requests_per_sec {
            Some(rate) if rate > 0.0 => Self::new(rate),
            _ => Self::disabled(),
        }
    }

    /// Take one token, suspending until it is available
    pub async fn acquire(&self) {
        loop {
            let wait = self.try_reserve();
            if wait.is_zero() {
                return;
            }
            tokio::time::sleep(wait).await;
        }
    }

    /// Attempt to take a token now. Returns the duration to wait before
    /// trying again, or zero when a token was taken.
    fn try_reserve(&self) -> Duration {
        let Some(state) = &self.state else {
            return Duration::ZERO;
        };

        let mut bucket = state.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * bucket.refill_per_sec).min(bucket.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Duration::ZERO
        } else {
            let deficit = 1.0 - bucket.tokens;
            Duration::from_secs_f64(deficit / bucket.refill_per_sec)
        }
    }
}
