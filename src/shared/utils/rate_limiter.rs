use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Process-wide token bucket gating every call to the remote catalog's
/// search endpoint. The remote budget is per IP, so a single shared bucket
/// is the correct shape regardless of how many users are exporting.
///
/// Refill is full-on-elapsed rather than a steady trickle: once `interval`
/// has passed since the last refill, the bucket snaps back to `capacity`.
/// Callers may burst up to `capacity` requests at each refill boundary.
pub struct RateLimiter {
    state: Mutex<BucketState>,
    capacity: u32,
    interval: Duration,
}

struct BucketState {
    tokens: u32,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(capacity: u32, interval: Duration) -> Self {
        Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            interval,
        }
    }

    /// Take one token, sleeping until the next refill when the bucket is
    /// empty. The mutex is held across the sleep; tokio's mutex wakes
    /// waiters in FIFO order, so contended callers cannot starve.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        let now = Instant::now();
        if now.duration_since(state.last_refill) >= self.interval {
            state.tokens = self.capacity;
            state.last_refill = now;
        }

        if state.tokens == 0 {
            sleep_until(state.last_refill + self.interval).await;
            state.tokens = self.capacity;
            state.last_refill = Instant::now();
        }

        state.tokens -= 1;
    }
}
