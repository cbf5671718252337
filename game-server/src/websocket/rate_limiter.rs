use std::time::{Duration, Instant};

/// Fixed-window cap on inbound socket messages per connection. The push
/// channel only carries `authenticate` and `heartbeat`, so anything chatty
/// is a misbehaving client.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_per_window: u32,
    window_start: Instant,
    seen: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(20, Duration::from_secs(10))
    }

    pub fn with_limits(max_per_window: u32, window: Duration) -> Self {
        Self {
            window,
            max_per_window,
            window_start: Instant::now(),
            seen: 0,
        }
    }

    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.window_start) >= self.window {
            self.window_start = now;
            self.seen = 0;
        }

        if self.seen < self.max_per_window {
            self.seen += 1;
            true
        } else {
            false
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_window_cap() {
        let mut limiter = RateLimiter::with_limits(3, Duration::from_secs(60));
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(!limiter.allow());
    }

    #[test]
    fn window_rollover_resets_the_count() {
        let mut limiter = RateLimiter::with_limits(1, Duration::from_millis(5));
        assert!(limiter.allow());
        assert!(!limiter.allow());
        std::thread::sleep(Duration::from_millis(10));
        assert!(limiter.allow());
    }
}
