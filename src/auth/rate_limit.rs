use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use chrono::{DateTime, Duration, Utc};

/// Sliding-window throttle for signup/login attempts, keyed by normalized
/// email so one address cannot be hammered from many connections.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_size: Duration,
    pub max_attempts: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_size: Duration::minutes(1),
            max_attempts: 10,
        }
    }
}

#[derive(Debug)]
struct RequestWindow {
    timestamps: Vec<DateTime<Utc>>,
}

impl RequestWindow {
    fn new() -> Self {
        Self {
            timestamps: Vec::new(),
        }
    }

    fn cleanup_old_requests(&mut self, window_size: Duration) {
        let cutoff = Utc::now() - window_size;
        self.timestamps.retain(|ts| *ts > cutoff);
    }

    fn add_request(&mut self) {
        self.timestamps.push(Utc::now());
    }

    fn request_count(&self) -> usize {
        self.timestamps.len()
    }
}

pub struct RateLimiter {
    windows: Arc<RwLock<HashMap<String, RequestWindow>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Record an attempt for the key and report whether it is still within
    /// budget.
    pub async fn check(&self, key: &str) -> bool {
        let mut windows = self.windows.write().await;

        let window = windows
            .entry(key.to_string())
            .or_insert_with(RequestWindow::new);

        window.cleanup_old_requests(self.config.window_size);

        if window.request_count() < self.config.max_attempts as usize {
            window.add_request();
            true
        } else {
            false
        }
    }

    /// Drop keys with no attempts left in the window.
    pub async fn cleanup(&self) {
        let mut windows = self.windows.write().await;

        windows.retain(|_, window| {
            window.cleanup_old_requests(self.config.window_size);
            !window.timestamps.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration as TokioDuration};

    #[tokio::test]
    async fn test_rate_limiter() {
        let config = RateLimitConfig {
            window_size: Duration::seconds(1),
            max_attempts: 10,
        };
        let limiter = RateLimiter::new(config);

        // Should allow attempts up to the budget
        for _ in 0..10 {
            assert!(limiter.check("alice@example.com").await);
        }

        // Should deny attempts over the budget
        assert!(!limiter.check("alice@example.com").await);

        // Other keys are unaffected
        assert!(limiter.check("bob@example.com").await);

        // Wait for the window to pass
        sleep(TokioDuration::from_millis(1100)).await;

        assert!(limiter.check("alice@example.com").await);
    }

    #[tokio::test]
    async fn test_cleanup_drops_idle_keys() {
        let config = RateLimitConfig {
            window_size: Duration::milliseconds(50),
            max_attempts: 10,
        };
        let limiter = RateLimiter::new(config);

        limiter.check("idle@example.com").await;
        sleep(TokioDuration::from_millis(100)).await;
        limiter.cleanup().await;

        assert!(limiter.windows.read().await.is_empty());
    }
}
