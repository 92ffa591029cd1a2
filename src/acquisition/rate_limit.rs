// 滑动窗口限流器
//
// 按调用方身份计数，只在缓存未命中路径上消耗额度；命中路径不经过这里

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::clock::Clock;

#[derive(Clone)]
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    log: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            max_requests,
            log: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// 尝试为调用方记录一次请求
    ///
    /// 窗口内额度已满时返回 false 且不记录；调用方之间互不影响
    pub fn try_acquire(&self, caller: &str) -> bool {
        let now = self.clock.now();
        let mut log = match self.log.lock() {
            Ok(log) => log,
            Err(_) => return true,
        };

        let timestamps = log.entry(caller.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }
        timestamps.push(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::clock::ManualClock;
    use super::*;

    fn limiter() -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let limiter = RateLimiter::new(Duration::from_secs(60), 10, clock.clone());
        (limiter, clock)
    }

    #[test]
    fn test_eleventh_request_in_window_denied() {
        let (limiter, _clock) = limiter();

        for _ in 0..10 {
            assert!(limiter.try_acquire("1.2.3.4"));
        }
        assert!(!limiter.try_acquire("1.2.3.4"));
    }

    #[test]
    fn test_window_slides() {
        let (limiter, clock) = limiter();

        for _ in 0..10 {
            assert!(limiter.try_acquire("1.2.3.4"));
        }
        assert!(!limiter.try_acquire("1.2.3.4"));

        // 窗口滑出后额度恢复
        clock.advance(Duration::from_secs(60));
        assert!(limiter.try_acquire("1.2.3.4"));
    }

    #[test]
    fn test_callers_are_independent() {
        let (limiter, _clock) = limiter();

        for _ in 0..10 {
            assert!(limiter.try_acquire("1.2.3.4"));
        }
        assert!(!limiter.try_acquire("1.2.3.4"));
        assert!(limiter.try_acquire("5.6.7.8"));
    }

    #[test]
    fn test_denied_attempt_consumes_nothing() {
        let (limiter, clock) = limiter();

        for _ in 0..10 {
            assert!(limiter.try_acquire("1.2.3.4"));
        }
        // 被拒绝的尝试不计入，窗口滑出后立即恢复满额
        for _ in 0..5 {
            assert!(!limiter.try_acquire("1.2.3.4"));
        }
        clock.advance(Duration::from_secs(60));
        for _ in 0..10 {
            assert!(limiter.try_acquire("1.2.3.4"));
        }
    }
}
