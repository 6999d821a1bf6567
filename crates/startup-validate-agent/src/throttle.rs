// ABOUTME: Sliding-window limiter that caps LLM requests per minute across a crew run.
// ABOUTME: acquire() waits until a slot frees up inside the trailing window.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Caps how many requests may start inside any trailing window.
#[derive(Debug)]
pub struct RequestLimiter {
    max_requests: usize,
    window: Duration,
    granted: Mutex<VecDeque<Instant>>,
}

impl RequestLimiter {
    /// Allow at most `max_rpm` requests in any 60-second window.
    pub fn per_minute(max_rpm: u32) -> Self {
        Self::with_window(max_rpm, Duration::from_secs(60))
    }

    /// Allow at most `max_requests` requests in any `window`. Zero is treated as one.
    pub fn with_window(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1) as usize,
            window,
            granted: Mutex::new(VecDeque::new()),
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Wait for a free slot and claim it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut granted = self.granted.lock().await;
                let now = Instant::now();
                while granted
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    granted.pop_front();
                }

                if granted.len() < self.max_requests {
                    granted.push_back(now);
                    return;
                }

                granted
                    .front()
                    .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                    .unwrap_or_default()
            };

            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                max = self.max_requests,
                "request limit reached, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Requests granted inside the current window.
    pub async fn recent(&self) -> usize {
        let granted = self.granted.lock().await;
        let now = Instant::now();
        granted
            .iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn grants_up_to_limit_without_waiting() {
        let limiter = RequestLimiter::with_window(3, Duration::from_secs(60));
        let start = std::time::Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.recent().await, 3);
    }

    #[tokio::test]
    async fn waits_for_window_when_full() {
        let window = Duration::from_millis(60);
        let limiter = RequestLimiter::with_window(2, window);
        let start = std::time::Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert!(
            start.elapsed() >= Duration::from_millis(50),
            "third request should wait for the window, took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn zero_limit_is_clamped() {
        assert_eq!(RequestLimiter::per_minute(0).max_requests(), 1);
        assert_eq!(RequestLimiter::per_minute(13).max_requests(), 13);
    }
}
