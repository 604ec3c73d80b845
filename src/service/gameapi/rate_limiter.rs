use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

/// Caps outbound throughput to `max_rps` requests per rolling one-second
/// window. Not thread-safe; the client calls it sequentially before every
/// request.
pub struct RateLimiter {
    max_rps: usize,
    requests: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(max_rps: usize) -> Self {
        Self {
            max_rps,
            requests: VecDeque::new(),
        }
    }

    /// Blocks until issuing another request keeps the trailing window under
    /// the cap, then records the request.
    pub fn wait_if_needed(&mut self) {
        let now = Instant::now();

        // Drop timestamps that have left the window
        while self
            .requests
            .front()
            .is_some_and(|&t| now.duration_since(t) >= WINDOW)
        {
            self.requests.pop_front();
        }

        if self.requests.len() >= self.max_rps {
            if let Some(&oldest) = self.requests.front() {
                let elapsed = now.duration_since(oldest);
                if elapsed < WINDOW {
                    thread::sleep(WINDOW - elapsed);
                }
            }
        }

        self.requests.push_back(Instant::now());
    }
}
