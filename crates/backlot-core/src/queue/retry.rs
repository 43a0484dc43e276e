//! Retry policy: decides backoff delays.

use std::time::Duration;

/// Backoff policy for failed jobs: a fixed table of increasing delays,
/// indexed by how many attempts have already been made. Past the end of the
/// table the last delay repeats.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    /// `delays` must be non-empty; the last entry repeats for late attempts.
    pub fn new(delays: Vec<Duration>) -> Self {
        assert!(!delays.is_empty(), "retry policy needs at least one delay");
        Self { delays }
    }

    /// Delay before the retry following attempt number `attempts` (1-indexed):
    /// `delays[min(attempts - 1, last index)]`.
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let index = (attempts.saturating_sub(1) as usize).min(self.delays.len() - 1);
        self.delays[index]
    }
}

impl Default for RetryPolicy {
    /// Platform default: 1s, 5s, 15s, 60s, then 60s forever.
    fn default() -> Self {
        Self::new(vec![
            Duration::from_secs(1),
            Duration::from_secs(5),
            Duration::from_secs(15),
            Duration::from_secs(60),
        ])
    }
}
