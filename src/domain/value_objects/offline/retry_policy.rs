use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_DELAYS_MS: [u64; 5] = [1_000, 2_000, 5_000, 10_000, 30_000];

/// Retry ceiling plus the delay table consulted after each failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delays: Vec<Duration>) -> Result<Self, String> {
        if max_retries == 0 {
            return Err("max_retries must be greater than 0".to_string());
        }
        if delays.is_empty() {
            return Err("retry delay table cannot be empty".to_string());
        }
        Ok(Self {
            max_retries,
            delays,
        })
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn is_exhausted(&self, attempt_count: u32) -> bool {
        attempt_count >= self.max_retries
    }

    /// Delay before the entry is reconsidered after its `attempt_count`-th failure.
    /// Attempts past the end of the table reuse the last delay.
    pub fn delay_for(&self, attempt_count: u32) -> Duration {
        let index = (attempt_count.max(1) as usize - 1).min(self.delays.len() - 1);
        self.delays[index]
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delays: DEFAULT_RETRY_DELAYS_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}
