//! Readiness probing with exponential backoff
//!
//! Services started by the toolkit (Ollama daemon, MCP app server, the
//! Compose stack) come up asynchronously. Waiting is bounded two ways:
//! - Deadline: hard wall-clock bound on the total wait
//! - Strategy: binary exponential delay with jitter, capped per attempt

use crate::errors::{Result, SetupError};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Base delay between probe attempts (250 milliseconds)
const BASE_DELAY_MS: u64 = 250;

/// Maximum delay cap between attempts (4 seconds)
const MAX_DELAY_MS: u64 = 4000;

/// Exponential backoff schedule
#[derive(Debug, Clone)]
pub struct Backoff {
    /// Base delay in milliseconds
    base_delay_ms: u64,

    /// Maximum delay cap in milliseconds
    max_delay_ms: u64,

    /// Enable jitter
    enable_jitter: bool,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base_delay_ms: BASE_DELAY_MS,
            max_delay_ms: MAX_DELAY_MS,
            enable_jitter: true,
        }
    }
}

impl Backoff {
    /// Create a backoff schedule with custom delays
    pub fn with_delays(base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms,
            enable_jitter: true,
        }
    }

    /// Disable jitter (deterministic delays)
    pub fn without_jitter(mut self) -> Self {
        self.enable_jitter = false;
        self
    }

    /// Calculate delay for given attempt number
    pub fn delay_for(&self, attempt: u32) -> Duration {
        // Binary exponential backoff: base * 2^attempt
        let exponential_delay = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt));

        // Cap at maximum delay
        let delay_ms = exponential_delay.min(self.max_delay_ms);

        // Add jitter if enabled (±25% random variation)
        let final_delay = if self.enable_jitter {
            let jitter = (delay_ms / 4) as i64;
            let random_jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter as f64;
            ((delay_ms as i64) + random_jitter as i64).max(0) as u64
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }
}

/// Waits for a condition to become true under a wall-clock deadline
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    backoff: Backoff,
    deadline: Duration,
}

impl ReadinessProbe {
    /// Create a probe with the default backoff schedule
    pub fn new(deadline: Duration) -> Self {
        Self {
            backoff: Backoff::default(),
            deadline,
        }
    }

    /// Create a probe with a custom backoff schedule
    pub fn with_backoff(deadline: Duration, backoff: Backoff) -> Self {
        Self { backoff, deadline }
    }

    /// Poll `check` until it returns true or the deadline elapses.
    ///
    /// Returns the elapsed time on success. The next sleep is never
    /// started if it would overrun the deadline.
    pub async fn wait_until<F, Fut>(&self, what: &str, mut check: F) -> Result<Duration>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            if check().await {
                return Ok(start.elapsed());
            }

            let delay = self.backoff.delay_for(attempt);
            if start.elapsed() + delay >= self.deadline {
                return Err(SetupError::Timeout {
                    what: what.to_string(),
                    waited_secs: start.elapsed().as_secs(),
                });
            }

            attempt += 1;
            sleep(delay).await;
        }
    }

    /// Poll an HTTP endpoint until it answers with a 2xx status
    pub async fn wait_for_http(
        &self,
        client: &reqwest::Client,
        url: &str,
        what: &str,
    ) -> Result<Duration> {
        self.wait_until(what, || async {
            matches!(client.get(url).send().await, Ok(resp) if resp.status().is_success())
        })
        .await
    }

    /// Deadline this probe enforces
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}
