//! Fixed-interval polling with a bounded attempt budget.

use std::future::Future;
use std::time::Duration;

/// 單次檢查的結果
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep<T> {
    /// Terminal status reached; stop polling.
    Ready(T),
    Pending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    Completed { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedPoll {
    interval: Duration,
    max_attempts: u32,
}

impl BoundedPoll {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 總等待上限（interval × max_attempts）
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Calls `check` until it reports `Ready`, an error, or the budget runs out.
    /// Sleeps `interval` between pending attempts, never after the last one.
    pub async fn run<T, E, F, Fut>(&self, mut check: F) -> Result<PollOutcome<T>, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<PollStep<T>, E>>,
    {
        for attempt in 1..=self.max_attempts {
            match check(attempt).await? {
                PollStep::Ready(value) => {
                    tracing::debug!("Poll completed after {} attempt(s)", attempt);
                    return Ok(PollOutcome::Completed {
                        value,
                        attempts: attempt,
                    });
                }
                PollStep::Pending => {
                    tracing::debug!("Poll attempt {}/{} still pending", attempt, self.max_attempts);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.interval).await;
                    }
                }
            }
        }

        tracing::warn!("Poll gave up after {} attempts", self.max_attempts);
        Ok(PollOutcome::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for BoundedPoll {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), 30)
    }
}
