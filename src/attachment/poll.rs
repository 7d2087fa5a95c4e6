//! Bounded wait-for-readiness polling.
//!
//! Not a retry loop: a check that fails is surfaced immediately, only a
//! "not ready yet" answer leads to another attempt.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::{Backoff, Constant};

/// Interval between index status checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Number of status checks before giving up (~10 seconds in total).
pub const POLL_MAX_ATTEMPTS: u32 = 20;

/// What a single status check observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Failed,
    Pending,
}

impl Readiness {
    /// Map a vector store file status onto a readiness state.
    ///
    /// `cancelled` can never turn into `completed`, so it counts as failure.
    pub fn from_file_status(status: &str) -> Self {
        match status {
            "completed" => Readiness::Ready,
            "failed" | "cancelled" => Readiness::Failed,
            _ => Readiness::Pending,
        }
    }
}

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: POLL_MAX_ATTEMPTS,
        }
    }
}

/// Terminal result of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready { attempts: u32 },
    Failed { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Call `check` until it reports a terminal state or the attempts run out.
///
/// Sleeps `policy.interval` between attempts, never after the last one.
/// An `Err` from `check` aborts the poll and is returned as-is.
pub async fn poll_until_ready<F, Fut, E>(policy: PollPolicy, mut check: F) -> Result<PollOutcome, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Readiness, E>>,
{
    let mut interval = Constant::new(policy.interval);
    let mut attempts = 0;

    while attempts < policy.max_attempts {
        attempts += 1;

        match check().await? {
            Readiness::Ready => return Ok(PollOutcome::Ready { attempts }),
            Readiness::Failed => return Ok(PollOutcome::Failed { attempts }),
            Readiness::Pending => {
                if attempts < policy.max_attempts
                    && let Some(wait) = interval.next_backoff()
                {
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    Ok(PollOutcome::Exhausted { attempts })
}
