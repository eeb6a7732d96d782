//! Polling primitives for long-running server-side jobs.
//!
//! [`Poller::wait_until`] polls forever at a constant interval.
//! [`Poller::wait_for`] is the strict variant: bounded by a timeout, with an
//! interval that shrinks from 20s toward a 2s floor, failing with
//! [`Error::Timeout`] when the deadline passes. Both are built on
//! [`Poller::poll`], which takes an explicit [`PollPolicy`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};
use crate::runtime::Runtime;

/// Default interval between status checks.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(10);

/// First interval of the strict variant.
pub const STRICT_INITIAL_INTERVAL: Duration = Duration::from_secs(20);

/// Amount the strict interval shrinks by after each check.
pub const STRICT_INTERVAL_STEP: Duration = Duration::from_secs(2);

/// Smallest interval of the strict variant.
pub const STRICT_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// Time between two consecutive checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Fixed(Duration),
    /// `initial`, then `step` shorter after every check, never below `floor`.
    Decreasing {
        initial: Duration,
        step: Duration,
        floor: Duration,
    },
}

impl Interval {
    /// Pause after the `attempt`-th check (0-based).
    pub fn nth(&self, attempt: u32) -> Duration {
        match *self {
            Interval::Fixed(interval) => interval,
            Interval::Decreasing {
                initial,
                step,
                floor,
            } => initial
                .saturating_sub(step.saturating_mul(attempt))
                .max(floor),
        }
    }
}

/// How to poll: the interval and an optional upper bound on waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Interval,
    pub max_wait: Option<Duration>,
}

impl PollPolicy {
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval: Interval::Fixed(interval),
            max_wait: None,
        }
    }

    pub fn bounded(interval: Duration, max_wait: Duration) -> Self {
        Self {
            interval: Interval::Fixed(interval),
            max_wait: Some(max_wait),
        }
    }

    /// Decreasing 20s -> 2s interval bounded by `timeout`.
    pub fn strict(timeout: Duration) -> Self {
        Self {
            interval: Interval::Decreasing {
                initial: STRICT_INITIAL_INTERVAL,
                step: STRICT_INTERVAL_STEP,
                floor: STRICT_MIN_INTERVAL,
            },
            max_wait: Some(timeout),
        }
    }
}

/// Result of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The condition held for this value.
    Ready(T),
    /// `max_wait` elapsed; `last` is the final value observed.
    TimedOut { last: T, waited: Duration },
}

impl<T> PollOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready(_))
    }
}

/// Runs polling loops against the client's runtime.
#[derive(Clone)]
pub struct Poller {
    runtime: Arc<dyn Runtime>,
    interval: Duration,
}

impl Poller {
    pub fn new(runtime: Arc<dyn Runtime>, interval: Duration) -> Self {
        Self { runtime, interval }
    }

    /// Interval used by [`Poller::wait_until`].
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Evaluates `expression` until `condition` holds for its value or the
    /// policy's `max_wait` elapses. The condition is checked before the
    /// first sleep, so an already-satisfied condition returns immediately.
    pub fn poll<T, E, C>(
        &self,
        policy: &PollPolicy,
        mut expression: E,
        condition: C,
    ) -> Result<PollOutcome<T>>
    where
        E: FnMut() -> Result<T>,
        C: Fn(&T) -> bool,
    {
        let start = self.runtime.now();
        let mut attempt: u32 = 0;

        loop {
            let value = expression()?;
            if condition(&value) {
                return Ok(PollOutcome::Ready(value));
            }

            let waited = self.runtime.now().saturating_duration_since(start);
            let mut pause = policy.interval.nth(attempt);
            if let Some(max_wait) = policy.max_wait {
                if waited >= max_wait {
                    return Ok(PollOutcome::TimedOut {
                        last: value,
                        waited,
                    });
                }
                pause = pause.min(max_wait - waited);
            }

            debug!("Condition not met after {:?}, next check in {:?}", waited, pause);
            self.runtime.sleep(pause);
            attempt = attempt.saturating_add(1);
        }
    }

    /// Blocks until `condition` returns true. No timeout.
    pub fn wait_until<C>(&self, condition: C) -> Result<()>
    where
        C: FnMut() -> Result<bool>,
    {
        let policy = PollPolicy::unbounded(self.interval);
        match self.poll(&policy, condition, |done| *done)? {
            PollOutcome::Ready(_) => Ok(()),
            PollOutcome::TimedOut { waited, .. } => Err(Error::Timeout {
                what: "condition".to_string(),
                waited,
            }),
        }
    }

    /// Strict variant: returns the first value satisfying `condition`, or
    /// [`Error::Timeout`] once `timeout` has elapsed.
    pub fn wait_for<T, E, C>(
        &self,
        timeout: Duration,
        what: &str,
        expression: E,
        condition: C,
    ) -> Result<T>
    where
        E: FnMut() -> Result<T>,
        C: Fn(&T) -> bool,
    {
        match self.poll(&PollPolicy::strict(timeout), expression, condition)? {
            PollOutcome::Ready(value) => Ok(value),
            PollOutcome::TimedOut { waited, .. } => Err(Error::Timeout {
                what: what.to_string(),
                waited,
            }),
        }
    }
}

impl fmt::Debug for Poller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
