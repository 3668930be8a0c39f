//! Caller-side waiting: fixed-delay retry and cooperative shutdown.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use tracing::trace;

use agora_core::MarketResult;

/// Cooperative stop signal shared by every worker of a run.
///
/// Sleeping through `Shutdown::sleep` wakes up as soon as the signal fires,
/// so long waits never delay a shutdown.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    inner: Arc<ShutdownInner>,
}

#[derive(Debug, Default)]
struct ShutdownInner {
    triggered: Mutex<bool>,
    signal: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        if let Ok(mut triggered) = self.inner.triggered.lock() {
            *triggered = true;
        }
        self.inner.signal.notify_all();
    }

    /// A poisoned signal counts as triggered.
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.lock().map(|t| *t).unwrap_or(true)
    }

    /// Sleep for `timeout` or until triggered. Returns `true` if triggered.
    pub fn sleep(&self, timeout: Duration) -> bool {
        let Ok(guard) = self.inner.triggered.lock() else {
            return true;
        };
        match self
            .inner
            .signal
            .wait_timeout_while(guard, timeout, |triggered| !*triggered)
        {
            Ok((triggered, _)) => *triggered,
            Err(_) => true,
        }
    }
}

/// Unbounded retries with a zero delay can spin long enough to exhaust a
/// `u32`; the count sticks at the maximum instead.
fn count_miss(misses: u32) -> u32 {
    misses.saturating_add(1)
}

/// How a retried operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// The operation returned `true` after `misses` refusals.
    Succeeded { misses: u32 },
    /// Gave up after the configured number of attempts.
    Exhausted,
    /// Shutdown fired while waiting.
    Cancelled,
}

/// Poll-and-sleep policy for `publish` / `add_to_cart` misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// Total attempts before giving up; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max.max(1));
        self
    }

    /// Call `op` until it returns `true`, sleeping `delay` after each miss.
    ///
    /// Registry errors are returned immediately.
    pub fn run<F>(&self, shutdown: &Shutdown, mut op: F) -> MarketResult<Attempt>
    where
        F: FnMut() -> MarketResult<bool>,
    {
        let mut misses = 0u32;
        loop {
            if shutdown.is_triggered() {
                return Ok(Attempt::Cancelled);
            }
            if op()? {
                return Ok(Attempt::Succeeded { misses });
            }
            misses = count_miss(misses);
            if let Some(max) = self.max_attempts {
                if misses >= max {
                    return Ok(Attempt::Exhausted);
                }
            }
            trace!(misses, delay_ms = self.delay.as_millis() as u64, "retrying");
            if shutdown.sleep(self.delay) {
                return Ok(Attempt::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::MarketError;
    use std::time::Instant;

    #[test]
    fn succeeds_after_misses() {
        let policy = RetryPolicy::fixed(Duration::ZERO);
        let mut calls = 0;
        let outcome = policy
            .run(&Shutdown::new(), || {
                calls += 1;
                Ok(calls == 4)
            })
            .unwrap();
        assert_eq!(outcome, Attempt::Succeeded { misses: 3 });
    }

    #[test]
    fn miss_count_saturates() {
        assert_eq!(count_miss(0), 1);
        assert_eq!(count_miss(u32::MAX - 1), u32::MAX);
        assert_eq!(count_miss(u32::MAX), u32::MAX);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let policy = RetryPolicy::fixed(Duration::ZERO).with_max_attempts(3);
        let mut calls = 0;
        let outcome = policy
            .run(&Shutdown::new(), || {
                calls += 1;
                Ok(false)
            })
            .unwrap();
        assert_eq!(outcome, Attempt::Exhausted);
        assert_eq!(calls, 3);
    }

    #[test]
    fn errors_are_not_retried() {
        let policy = RetryPolicy::fixed(Duration::ZERO);
        let mut calls = 0;
        let err = policy
            .run(&Shutdown::new(), || {
                calls += 1;
                Err(MarketError::Poisoned)
            })
            .unwrap_err();
        assert_eq!(err, MarketError::Poisoned);
        assert_eq!(calls, 1);
    }

    #[test]
    fn shutdown_interrupts_a_long_wait() {
        let shutdown = Shutdown::new();
        let policy = RetryPolicy::fixed(Duration::from_secs(60));

        let trigger = shutdown.clone();
        let started = Instant::now();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            trigger.trigger();
        });

        let outcome = policy.run(&shutdown, || Ok(false)).unwrap();
        handle.join().unwrap();

        assert_eq!(outcome, Attempt::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn triggered_shutdown_skips_the_call() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let outcome = RetryPolicy::fixed(Duration::ZERO)
            .run(&shutdown, || panic!("must not be called"))
            .unwrap();
        assert_eq!(outcome, Attempt::Cancelled);
        assert!(shutdown.sleep(Duration::from_secs(60)));
    }
}
