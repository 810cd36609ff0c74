//! Reconnect delay policy
//!
//! Capped exponential backoff with optional jitter. The supervisor asks for
//! the next delay after every failed attempt and resets the policy once a
//! connection is established, so the first delay after any future drop is
//! the initial one again.

use std::time::Duration;

/// Capped exponential backoff
///
/// `next_delay()` returns the current delay and doubles it for the next
/// call, never exceeding the cap.
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    jitter: bool,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
            jitter: false,
        }
    }

    /// Enable jitter to prevent thundering herd (random 0-25% of delay)
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    /// Delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = std::cmp::min(self.current * 2, self.max);

        if self.jitter {
            use rand::Rng;
            let jitter_ms = rand::thread_rng().gen_range(0..=(delay.as_millis() as u64 / 4));
            delay + Duration::from_millis(jitter_ms)
        } else {
            delay
        }
    }

    /// Reset after a successful connection.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
