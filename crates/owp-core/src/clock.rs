//! Wall-clock abstraction.
//!
//! Payload timestamps and license expiry read time through [`Clock`] so that
//! expiry logic can be tested without sleeping.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current Unix time in milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current Unix timestamp in milliseconds.
    fn now_millis(&self) -> u64;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }
}

/// Clock that always returns the same timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    /// The timestamp to return, in Unix milliseconds.
    pub millis: u64,
}

impl FixedClock {
    /// Creates a clock frozen at `millis`.
    pub const fn new(millis: u64) -> Self {
        Self { millis }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(1_735_430_400_000);
        assert_eq!(clock.now_millis(), 1_735_430_400_000);
        assert_eq!(clock.now_millis(), clock.now_millis());
    }

    #[test]
    fn test_system_clock_is_after_2024() {
        assert!(SystemClock.now_millis() > 1_704_067_200_000);
    }
}
