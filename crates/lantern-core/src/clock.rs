//! Virtual clock for the Lantern simulation.
//!
//! The clock is the single source of truth for simulated time. It counts
//! ticks and accumulated milliseconds; wall-clock timestamps (job creation,
//! vessel ETA/ETD) are derived from a fixed epoch plus the elapsed time.
//!
//! All arithmetic is checked. The clock never reads the host's clock, so a
//! run with the same seed and tick size is reproducible.

use chrono::{DateTime, TimeDelta, Utc};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Elapsed simulated time would overflow.
    #[error("simulated time overflow after {elapsed_ms} ms")]
    TimeOverflow {
        /// Elapsed milliseconds before the failed advance.
        elapsed_ms: u64,
    },
}

/// Virtual clock advanced once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    /// Ticks run so far.
    tick: u64,

    /// Simulated milliseconds since the epoch.
    elapsed_ms: u64,

    /// Simulated time at tick 0.
    epoch: DateTime<Utc>,
}

impl SimClock {
    /// Create a clock at tick 0 positioned at `epoch`.
    pub const fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            tick: 0,
            elapsed_ms: 0,
            epoch,
        }
    }

    /// Advance by one tick of `dt_ms` simulated milliseconds. Returns the
    /// new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] or [`ClockError::TimeOverflow`]
    /// if either counter would exceed `u64::MAX`. The clock is unchanged on
    /// error.
    pub fn advance(&mut self, dt_ms: u64) -> Result<u64, ClockError> {
        let tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        let elapsed_ms = self
            .elapsed_ms
            .checked_add(dt_ms)
            .ok_or(ClockError::TimeOverflow {
                elapsed_ms: self.elapsed_ms,
            })?;
        self.tick = tick;
        self.elapsed_ms = elapsed_ms;
        Ok(tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Return the simulated milliseconds elapsed since tick 0.
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Return the simulated time at tick 0.
    pub const fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Current simulated time.
    ///
    /// Saturates at the epoch if the elapsed time cannot be represented as
    /// a date, which only happens after hundreds of millions of years.
    pub fn now(&self) -> DateTime<Utc> {
        i64::try_from(self.elapsed_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|delta| self.epoch.checked_add_signed(delta))
            .unwrap_or(self.epoch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_735_711_200, 0).unwrap()
    }

    #[test]
    fn starts_at_epoch() {
        let clock = SimClock::new(epoch());
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.elapsed_ms(), 0);
        assert_eq!(clock.now(), epoch());
    }

    #[test]
    fn advance_accumulates_time() {
        let mut clock = SimClock::new(epoch());
        assert_eq!(clock.advance(1000).unwrap(), 1);
        assert_eq!(clock.advance(500).unwrap(), 2);
        assert_eq!(clock.elapsed_ms(), 1500);
        assert_eq!(
            clock.now().signed_duration_since(epoch()),
            TimeDelta::milliseconds(1500)
        );
    }

    #[test]
    fn zero_dt_still_counts_ticks() {
        let mut clock = SimClock::new(epoch());
        clock.advance(0).unwrap();
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.now(), epoch());
    }

    #[test]
    fn time_overflow_leaves_clock_unchanged() {
        let mut clock = SimClock::new(epoch());
        clock.advance(u64::MAX).unwrap();
        let result = clock.advance(1);
        assert!(matches!(result, Err(ClockError::TimeOverflow { .. })));
        assert_eq!(clock.tick(), 1);
        // Unrepresentable dates fall back to the epoch.
        assert_eq!(clock.now(), epoch());
    }
}
