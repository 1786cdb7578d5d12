use chrono::{DateTime, Duration, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Whole days between two instants, rounded up, ignoring direction.
///
/// Any non-zero gap shorter than a day counts as one day; identical
/// instants are zero days apart.
#[must_use]
pub fn elapsed_days_ceil(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    let millis = (b - a).num_milliseconds().abs();
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::hours(3));
        assert_eq!(clock.now(), fixed_now() + Duration::hours(3));
    }

    #[test]
    fn elapsed_days_rounds_up() {
        let now = fixed_now();
        assert_eq!(elapsed_days_ceil(now, now), 0);
        assert_eq!(elapsed_days_ceil(now, now + Duration::minutes(1)), 1);
        assert_eq!(elapsed_days_ceil(now, now + Duration::days(1)), 1);
        assert_eq!(elapsed_days_ceil(now, now + Duration::hours(25)), 2);
        assert_eq!(elapsed_days_ceil(now + Duration::days(3), now), 3);
    }
}
