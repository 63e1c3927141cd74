//! Wall-clock access for sessions. Tests pin time with [`fixed_clock`].

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for session timestamps and elapsed-time accounting.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// System time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Move a fixed clock forward. A system clock ignores this.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(at) = self {
            *at += delta;
        }
    }
}

/// Whole seconds from `since` to `until`; 0 when `until` is earlier.
#[must_use]
pub fn elapsed_secs(since: DateTime<Utc>, until: DateTime<Utc>) -> u64 {
    u64::try_from(until.signed_duration_since(since).num_seconds()).unwrap_or(0)
}

/// 2023-11-14T22:13:20Z.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// The instant every fixed clock in tests starts from.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

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
        clock.advance(Duration::seconds(90));
        assert_eq!(elapsed_secs(fixed_now(), clock.now()), 90);
    }

    #[test]
    fn system_clock_ignores_advance() {
        let mut clock = Clock::default_clock();
        let before = clock.now();
        clock.advance(Duration::days(1));
        assert!(clock.now() - before < Duration::hours(1));
    }

    #[test]
    fn elapsed_is_clamped_for_backdated_instants() {
        let now = fixed_now();
        assert_eq!(elapsed_secs(now, now - Duration::seconds(5)), 0);
    }
}
