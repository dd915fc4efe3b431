use chrono::{DateTime, Duration, Utc};

/// Where session start and end timestamps come from.
///
/// Only the summary reads this clock. Rest countdowns use the runtime's
/// monotonic timer instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Pinned(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn pinned(at: DateTime<Utc>) -> Self {
        Self::Pinned(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Pinned(at) => *at,
        }
    }
}

/// Seconds since the epoch of the instant tests pin sessions to.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::seconds(FIXED_TEST_TIMESTAMP)
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::pinned(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_clock_never_moves() {
        let clock = fixed_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn default_is_system_time() {
        let before = Utc::now();
        let now = Clock::default().now();
        assert!(now >= before);
    }
}
