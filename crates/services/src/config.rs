use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Rest period used when nothing else is configured, in ticks.
pub const DEFAULT_REST_TICKS: u32 = 45;

/// One tick of the rest countdown.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Tunables for a workout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    rest_ticks: u32,
    tick: Duration,
}

impl SessionConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroTick` if `tick` is zero.
    pub fn new(rest_ticks: u32, tick: Duration) -> Result<Self, ConfigError> {
        if tick.is_zero() {
            return Err(ConfigError::ZeroTick);
        }
        Ok(Self { rest_ticks, tick })
    }

    /// Defaults, with `COACH_REST_SECS` overriding the rest length.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRestSecs` if the variable is set but not a
    /// non-negative integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var("COACH_REST_SECS") {
            Ok(raw) => Ok(Self::default().with_rest_ticks(parse_rest_secs(&raw)?)),
            Err(_) => Ok(Self::default()),
        }
    }

    #[must_use]
    pub fn with_rest_ticks(mut self, rest_ticks: u32) -> Self {
        self.rest_ticks = rest_ticks;
        self
    }

    #[must_use]
    pub fn rest_ticks(&self) -> u32 {
        self.rest_ticks
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        self.tick
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rest_ticks: DEFAULT_REST_TICKS,
            tick: DEFAULT_TICK,
        }
    }
}

/// Parse a rest length given in whole seconds.
///
/// # Errors
///
/// Returns `ConfigError::InvalidRestSecs` for anything but a `u32`.
pub fn parse_rest_secs(raw: &str) -> Result<u32, ConfigError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidRestSecs {
            raw: raw.to_owned(),
        })
}
