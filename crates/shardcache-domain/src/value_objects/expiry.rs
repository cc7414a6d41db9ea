//! Entry expiry

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How an expiry is sent to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryPrecision {
    /// Whole seconds
    Seconds(u64),
    /// Milliseconds, used when the duration is not a whole number of seconds
    Millis(u64),
}

/// Lifetime of a cache entry
///
/// A zero duration means the entry never expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expiry(Duration);

impl Expiry {
    /// Entry never expires
    pub const NONE: Self = Self(Duration::ZERO);

    /// Create an expiry from a duration
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Create an expiry in whole seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// Create an expiry in milliseconds
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// True when the entry never expires
    pub fn is_none(&self) -> bool {
        self.0.is_zero()
    }

    /// The underlying duration
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Wire form of the expiry, `None` when the entry never expires
    ///
    /// Sub-millisecond remainders round up so a non-zero expiry never
    /// degrades into "no expiration".
    pub fn precision(&self) -> Option<ExpiryPrecision> {
        if self.is_none() {
            return None;
        }
        if self.0.subsec_nanos() == 0 {
            return Some(ExpiryPrecision::Seconds(self.0.as_secs()));
        }
        let millis = self.0.as_nanos().div_ceil(1_000_000);
        Some(ExpiryPrecision::Millis(
            u64::try_from(millis).unwrap_or(u64::MAX),
        ))
    }
}

impl From<Duration> for Expiry {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}
