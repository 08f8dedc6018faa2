//! Rate strings and rate scopes.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::{Result, ToolkitError};

/// Time unit accepted in a rate string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Second,
    Minute,
    Hour,
    Day,
}

impl Period {
    const ALL: [Period; 4] = [Period::Second, Period::Minute, Period::Hour, Period::Day];

    /// Nombre tal como aparece en el rate string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }

    /// Duracion del periodo en segundos.
    pub fn seconds(&self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }

    /// Matches the period as a prefix, so `"days"` resolves to `Day`.
    fn from_prefix(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| s.starts_with(p.as_str()))
    }
}

/// Parses a rate string like `"100/day"` into `(limit, window_seconds)`.
///
/// Returns `None` for empty or malformed strings.
///
/// # Examples
///
/// ```
/// use restkit_core::parse_rate;
///
/// assert_eq!(parse_rate("100/day"), Some((100, 86_400)));
/// assert_eq!(parse_rate("5/minute"), Some((5, 60)));
/// assert_eq!(parse_rate("5/fortnight"), None);
/// ```
pub fn parse_rate(rate: &str) -> Option<(u32, u64)> {
    let (count, period) = rate.trim().split_once('/')?;
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let limit = count.parse::<u32>().ok()?;
    let period = Period::from_prefix(period)?;
    Some((limit, period.seconds()))
}

/// A named rate-limiting policy: `limit` requests per `window`.
///
/// # Examples
///
/// ```
/// use restkit_core::RateScope;
///
/// let scope = RateScope::parse("anon", "2/day").unwrap();
/// assert_eq!(scope.name(), "anon");
/// assert_eq!(scope.limit(), 2);
/// assert_eq!(scope.window_seconds(), 86_400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateScope {
    name: String,
    limit: u32,
    window_seconds: u64,
}

impl RateScope {
    /// Creates a new scope.
    pub fn new(name: impl Into<String>, limit: u32, window_seconds: u64) -> Self {
        Self {
            name: name.into(),
            limit,
            window_seconds,
        }
    }

    /// Creates a scope from a rate string, failing with a configuration
    /// error when the string cannot be parsed.
    pub fn parse(name: impl Into<String>, rate: &str) -> Result<Self> {
        let name = name.into();
        let (limit, window_seconds) = parse_rate(rate).ok_or_else(|| {
            ToolkitError::configuration(format!(
                "invalid rate '{}' for scope '{}', expected '<count>/<second|minute|hour|day>'",
                rate, name
            ))
        })?;
        Ok(Self::new(name, limit, window_seconds))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

impl fmt::Display for RateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}/{}s", self.name, self.limit, self.window_seconds)
    }
}
