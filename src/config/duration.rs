//! Human duration strings (`500ms`, `2s`, `1m`, `1h`).

use std::time::Duration;

use crate::error::ConfigError;

/// Parses a duration string with an `ms`, `s`, `m`, or `h` suffix.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when the suffix is missing or the
/// numeric part is not a non-negative integer.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let invalid = || ConfigError::InvalidValue {
        field: "duration".to_string(),
        value: s.to_string(),
        expected: "an integer with suffix ms, s, m, or h".to_string(),
    };

    // `ms` must be checked before `m` and `s`.
    let (number, scale_ms) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3_600_000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1_000)
    } else {
        return Err(invalid());
    };

    let n: u64 = number.trim().parse().map_err(|_| invalid())?;
    n.checked_mul(scale_ms)
        .map(Duration::from_millis)
        .ok_or_else(invalid)
}
