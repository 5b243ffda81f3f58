//! Parsing for the quantity strings the DSL carries
//!
//! The DSL writes durations and percentages as human-readable strings:
//! `"100ms"`, `"30 minutes"`, `"99.9%"`. Declarations keep the raw text;
//! these helpers turn it into numbers when the validator or executor
//! needs them.

use std::time::Duration;

/// Error for a quantity string that does not parse
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnitParseError {
    #[error("'{0}' is not a valid duration (expected e.g. \"100ms\", \"30 minutes\")")]
    InvalidDuration(String),

    #[error("'{0}' is not a valid percentage (expected e.g. \"99.9%\")")]
    InvalidPercent(String),
}

/// Parse a duration string like `"100ms"`, `"45s"`, `"30 minutes"`, `"2 hours"`.
///
/// The unit may be attached to the number or separated by whitespace.
/// Fractional values are allowed (`"1.5h"`).
pub fn parse_duration(text: &str) -> Result<Duration, UnitParseError> {
    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .ok_or_else(|| UnitParseError::InvalidDuration(text.into()))?;

    let (number, unit) = trimmed.split_at(split);
    let value: f64 = number
        .parse()
        .map_err(|_| UnitParseError::InvalidDuration(text.into()))?;

    let millis = match unit.trim() {
        "ms" | "millis" | "millisecond" | "milliseconds" => value,
        "s" | "sec" | "secs" | "second" | "seconds" => value * 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => value * 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => value * 3_600_000.0,
        _ => return Err(UnitParseError::InvalidDuration(text.into())),
    };

    if !millis.is_finite() || millis < 0.0 {
        return Err(UnitParseError::InvalidDuration(text.into()));
    }

    Ok(Duration::from_millis(millis.round() as u64))
}

/// Parse a percentage string like `"99.9%"` into its numeric value (99.9).
///
/// A bare number without the `%` sign is accepted too.
pub fn parse_percent(text: &str) -> Result<f64, UnitParseError> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    let value: f64 = number
        .parse()
        .map_err(|_| UnitParseError::InvalidPercent(text.into()))?;

    if !value.is_finite() {
        return Err(UnitParseError::InvalidPercent(text.into()));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_attached_unit() {
        assert_eq!(parse_duration("100ms").unwrap(), Duration::from_millis(100));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_duration_spaced_unit() {
        assert_eq!(
            parse_duration("30 minutes").unwrap(),
            Duration::from_secs(30 * 60)
        );
        assert_eq!(
            parse_duration("2 hours").unwrap(),
            Duration::from_secs(2 * 3600)
        );
    }

    #[test]
    fn test_parse_duration_fractional() {
        assert_eq!(
            parse_duration("1.5s").unwrap(),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("10 fortnights").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("99.9%").unwrap(), 99.9);
        assert_eq!(parse_percent("85").unwrap(), 85.0);
    }

    #[test]
    fn test_parse_percent_invalid() {
        assert!(parse_percent("high").is_err());
        assert!(parse_percent("%").is_err());
    }
}
