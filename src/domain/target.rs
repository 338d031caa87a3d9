//! Conversion between a metric's numeric target and its display string
//!
//! Durations are stored in milliseconds and shown as `dd:hh:mm`; currency
//! and integer targets are shown as plain decimal numbers.

use thiserror::Error;

use super::metric::MetricType;

const MINUTE_MS: u64 = 60 * 1000;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' is not a duration in dd:hh:mm format")]
    DurationShape(String),
    #[error("{field} must be less than {limit} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        limit: i64,
    },
    #[error("target '{0}' is too large")]
    Overflow(String),
}

/// Render a target for display
pub fn format_target(target: i64, metric_type: MetricType) -> String {
    match metric_type {
        MetricType::Integer | MetricType::Currency => target.to_string(),
        MetricType::Duration => format_duration(target),
    }
}

fn format_duration(millis: i64) -> String {
    let magnitude = millis.unsigned_abs();
    let days = magnitude / DAY_MS;
    let rem = magnitude % DAY_MS;
    let hours = rem / HOUR_MS;
    let minutes = (rem % HOUR_MS) / MINUTE_MS;

    let sign = if millis < 0 { "-" } else { "" };
    format!("{sign}{days:02}:{hours:02}:{minutes:02}")
}

/// Parse display text back into a target.
///
/// The text is expected to have passed [`validate_target`]; anything else is
/// reported as an error instead of producing a bogus number.
pub fn parse_target(text: &str, metric_type: MetricType) -> Result<i64, TargetError> {
    if text.is_empty() {
        return Ok(0);
    }

    match metric_type {
        MetricType::Integer | MetricType::Currency => parse_leading_int(text),
        MetricType::Duration => parse_duration(text),
    }
}

fn parse_duration(text: &str) -> Result<i64, TargetError> {
    // One sign for the whole duration, as `format_target` writes it.
    let trimmed = text.trim_start();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let fields: Vec<&str> = body.split(':').collect();
    let [days, hours, minutes] = fields.as_slice() else {
        return Err(TargetError::DurationShape(text.to_string()));
    };
    if fields
        .iter()
        .any(|field| field.trim_start().starts_with(|c| c == '-' || c == '+'))
    {
        return Err(TargetError::DurationShape(text.to_string()));
    }

    let days = parse_leading_int(days)?;
    let hours = parse_leading_int(hours)?;
    let minutes = parse_leading_int(minutes)?;

    let total = days
        .checked_mul(24)
        .and_then(|h| h.checked_add(hours))
        .and_then(|h| h.checked_mul(60))
        .and_then(|m| m.checked_add(minutes))
        .and_then(|m| m.checked_mul(60 * 1000))
        .ok_or_else(|| TargetError::Overflow(text.to_string()))?;

    Ok(if negative { -total } else { total })
}

/// Leading-integer parse: skips leading whitespace, accepts one sign, reads
/// digits and ignores whatever follows them.
fn parse_leading_int(text: &str) -> Result<i64, TargetError> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(TargetError::NotANumber(text.to_string()));
    }

    let mut value: i64 = 0;
    for digit in rest[..digits_len].bytes() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(digit - b'0')))
            .ok_or_else(|| TargetError::Overflow(text.to_string()))?;
    }

    Ok(if negative { -value } else { value })
}

/// Strict format check the editor form runs before saving.
///
/// An empty string is accepted and means "no target".
pub fn validate_target(text: &str, metric_type: MetricType) -> Result<(), TargetError> {
    if text.is_empty() {
        return Ok(());
    }

    match metric_type {
        MetricType::Integer | MetricType::Currency => {
            if !all_digits(text) {
                return Err(TargetError::NotANumber(text.to_string()));
            }
            parse_leading_int(text).map(|_| ())
        }
        MetricType::Duration => {
            let fields: Vec<&str> = text.split(':').collect();
            if fields.len() != 3 || !fields.iter().all(|f| all_digits(f)) {
                return Err(TargetError::DurationShape(text.to_string()));
            }
            let hours = parse_leading_int(fields[1])?;
            if hours >= 24 {
                return Err(TargetError::OutOfRange {
                    field: "hours",
                    value: hours,
                    limit: 24,
                });
            }
            let minutes = parse_leading_int(fields[2])?;
            if minutes >= 60 {
                return Err(TargetError::OutOfRange {
                    field: "minutes",
                    value: minutes,
                    limit: 60,
                });
            }
            parse_duration(text).map(|_| ())
        }
    }
}

fn all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
