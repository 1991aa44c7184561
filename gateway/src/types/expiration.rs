//! Parsing of presigned URL expirations
//!
//! Expirations use Go duration syntax (`15m`, `1h30m`, `1.5h`, `300ms`) so
//! existing clients keep working unchanged.

use std::time::Duration;

use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Fraction digits beyond this are ignored
const MAX_FRACTION_DIGITS: usize = 18;

/// Errors produced while parsing an expiration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpirationError {
    /// Input does not follow the duration grammar
    #[error("invalid duration {0:?}")]
    Invalid(String),

    /// A number is not followed by a unit
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    /// Unit is not one of ns, us, µs, ms, s, m, h
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit {
        /// The offending unit
        unit: String,
        /// Full input
        input: String,
    },

    /// Value does not fit in a duration
    #[error("duration {0:?} is out of range")]
    Overflow(String),

    /// Zero or negative expiration
    #[error("duration {0:?} must be positive")]
    NotPositive(String),
}

/// Resolves the `expiration` query parameter
///
/// A missing or empty value yields `fallback`.
///
/// # Errors
///
/// Returns an `ExpirationError` when the value cannot be parsed or is not
/// strictly positive
pub fn parse_expiration(raw: Option<&str>, fallback: Duration) -> Result<Duration, ExpirationError> {
    match raw {
        None | Some("") => Ok(fallback),
        Some(value) => {
            let duration = parse_duration(value)?;
            if duration.is_zero() {
                return Err(ExpirationError::NotPositive(value.to_string()));
            }
            Ok(duration)
        }
    }
}

/// Parses a Go-style duration string. Negative durations are rejected.
///
/// # Errors
///
/// Returns an `ExpirationError` describing why `input` is not a duration
pub fn parse_duration(input: &str) -> Result<Duration, ExpirationError> {
    let invalid = || ExpirationError::Invalid(input.to_string());

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after_dot) => split_digits(after_dot),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_end = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_end);
        let scale = unit_nanos(unit, input)?;

        let whole_value: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| ExpirationError::Overflow(input.to_string()))?
        };

        let mut nanos = whole_value
            .checked_mul(scale)
            .ok_or_else(|| ExpirationError::Overflow(input.to_string()))?;

        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let fraction_value: u128 = digits.parse().map_err(|_| invalid())?;
            let divisor = 10u128.pow(u32::try_from(digits.len()).map_err(|_| invalid())?);
            nanos = nanos
                .checked_add(fraction_value * scale / divisor)
                .ok_or_else(|| ExpirationError::Overflow(input.to_string()))?;
        }

        total = total
            .checked_add(nanos)
            .ok_or_else(|| ExpirationError::Overflow(input.to_string()))?;
        rest = after;
    }

    if negative && total > 0 {
        return Err(ExpirationError::NotPositive(input.to_string()));
    }

    let seconds = u64::try_from(total / NANOS_PER_SECOND)
        .map_err(|_| ExpirationError::Overflow(input.to_string()))?;
    let subsec = u32::try_from(total % NANOS_PER_SECOND).map_err(|_| invalid())?;

    Ok(Duration::new(seconds, subsec))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn unit_nanos(unit: &str, input: &str) -> Result<u128, ExpirationError> {
    match unit {
        "ns" => Ok(1),
        "us" | "µs" | "μs" => Ok(NANOS_PER_MICRO),
        "ms" => Ok(NANOS_PER_MILLI),
        "s" => Ok(NANOS_PER_SECOND),
        "m" => Ok(60 * NANOS_PER_SECOND),
        "h" => Ok(3600 * NANOS_PER_SECOND),
        "" => Err(ExpirationError::MissingUnit(input.to_string())),
        other => Err(ExpirationError::UnknownUnit {
            unit: other.to_string(),
            input: input.to_string(),
        }),
    }
}
