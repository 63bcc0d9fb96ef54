//! Duration strings for command-line flags.
//!
//! Accepts the familiar unit-suffixed form used by nginx-adjacent tooling:
//! one or more `<number><unit>` pairs, e.g. `300ms`, `1m`, `1h30m`, `1.5h`.
//! Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is allowed.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration '{0}'")]
    Invalid(String),
    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),
    #[error("unknown unit '{unit}' in duration '{input}'")]
    UnknownUnit { unit: String, input: String },
    #[error("duration '{0}' out of range")]
    Overflow(String),
}

const NANOS_PER_UNIT: [(&str, u128); 7] = [
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

/// Parse a duration such as `24h` or `1m30s`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let invalid = || DurationError::Invalid(input.to_string());
    let mut rest = s;
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." {
            return Err(invalid());
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }

        let scale = NANOS_PER_UNIT
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| DurationError::UnknownUnit {
                unit: unit.to_string(),
                input: input.to_string(),
            })?;

        total = total
            .checked_add(scaled(number, scale).ok_or_else(invalid)?)
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
        rest = tail;
    }

    let secs = u64::try_from(total / 1_000_000_000)
        .map_err(|_| DurationError::Overflow(input.to_string()))?;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}

/// `number` (decimal, optional fraction) times `scale` nanoseconds.
fn scaled(number: &str, scale: u128) -> Option<u128> {
    let (whole, frac) = match number.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (number, ""),
    };
    if frac.contains('.') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(scale)?;

    // Fractions finer than a nanosecond are dropped.
    let mut divisor = 1u128;
    for digit in frac.bytes() {
        divisor = divisor.checked_mul(10)?;
        let value = u128::from(digit - b'0');
        nanos = nanos.checked_add(value.checked_mul(scale)? / divisor)?;
    }
    Some(nanos)
}
