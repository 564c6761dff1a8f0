//! Duration strings such as `"5m"`, `"1h30m"` or `"2d"`.
//!
//! A duration is an optionally signed sequence of decimal numbers, each with
//! an optional fraction and a mandatory unit. Supported units are `ns`, `us`
//! (or `µs`), `ms`, `s`, `m`, `h`, `d` and `w`. The bare string `"0"` is
//! accepted as zero.

use chrono::TimeDelta;

use crate::{NaspipError, Result};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => NANOS_PER_SECOND,
        "m" => 60 * NANOS_PER_SECOND,
        "h" => 3_600 * NANOS_PER_SECOND,
        "d" => 86_400 * NANOS_PER_SECOND,
        "w" => 604_800 * NANOS_PER_SECOND,
        _ => return None,
    };
    Some(nanos)
}

/// Parse a duration string into a [`TimeDelta`].
///
/// ```
/// use chrono::TimeDelta;
/// use naspip_lib::duration::parse_duration;
///
/// assert_eq!(parse_duration("1h30m").unwrap(), TimeDelta::minutes(90));
/// assert!(parse_duration("soon").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<TimeDelta> {
    let invalid = || NaspipError::InvalidDuration(input.to_string());

    let (negative, mut rest) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (whole, after) = rest.split_at(int_len);

        let (fraction, after) = match after.strip_prefix('.') {
            Some(tail) => {
                let frac_len = tail.bytes().take_while(u8::is_ascii_digit).count();
                tail.split_at(frac_len)
            }
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, tail) = after.split_at(unit_len);
        let scale = unit_nanos(unit).ok_or_else(invalid)?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut value = whole.checked_mul(scale).ok_or_else(invalid)?;

        if !fraction.is_empty() {
            // Precision beyond 18 digits cannot change a nanosecond result.
            let digits = &fraction[..fraction.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| invalid())?;
            let part = numerator.checked_mul(scale).ok_or_else(invalid)?
                / 10u128.pow(digits.len() as u32);
            value = value.checked_add(part).ok_or_else(invalid)?;
        }

        total = total.checked_add(value).ok_or_else(invalid)?;
        rest = tail;
    }

    let nanos = i64::try_from(total).map_err(|_| invalid())?;
    let delta = TimeDelta::nanoseconds(nanos);
    Ok(if negative { -delta } else { delta })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_duration("5m").unwrap(), TimeDelta::minutes(5));
        assert_eq!(parse_duration("10h").unwrap(), TimeDelta::hours(10));
        assert_eq!(parse_duration("2d").unwrap(), TimeDelta::days(2));
        assert_eq!(parse_duration("1w").unwrap(), TimeDelta::weeks(1));
        assert_eq!(parse_duration("250ms").unwrap(), TimeDelta::milliseconds(250));
        assert_eq!(parse_duration("3us").unwrap(), TimeDelta::microseconds(3));
        assert_eq!(parse_duration("3µs").unwrap(), TimeDelta::microseconds(3));
        assert_eq!(parse_duration("42ns").unwrap(), TimeDelta::nanoseconds(42));
    }

    #[test]
    fn parses_compound_and_fractional_values() {
        assert_eq!(parse_duration("1h30m").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_duration("1d12h").unwrap(), TimeDelta::hours(36));
        assert_eq!(parse_duration("1.5h").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_duration(".5s").unwrap(), TimeDelta::milliseconds(500));
        assert_eq!(parse_duration("10000h").unwrap(), TimeDelta::hours(10_000));
    }

    #[test]
    fn parses_zero_and_signs() {
        assert_eq!(parse_duration("0").unwrap(), TimeDelta::zero());
        assert_eq!(parse_duration("0s").unwrap(), TimeDelta::zero());
        assert_eq!(parse_duration("-1h").unwrap(), TimeDelta::hours(-1));
        assert_eq!(parse_duration("+2m").unwrap(), TimeDelta::minutes(2));
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "-", "5", "m", "5x", "1h 30m", "abc", ".s", "1.2.3s"] {
            assert!(
                matches!(parse_duration(bad), Err(NaspipError::InvalidDuration(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        for huge in [
            "99999999999999999999w",
            "9999999999999999999999h",
            "340282366920938463463374607431768211.999us",
        ] {
            assert!(
                matches!(parse_duration(huge), Err(NaspipError::InvalidDuration(_))),
                "{huge:?} should be rejected"
            );
        }
    }

    #[test]
    fn long_fractions_stay_in_range() {
        let parsed = parse_duration("1.999999999999999999w").unwrap();
        assert!(parsed < TimeDelta::weeks(2));
        assert!(parsed > TimeDelta::weeks(1));
    }
}
