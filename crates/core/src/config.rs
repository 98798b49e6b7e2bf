//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services. Reading the
//! environment during request handling would let two computations in the same study use
//! different calendars, which shifts day counts around midnight.

use crate::{CoreError, CoreResult};
use chrono::{FixedOffset, Offset, Utc};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    utc_offset: FixedOffset,
}

impl CoreConfig {
    pub fn new(utc_offset: FixedOffset) -> Self {
        Self { utc_offset }
    }

    /// Resolve from the raw value of [`crate::constants::UTC_OFFSET_ENV`].
    pub fn from_env_value(value: Option<String>) -> CoreResult<Self> {
        Ok(Self::new(utc_offset_from_env_value(value)?))
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// The calendar every computation in this process should use.
    pub fn calendar(&self) -> &FixedOffset {
        &self.utc_offset
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(utc())
    }
}

/// Parse the study calendar's UTC offset from an optional string value.
///
/// `None`, empty or whitespace yields UTC. Accepted forms: `Z`, `UTC`, `+HH:MM`, `-HH:MM`,
/// `+HHMM`, `-HHMM`.
pub fn utc_offset_from_env_value(value: Option<String>) -> CoreResult<FixedOffset> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(utc()),
        Some(v) => parse_utc_offset(&v),
    }
}

fn parse_utc_offset(value: &str) -> CoreResult<FixedOffset> {
    let invalid = || CoreError::InvalidInput(format!("invalid UTC offset: {value}"));

    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }

    let (sign, rest) = if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };

    let digits: String = match rest.split_once(':') {
        Some((h, m)) if h.len() == 2 && m.len() == 2 => format!("{h}{m}"),
        Some(_) => return Err(invalid()),
        None => rest.to_string(),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn utc() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_is_utc() {
        assert_eq!(utc_offset_from_env_value(None).expect("none"), utc());
        assert_eq!(
            utc_offset_from_env_value(Some("   ".into())).expect("blank"),
            utc()
        );
        assert_eq!(utc_offset_from_env_value(Some("Z".into())).expect("z"), utc());
        assert_eq!(utc_offset_from_env_value(Some("utc".into())).expect("utc"), utc());
    }

    #[test]
    fn parses_signed_offsets() {
        let east = utc_offset_from_env_value(Some("+05:30".into())).expect("east");
        assert_eq!(east.local_minus_utc(), 5 * 3600 + 30 * 60);

        let west = utc_offset_from_env_value(Some("-0800".into())).expect("west");
        assert_eq!(west.local_minus_utc(), -8 * 3600);
    }

    #[test]
    fn rejects_malformed_offsets() {
        for bad in ["05:00", "+5:00", "+05:60", "+0500x", "+25:00", "EST"] {
            let err = utc_offset_from_env_value(Some(bad.into())).expect_err("should reject");
            assert!(
                matches!(err, CoreError::InvalidInput(ref msg) if msg.contains("invalid UTC offset")),
                "unexpected error for {bad}: {err:?}"
            );
        }
    }

    #[test]
    fn config_exposes_calendar() {
        let cfg = CoreConfig::from_env_value(Some("+01:00".into())).expect("config");
        assert_eq!(cfg.calendar().local_minus_utc(), 3600);
        assert_eq!(CoreConfig::default().utc_offset(), utc());
    }
}
