//! Compliance flag tokens and their human descriptions.
//!
//! Flags are persisted by callers as plain string tokens (`UNDERUSE`, `OVERUSE`,
//! `HOLD_DAYS:<n>`), so the token form is the canonical serialisation. The description lookup is
//! data only and lives outside the engine's contract; it is kept here so every caller renders the
//! same wording.

use crate::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

const UNDERUSE: &str = "UNDERUSE";
const OVERUSE: &str = "OVERUSE";
const HOLD_DAYS_PREFIX: &str = "HOLD_DAYS:";

/// A diagnostic flag raised by a compliance computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComplianceFlag {
    /// Compliance below 90%.
    Underuse,
    /// Compliance above 110%.
    Overuse,
    /// Hold days shortened the window; carries the literal hold-day count.
    HoldDays(i64),
}

impl ComplianceFlag {
    /// The stored token form: `UNDERUSE`, `OVERUSE` or `HOLD_DAYS:<n>`.
    pub fn token(&self) -> String {
        self.to_string()
    }

    /// Human-readable description shown alongside the token.
    ///
    /// `HoldDays` uses the singular for exactly one day.
    pub fn description(&self) -> String {
        match self {
            ComplianceFlag::Underuse => "Usage below 90% — investigate missed doses".into(),
            ComplianceFlag::Overuse => "Usage above 110% — possible overadherence".into(),
            ComplianceFlag::HoldDays(n) => {
                format!("Paused for {n} hold day{}", if *n == 1 { "" } else { "s" })
            }
        }
    }
}

impl fmt::Display for ComplianceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceFlag::Underuse => f.write_str(UNDERUSE),
            ComplianceFlag::Overuse => f.write_str(OVERUSE),
            ComplianceFlag::HoldDays(n) => write!(f, "{HOLD_DAYS_PREFIX}{n}"),
        }
    }
}

impl FromStr for ComplianceFlag {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            UNDERUSE => Ok(ComplianceFlag::Underuse),
            OVERUSE => Ok(ComplianceFlag::Overuse),
            _ => s
                .strip_prefix(HOLD_DAYS_PREFIX)
                .and_then(|n| n.parse::<i64>().ok())
                .map(ComplianceFlag::HoldDays)
                .ok_or_else(|| CoreError::InvalidFlag(s.to_string())),
        }
    }
}

impl serde::Serialize for ComplianceFlag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ComplianceFlag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Describe a stored flag token, including tokens this version does not recognise.
///
/// `HOLD_DAYS:` tokens take their count from the last non-empty `:`-separated segment; when
/// that is not an integer the description falls back to "Includes hold days". Unknown tokens
/// are humanised (`SOME_FLAG` becomes `Some Flag`, `late-return` becomes `Late-Return`) rather
/// than rejected, since stored records may predate or postdate the current flag set.
///
/// # Arguments
///
/// * `token` - Flag token as persisted by a caller.
///
/// # Returns
///
/// A human-readable description suitable for display next to the token.
pub fn describe_token(token: &str) -> String {
    if token.starts_with(HOLD_DAYS_PREFIX) {
        return token
            .rsplit(':')
            .find(|segment| !segment.is_empty())
            .and_then(|n| n.parse::<i64>().ok())
            .map(|n| ComplianceFlag::HoldDays(n).description())
            .unwrap_or_else(|| "Includes hold days".into());
    }
    match token {
        UNDERUSE => ComplianceFlag::Underuse.description(),
        OVERUSE => ComplianceFlag::Overuse.description(),
        _ => capitalise_words(&token.replace('_', " ")),
    }
}

/// Upper-case the first letter of every word and lower-case the rest. Any character that is not
/// alphanumeric ends a word.
fn capitalise_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_start = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(c);
            word_start = true;
        }
    }
    out
}
