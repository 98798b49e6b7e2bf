//! Dosing frequencies.
//!
//! A frequency is one of the fixed schedule codes used on case report forms. Scheduled codes carry
//! an integer number of doses per day; `PRN` ("as needed") carries none, so an expectation for it
//! can only be formed from an explicit per-day target supplied by the caller.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dosing schedule code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum DosingFrequency {
    #[serde(rename = "QD")]
    Qd,
    #[serde(rename = "BID")]
    Bid,
    #[serde(rename = "TID")]
    Tid,
    #[serde(rename = "QID")]
    Qid,
    #[serde(rename = "PRN")]
    Prn,
}

impl DosingFrequency {
    /// All codes in display order.
    pub const ALL: [DosingFrequency; 5] = [
        DosingFrequency::Qd,
        DosingFrequency::Bid,
        DosingFrequency::Tid,
        DosingFrequency::Qid,
        DosingFrequency::Prn,
    ];

    /// Fixed doses per day for scheduled codes, `None` for `PRN`.
    pub fn doses_per_day(self) -> Option<u32> {
        match self {
            DosingFrequency::Qd => Some(1),
            DosingFrequency::Bid => Some(2),
            DosingFrequency::Tid => Some(3),
            DosingFrequency::Qid => Some(4),
            DosingFrequency::Prn => None,
        }
    }

    /// `true` for `PRN`, whose expectation comes from a caller-supplied target.
    pub fn is_prn(self) -> bool {
        matches!(self, DosingFrequency::Prn)
    }

    /// The schedule code as written on forms and on the wire (`QD`, `BID`, ...).
    pub fn code(self) -> &'static str {
        match self {
            DosingFrequency::Qd => "QD",
            DosingFrequency::Bid => "BID",
            DosingFrequency::Tid => "TID",
            DosingFrequency::Qid => "QID",
            DosingFrequency::Prn => "PRN",
        }
    }

    /// Plain-language label for display, e.g. "Twice daily".
    pub fn label(self) -> &'static str {
        match self {
            DosingFrequency::Qd => "Once daily",
            DosingFrequency::Bid => "Twice daily",
            DosingFrequency::Tid => "Three times daily",
            DosingFrequency::Qid => "Four times daily",
            DosingFrequency::Prn => "As needed",
        }
    }
}

impl fmt::Display for DosingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DosingFrequency {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let code = s.trim();
        DosingFrequency::ALL
            .into_iter()
            .find(|f| f.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| CoreError::UnknownFrequency(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_codes_carry_fixed_rates() {
        assert_eq!(DosingFrequency::Qd.doses_per_day(), Some(1));
        assert_eq!(DosingFrequency::Bid.doses_per_day(), Some(2));
        assert_eq!(DosingFrequency::Tid.doses_per_day(), Some(3));
        assert_eq!(DosingFrequency::Qid.doses_per_day(), Some(4));
        assert_eq!(DosingFrequency::Prn.doses_per_day(), None);
    }

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("bid".parse::<DosingFrequency>().expect("bid"), DosingFrequency::Bid);
        assert_eq!(" PRN ".parse::<DosingFrequency>().expect("prn"), DosingFrequency::Prn);
    }

    #[test]
    fn rejects_unknown_code() {
        let err = "q4h".parse::<DosingFrequency>().expect_err("should reject");
        assert!(matches!(err, CoreError::UnknownFrequency(code) if code == "q4h"));
    }

    #[test]
    fn serialises_as_upper_case_code() {
        let json = serde_json::to_string(&DosingFrequency::Tid).expect("serialize");
        assert_eq!(json, "\"TID\"");
        let parsed: DosingFrequency = serde_json::from_str("\"QID\"").expect("deserialize");
        assert_eq!(parsed, DosingFrequency::Qid);
    }

    #[test]
    fn display_matches_code() {
        for freq in DosingFrequency::ALL {
            assert_eq!(freq.to_string(), freq.code());
        }
    }
}
