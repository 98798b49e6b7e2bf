//! The caller-constructed request for one compliance computation.

use crate::bottles::{Bottle, BottleTotals};
use crate::frequency::DosingFrequency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inputs for a single dosing period.
///
/// Values are taken as supplied: text parsing and locale handling belong to the caller, and the
/// engine validates (rather than clamps) the numeric invariants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComplianceInput {
    /// Aggregate dose units dispensed.
    pub dispensed: f64,
    /// Aggregate dose units returned.
    pub returned: f64,
    /// First day of the dosing window. Time of day is ignored.
    pub start_date: DateTime<Utc>,
    /// Last day of the dosing window, inclusive.
    pub end_date: DateTime<Utc>,
    pub frequency: DosingFrequency,
    pub missed_doses: f64,
    pub extra_doses: f64,
    /// Days within the window on which dosing was paused.
    pub hold_days: i64,
    /// Keep fractional actual totals instead of rounding to whole units.
    pub partial_dose_enabled: bool,
    /// Expected doses per day for `PRN`; ignored for scheduled frequencies.
    #[serde(default)]
    pub prn_target_per_day: Option<f64>,
    /// Doses expected on the first day of the effective window (`0..=doses_per_day`).
    #[serde(default)]
    pub first_day_expected_override: Option<i64>,
    /// Doses expected on the last day of the effective window (`0..=doses_per_day`).
    #[serde(default)]
    pub last_day_expected_override: Option<i64>,
}

impl ComplianceInput {
    /// Creates an input with no adjustments, holds, overrides or PRN target.
    pub fn new(
        dispensed: f64,
        returned: f64,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        frequency: DosingFrequency,
    ) -> Self {
        Self {
            dispensed,
            returned,
            start_date,
            end_date,
            frequency,
            missed_doses: 0.0,
            extra_doses: 0.0,
            hold_days: 0,
            partial_dose_enabled: false,
            prn_target_per_day: None,
            first_day_expected_override: None,
            last_day_expected_override: None,
        }
    }

    /// Replace the aggregate dispensed/returned counts with bottle sums.
    ///
    /// An empty slice leaves the aggregate counts untouched.
    pub fn with_bottles(mut self, bottles: &[Bottle]) -> Self {
        if let Some(totals) = BottleTotals::from_bottles(bottles) {
            self.dispensed = totals.dispensed;
            self.returned = totals.returned;
        }
        self
    }
}
