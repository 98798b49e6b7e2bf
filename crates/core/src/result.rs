//! Computation output and its audit breakdown.
//!
//! The breakdown is populated alongside the scalar totals in a single pass, so a rendered
//! "how this was calculated" view always agrees with the stored result.

use crate::flags::ComplianceFlag;
use serde::{Deserialize, Serialize};

/// Intermediate values on the expected side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExpectedBreakdown {
    pub inclusive_days: i64,
    pub hold_days: i64,
    pub effective_days: i64,
    pub base_doses_per_day: f64,
    /// Present only for `PRN` with a supplied target.
    pub prn_target_per_day: Option<f64>,
    pub base_expected: f64,
    pub first_day_adjustment: f64,
    pub last_day_adjustment: f64,
    pub total_expected: f64,
}

/// Intermediate values on the actual side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ActualBreakdown {
    pub dispensed: f64,
    pub returned: f64,
    pub missed: f64,
    pub extra: f64,
    /// May be negative; preserved for audit.
    pub raw_actual: f64,
    pub after_rounding: f64,
    pub after_clamping: f64,
    pub partial_doses_enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComplianceBreakdown {
    pub expected: ExpectedBreakdown,
    pub actual: ActualBreakdown,
}

/// Result of one compliance computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComplianceResult {
    pub expected_doses: f64,
    pub actual_doses: f64,
    /// Percentage in `[0, 150]`.
    pub compliance_pct: f64,
    /// Flag tokens: `UNDERUSE`, `OVERUSE`, `HOLD_DAYS:<n>`.
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub flags: Vec<ComplianceFlag>,
    pub breakdown: ComplianceBreakdown,
}

impl ComplianceResult {
    /// Flags in their stored token form, in the order they were raised.
    pub fn flag_tokens(&self) -> Vec<String> {
        self.flags.iter().map(ComplianceFlag::token).collect()
    }

    /// Human-readable descriptions, index-aligned with [`Self::flag_tokens`].
    pub fn flag_descriptions(&self) -> Vec<String> {
        self.flags.iter().map(ComplianceFlag::description).collect()
    }
}
