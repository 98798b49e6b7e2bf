//! The compliance engine.
//!
//! A single pure pass over one [`ComplianceInput`]:
//!
//! 1. validate the input,
//! 2. count inclusive calendar days and subtract hold days,
//! 3. derive expected doses from the daily rate, then apply edge-day overrides,
//! 4. reconcile actual doses from dispensed/returned/missed/extra, rounding and clamping,
//! 5. derive the clamped percentage and the flags.
//!
//! Every intermediate is written into the [`ComplianceBreakdown`] as it is produced.

use crate::calendar::Calendar;
use crate::constants::{COMPLIANCE_PCT_CEILING, OVERUSE_ABOVE_PCT, UNDERUSE_BELOW_PCT};
use crate::flags::ComplianceFlag;
use crate::input::ComplianceInput;
use crate::result::{ActualBreakdown, ComplianceBreakdown, ComplianceResult, ExpectedBreakdown};
use crate::validation::validate_input;
use crate::ComplianceError;

/// Compliance computation operations.
///
/// Zero-sized namespace; the engine holds no state and is safe to call from any thread.
pub struct ComplianceEngine;

impl ComplianceEngine {
    /// Compute expected doses, actual doses, compliance percentage and flags for `input`.
    ///
    /// `calendar` decides where day boundaries fall when counting the window.
    ///
    /// # Errors
    ///
    /// Returns a [`ComplianceError`] if the input fails validation; no partial result is
    /// produced in that case.
    pub fn compute<C: Calendar + ?Sized>(
        input: &ComplianceInput,
        calendar: &C,
    ) -> Result<ComplianceResult, ComplianceError> {
        if let Err(err) = validate_input(input) {
            tracing::debug!(kind = err.kind(), "compliance input rejected");
            return Err(err);
        }

        let inclusive_days = calendar.days_between_inclusive(&input.start_date, &input.end_date);
        let effective_days = (inclusive_days - input.hold_days).max(0);

        let expected = expected_side(input, inclusive_days, effective_days);
        let actual = actual_side(input);
        let compliance_pct = compliance_pct(expected.total_expected, actual.after_clamping);

        let mut flags = Vec::new();
        if expected.total_expected > 0.0 {
            if compliance_pct < UNDERUSE_BELOW_PCT {
                flags.push(ComplianceFlag::Underuse);
            }
            if compliance_pct > OVERUSE_ABOVE_PCT {
                flags.push(ComplianceFlag::Overuse);
            }
        }
        if inclusive_days != effective_days {
            flags.push(ComplianceFlag::HoldDays(input.hold_days));
        }

        tracing::debug!(
            frequency = %input.frequency,
            expected = expected.total_expected,
            actual = actual.after_clamping,
            compliance_pct,
            flags = flags.len(),
            "compliance computed"
        );

        Ok(ComplianceResult {
            expected_doses: expected.total_expected,
            actual_doses: actual.after_clamping,
            compliance_pct,
            flags,
            breakdown: ComplianceBreakdown { expected, actual },
        })
    }
}

fn expected_side(
    input: &ComplianceInput,
    inclusive_days: i64,
    effective_days: i64,
) -> ExpectedBreakdown {
    let scheduled = input.frequency.doses_per_day();
    let base_doses_per_day = match scheduled {
        Some(per_day) => f64::from(per_day),
        None => input.prn_target_per_day.unwrap_or(0.0),
    };
    let base_expected = (base_doses_per_day * effective_days as f64).max(0.0);

    let mut first_day_adjustment = 0.0;
    let mut last_day_adjustment = 0.0;
    let mut total_expected = base_expected;

    // PRN has no per-day schedule for an override to deviate from.
    if let Some(per_day) = scheduled {
        let max_per_day = i64::from(per_day).max(0);
        let clamp = |value: i64| value.clamp(0, max_per_day);

        if effective_days == 1 {
            // The only remaining day is both edges; the last-day value wins.
            let chosen = input
                .last_day_expected_override
                .or(input.first_day_expected_override);
            if let Some(value) = chosen {
                let clamped = clamp(value) as f64;
                let delta = clamped - base_expected;
                if input.last_day_expected_override.is_some() {
                    last_day_adjustment = delta;
                } else {
                    first_day_adjustment = delta;
                }
                total_expected = clamped;
            }
        } else if effective_days >= 2 {
            let deviation = |value: Option<i64>| {
                value.map_or(0.0, |v| (clamp(v) - max_per_day) as f64)
            };
            first_day_adjustment = deviation(input.first_day_expected_override);
            last_day_adjustment = deviation(input.last_day_expected_override);
            total_expected =
                (total_expected + first_day_adjustment + last_day_adjustment).max(0.0);
        }
    }

    ExpectedBreakdown {
        inclusive_days,
        hold_days: input.hold_days,
        effective_days,
        base_doses_per_day,
        prn_target_per_day: if input.frequency.is_prn() {
            input.prn_target_per_day
        } else {
            None
        },
        base_expected,
        first_day_adjustment,
        last_day_adjustment,
        total_expected,
    }
}

fn actual_side(input: &ComplianceInput) -> ActualBreakdown {
    let raw_actual = (input.dispensed - input.returned) - input.missed_doses + input.extra_doses;
    // f64::round rounds half away from zero.
    let after_rounding = if input.partial_dose_enabled {
        raw_actual
    } else {
        raw_actual.round()
    };
    let after_clamping = after_rounding.max(0.0);

    ActualBreakdown {
        dispensed: input.dispensed,
        returned: input.returned,
        missed: input.missed_doses,
        extra: input.extra_doses,
        raw_actual,
        after_rounding,
        after_clamping,
        partial_doses_enabled: input.partial_dose_enabled,
    }
}

/// Zero expected is 100% when nothing was taken and 0% otherwise.
fn compliance_pct(expected: f64, actual: f64) -> f64 {
    if expected == 0.0 {
        return if actual == 0.0 { 100.0 } else { 0.0 };
    }
    ((actual / expected) * 100.0).clamp(0.0, COMPLIANCE_PCT_CEILING)
}
