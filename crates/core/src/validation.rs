//! Input validation.
//!
//! Checks run before any arithmetic and stop at the first violation, in the order
//! negativity, then date ordering, then the returned/dispensed relationship.

use crate::input::ComplianceInput;
use crate::ComplianceError;

/// Validates the invariants of a [`ComplianceInput`].
///
/// # Errors
///
/// - [`ComplianceError::NegativeValues`] if dispensed, returned, missed, extra or hold days is
///   negative (NaN counts as negative).
/// - [`ComplianceError::InvalidDates`] if the end date precedes the start date.
/// - [`ComplianceError::ReturnedExceedsDispensed`] if more units came back than went out.
pub fn validate_input(input: &ComplianceInput) -> Result<(), ComplianceError> {
    let quantities = [
        input.dispensed,
        input.returned,
        input.missed_doses,
        input.extra_doses,
    ];
    if !quantities.into_iter().all(is_non_negative) || input.hold_days < 0 {
        return Err(ComplianceError::NegativeValues);
    }

    if input.end_date < input.start_date {
        return Err(ComplianceError::InvalidDates);
    }

    if input.returned > input.dispensed {
        return Err(ComplianceError::ReturnedExceedsDispensed);
    }

    Ok(())
}

fn is_non_negative(value: f64) -> bool {
    value >= 0.0
}
