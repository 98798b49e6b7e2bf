//! Multi-drug visits.
//!
//! In multi-drug studies a single visit window (dates, hold days, edge-day overrides) applies to
//! every drug, while each drug brings its own schedule, counts and bottles. A visit is computed
//! all-or-nothing: the first drug that fails validation aborts the whole visit.

use crate::bottles::Bottle;
use crate::calendar::Calendar;
use crate::engine::ComplianceEngine;
use crate::frequency::DosingFrequency;
use crate::input::ComplianceInput;
use crate::result::ComplianceResult;
use crate::ComplianceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Window shared by every drug of a visit.
#[derive(Clone, Debug, PartialEq)]
pub struct VisitWindow {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub hold_days: i64,
    pub first_day_expected_override: Option<i64>,
    pub last_day_expected_override: Option<i64>,
}

/// Per-drug dosing and accounting for one visit.
#[derive(Clone, Debug, PartialEq)]
pub struct DrugDosing {
    pub name: String,
    pub frequency: DosingFrequency,
    pub partial_dose_enabled: bool,
    pub prn_target_per_day: Option<f64>,
    /// Used when no bottles are recorded.
    pub dispensed: f64,
    /// Used when no bottles are recorded.
    pub returned: f64,
    pub missed_doses: f64,
    pub extra_doses: f64,
    pub bottles: Vec<Bottle>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Visit {
    pub window: VisitWindow,
    pub drugs: Vec<DrugDosing>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DrugResult {
    pub name: String,
    pub result: ComplianceResult,
}

/// Results in the order the drugs were listed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VisitResult {
    pub drugs: Vec<DrugResult>,
}

impl VisitResult {
    pub fn get(&self, name: &str) -> Option<&ComplianceResult> {
        self.drugs.iter().find(|d| d.name == name).map(|d| &d.result)
    }
}

/// A drug in the visit failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{drug}: {source}")]
pub struct VisitError {
    pub drug: String,
    #[source]
    pub source: ComplianceError,
}

impl Visit {
    /// Build the engine input for `drug` within this visit's window.
    pub fn input_for(&self, drug: &DrugDosing) -> ComplianceInput {
        let w = &self.window;
        ComplianceInput {
            dispensed: drug.dispensed,
            returned: drug.returned,
            start_date: w.start_date,
            end_date: w.end_date,
            frequency: drug.frequency,
            missed_doses: drug.missed_doses,
            extra_doses: drug.extra_doses,
            hold_days: w.hold_days,
            partial_dose_enabled: drug.partial_dose_enabled,
            prn_target_per_day: if drug.frequency.is_prn() {
                drug.prn_target_per_day
            } else {
                None
            },
            first_day_expected_override: w.first_day_expected_override,
            last_day_expected_override: w.last_day_expected_override,
        }
        .with_bottles(&drug.bottles)
    }

    /// Compute every drug in the visit.
    ///
    /// # Errors
    ///
    /// Returns a [`VisitError`] naming the first drug whose input is invalid. No results are
    /// returned for any drug in that case.
    pub fn compute<C: Calendar + ?Sized>(&self, calendar: &C) -> Result<VisitResult, VisitError> {
        let drugs = self
            .drugs
            .iter()
            .map(|drug| {
                ComplianceEngine::compute(&self.input_for(drug), calendar)
                    .map(|result| DrugResult {
                        name: drug.name.clone(),
                        result,
                    })
                    .map_err(|source| VisitError {
                        drug: drug.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(drugs = drugs.len(), "visit computed");
        Ok(VisitResult { drugs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .expect("valid date")
    }

    fn drug(name: &str, frequency: DosingFrequency, bottles: Vec<Bottle>) -> DrugDosing {
        DrugDosing {
            name: name.into(),
            frequency,
            partial_dose_enabled: false,
            prn_target_per_day: None,
            dispensed: 0.0,
            returned: 0.0,
            missed_doses: 0.0,
            extra_doses: 0.0,
            bottles,
        }
    }

    fn visit(drugs: Vec<DrugDosing>) -> Visit {
        Visit {
            window: VisitWindow {
                start_date: day(2025, 5, 1),
                end_date: day(2025, 5, 10),
                hold_days: 1,
                first_day_expected_override: None,
                last_day_expected_override: None,
            },
            drugs,
        }
    }

    #[test]
    fn computes_each_drug_against_shared_window() {
        let v = visit(vec![
            drug("Drug A", DosingFrequency::Qd, vec![Bottle::new("A1", 10.0, 1.0)]),
            drug(
                "Drug B",
                DosingFrequency::Bid,
                vec![Bottle::new("B1", 10.0, 0.0), Bottle::new("B2", 10.0, 2.0)],
            ),
        ]);

        let out = v.compute(&Utc).expect("visit");
        assert_eq!(out.drugs.len(), 2);

        let a = out.get("Drug A").expect("drug a");
        assert_eq!(a.expected_doses, 9.0);
        assert_eq!(a.actual_doses, 9.0);
        assert_eq!(a.compliance_pct, 100.0);

        let b = out.get("Drug B").expect("drug b");
        assert_eq!(b.expected_doses, 18.0);
        assert_eq!(b.actual_doses, 18.0);
        assert_eq!(b.flags, vec![crate::ComplianceFlag::HoldDays(1)]);
    }

    #[test]
    fn prn_target_only_applies_to_prn_drugs() {
        let mut scheduled = drug("Scheduled", DosingFrequency::Qd, vec![]);
        scheduled.prn_target_per_day = Some(5.0);
        let v = visit(vec![scheduled.clone()]);
        assert_eq!(v.input_for(&scheduled).prn_target_per_day, None);
    }

    #[test]
    fn aggregate_counts_used_without_bottles() {
        let mut d = drug("Aggregate", DosingFrequency::Qd, vec![]);
        d.dispensed = 12.0;
        d.returned = 3.0;
        let v = visit(vec![d.clone()]);
        let input = v.input_for(&d);
        assert_eq!(input.dispensed, 12.0);
        assert_eq!(input.returned, 3.0);
    }

    #[test]
    fn first_failure_aborts_visit() {
        let v = visit(vec![
            drug("Good", DosingFrequency::Qd, vec![Bottle::new("G", 10.0, 0.0)]),
            drug("Bad", DosingFrequency::Qd, vec![Bottle::new("X", 1.0, 5.0)]),
        ]);

        let err = v.compute(&Utc).expect_err("should fail");
        assert_eq!(err.drug, "Bad");
        assert_eq!(err.source, ComplianceError::ReturnedExceedsDispensed);
        assert_eq!(err.to_string(), "Bad: Returned cannot exceed dispensed.");
    }
}
