//! Study and drug dosing defaults.
//!
//! Studies and the drugs within them carry defaults for new calculations. Drug-level defaults
//! win over study-level ones, and explicit per-calculation choices win over both.

use crate::frequency::DosingFrequency;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct DosingDefaults {
    pub frequency: DosingFrequency,
    #[serde(default)]
    pub partial_dose_enabled: bool,
    #[serde(default)]
    pub prn_target_per_day: Option<f64>,
}

impl Default for DosingDefaults {
    fn default() -> Self {
        Self {
            frequency: DosingFrequency::Qd,
            partial_dose_enabled: false,
            prn_target_per_day: None,
        }
    }
}

impl DosingDefaults {
    /// Pick the defaults that apply: the drug's if present, else the study's, else QD.
    pub fn resolve(study: Option<&DosingDefaults>, drug: Option<&DosingDefaults>) -> Self {
        drug.or(study).cloned().unwrap_or_default()
    }

    /// Apply explicit choices on top of these defaults.
    ///
    /// The PRN target is dropped unless the resulting frequency is `PRN`.
    pub fn overridden_by(
        &self,
        frequency: Option<DosingFrequency>,
        partial_dose_enabled: Option<bool>,
        prn_target_per_day: Option<f64>,
    ) -> Self {
        let frequency = frequency.unwrap_or(self.frequency);
        Self {
            frequency,
            partial_dose_enabled: partial_dose_enabled.unwrap_or(self.partial_dose_enabled),
            prn_target_per_day: if frequency.is_prn() {
                prn_target_per_day.or(self.prn_target_per_day)
            } else {
                None
            },
        }
    }
}
