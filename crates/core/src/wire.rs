//! Record wire format.
//!
//! Calculation requests arrive as YAML documents (CLI files) or JSON bodies (REST). Both map onto
//! the strict records in this module, which are then translated into domain inputs:
//!
//! - unknown keys are rejected (`deny_unknown_fields`),
//! - schema mismatches report the path of the failing field,
//! - dates accept RFC 3339 timestamps or plain `YYYY-MM-DD` (midnight UTC),
//! - dosing choices left out fall back to drug defaults, then study defaults, then `QD`.

use crate::bottles::Bottle;
use crate::defaults::DosingDefaults;
use crate::frequency::DosingFrequency;
use crate::input::ComplianceInput;
use crate::visit::{DrugDosing, Visit, VisitWindow};
use crate::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One calculation request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct CalculationRecord {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub frequency: Option<DosingFrequency>,
    #[serde(default)]
    pub dispensed: f64,
    #[serde(default)]
    pub returned: f64,
    #[serde(default)]
    pub missed_doses: f64,
    #[serde(default)]
    pub extra_doses: f64,
    #[serde(default)]
    pub hold_days: i64,
    #[serde(default)]
    pub partial_dose_enabled: Option<bool>,
    #[serde(default)]
    pub prn_target_per_day: Option<f64>,
    #[serde(default)]
    pub first_day_expected_override: Option<i64>,
    #[serde(default)]
    pub last_day_expected_override: Option<i64>,
    #[serde(default)]
    pub bottles: Vec<Bottle>,
    #[serde(default)]
    pub study_defaults: Option<DosingDefaults>,
    #[serde(default)]
    pub drug_defaults: Option<DosingDefaults>,
}

/// One multi-drug visit request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct VisitRecord {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub hold_days: i64,
    #[serde(default)]
    pub first_day_expected_override: Option<i64>,
    #[serde(default)]
    pub last_day_expected_override: Option<i64>,
    #[serde(default)]
    pub study_defaults: Option<DosingDefaults>,
    pub drugs: Vec<DrugRecord>,
}

/// A drug entry within a [`VisitRecord`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct DrugRecord {
    pub name: String,
    #[serde(default)]
    pub defaults: Option<DosingDefaults>,
    #[serde(default)]
    pub frequency: Option<DosingFrequency>,
    #[serde(default)]
    pub partial_dose_enabled: Option<bool>,
    #[serde(default)]
    pub prn_target_per_day: Option<f64>,
    #[serde(default)]
    pub dispensed: f64,
    #[serde(default)]
    pub returned: f64,
    #[serde(default)]
    pub missed_doses: f64,
    #[serde(default)]
    pub extra_doses: f64,
    #[serde(default)]
    pub bottles: Vec<Bottle>,
}

impl CalculationRecord {
    /// Parse a calculation record from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaMismatch`] naming the failing field if the YAML does not match
    /// the record schema, including unknown keys.
    pub fn parse(yaml_text: &str) -> CoreResult<Self> {
        parse_yaml(yaml_text)
    }

    /// Translate into an engine input.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDate`] if either date is malformed.
    pub fn to_input(&self) -> CoreResult<ComplianceInput> {
        let defaults =
            DosingDefaults::resolve(self.study_defaults.as_ref(), self.drug_defaults.as_ref());
        let dosing = defaults.overridden_by(
            self.frequency,
            self.partial_dose_enabled,
            self.prn_target_per_day,
        );

        let mut input = ComplianceInput::new(
            self.dispensed,
            self.returned,
            parse_date(&self.start_date)?,
            parse_date(&self.end_date)?,
            dosing.frequency,
        );
        input.missed_doses = self.missed_doses;
        input.extra_doses = self.extra_doses;
        input.hold_days = self.hold_days;
        input.partial_dose_enabled = dosing.partial_dose_enabled;
        input.prn_target_per_day = dosing.prn_target_per_day;
        input.first_day_expected_override = self.first_day_expected_override;
        input.last_day_expected_override = self.last_day_expected_override;

        Ok(input.with_bottles(&self.bottles))
    }
}

impl VisitRecord {
    /// Parse a visit record from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SchemaMismatch`] naming the failing field if the YAML does not match
    /// the record schema.
    pub fn parse(yaml_text: &str) -> CoreResult<Self> {
        parse_yaml(yaml_text)
    }

    /// Translate into a [`Visit`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDate`] for malformed dates and [`CoreError::InvalidInput`] for
    /// a blank drug name.
    pub fn to_visit(&self) -> CoreResult<Visit> {
        let window = VisitWindow {
            start_date: parse_date(&self.start_date)?,
            end_date: parse_date(&self.end_date)?,
            hold_days: self.hold_days,
            first_day_expected_override: self.first_day_expected_override,
            last_day_expected_override: self.last_day_expected_override,
        };

        let drugs = self
            .drugs
            .iter()
            .map(|d| self.drug_dosing(d))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Visit { window, drugs })
    }

    fn drug_dosing(&self, record: &DrugRecord) -> CoreResult<DrugDosing> {
        let name = record.name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("drug name cannot be empty".into()));
        }

        let defaults =
            DosingDefaults::resolve(self.study_defaults.as_ref(), record.defaults.as_ref());
        let dosing = defaults.overridden_by(
            record.frequency,
            record.partial_dose_enabled,
            record.prn_target_per_day,
        );

        Ok(DrugDosing {
            name: name.to_owned(),
            frequency: dosing.frequency,
            partial_dose_enabled: dosing.partial_dose_enabled,
            prn_target_per_day: dosing.prn_target_per_day,
            dispensed: record.dispensed,
            returned: record.returned,
            missed_doses: record.missed_doses,
            extra_doses: record.extra_doses,
            bottles: record.bottles.clone(),
        })
    }
}

/// Parse a date from an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
///
/// # Errors
///
/// Returns [`CoreError::InvalidDate`] if neither form matches.
pub fn parse_date(value: &str) -> CoreResult<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CoreError::InvalidDate(value.to_string()))
}

/// Render any serialisable record or result as YAML.
///
/// # Errors
///
/// Returns [`CoreError::YamlSerialization`] if serialisation fails.
pub fn render_yaml<T: Serialize>(value: &T) -> CoreResult<String> {
    serde_yaml::to_string(value).map_err(CoreError::YamlSerialization)
}

fn parse_yaml<T: DeserializeOwned>(yaml_text: &str) -> CoreResult<T> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
    serde_path_to_error::deserialize::<_, T>(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        CoreError::SchemaMismatch {
            path: if path.is_empty() || path == "." {
                "<root>".into()
            } else {
                path
            },
            message: source.to_string(),
        }
    })
}
