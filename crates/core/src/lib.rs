//! # StudyCoor Core
//!
//! Medication compliance for clinical-study visits.
//!
//! Given a dosing window, a schedule and the counts recorded at a visit, this crate computes how
//! many doses were expected, how many were actually taken, the resulting compliance percentage
//! and a set of diagnostic flags, together with a full audit breakdown of every intermediate.
//!
//! - [`ComplianceEngine::compute`] is the single pure entry point.
//! - [`Calendar`] is the injected day-boundary capability.
//! - [`Visit`] runs the engine for several drugs sharing one window.
//! - [`wire`] parses strict YAML/JSON request records.
//!
//! **No API concerns**: HTTP servers and CLIs belong in `studycoor-api-rest` and `studycoor-cli`.
//! Persistence of results is the caller's business.

pub mod bottles;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod defaults;
pub mod engine;
pub mod flags;
pub mod frequency;
pub mod input;
pub mod result;
pub mod validation;
pub mod visit;
pub mod wire;

mod error;

pub use bottles::{Bottle, BottleTotals};
pub use calendar::{days_between_inclusive, Calendar};
pub use config::CoreConfig;
pub use defaults::DosingDefaults;
pub use engine::ComplianceEngine;
pub use error::{ComplianceError, CoreError, CoreResult};
pub use flags::{describe_token, ComplianceFlag};
pub use frequency::DosingFrequency;
pub use input::ComplianceInput;
pub use result::{ActualBreakdown, ComplianceBreakdown, ComplianceResult, ExpectedBreakdown};
pub use visit::{DrugDosing, DrugResult, Visit, VisitError, VisitResult, VisitWindow};
pub use wire::{CalculationRecord, DrugRecord, VisitRecord};
