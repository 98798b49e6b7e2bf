//! Per-bottle accounting.
//!
//! Sites often dispense several bottles per visit. When bottles are recorded their sums take the
//! place of the aggregate dispensed/returned counts.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(deny_unknown_fields)]
pub struct Bottle {
    pub label: String,
    pub dispensed: f64,
    #[serde(default)]
    pub returned: f64,
}

impl Bottle {
    /// Creates a bottle record.
    ///
    /// # Arguments
    ///
    /// * `label` - Site label for the bottle, e.g. "Bottle 1".
    /// * `dispensed` - Dose units handed out in this bottle.
    /// * `returned` - Dose units brought back in this bottle.
    pub fn new(label: impl Into<String>, dispensed: f64, returned: f64) -> Self {
        Self {
            label: label.into(),
            dispensed,
            returned,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BottleTotals {
    pub dispensed: f64,
    pub returned: f64,
}

impl BottleTotals {
    /// Sum dispensed and returned across `bottles`; `None` when there are no bottles.
    pub fn from_bottles(bottles: &[Bottle]) -> Option<Self> {
        if bottles.is_empty() {
            return None;
        }
        Some(Self {
            dispensed: bottles.iter().map(|b| b.dispensed).sum(),
            returned: bottles.iter().map(|b| b.returned).sum(),
        })
    }
}
