//! Constants used throughout the compliance core.
//!
//! Thresholds live here so the engine, the flag descriptions and the outer surfaces agree on the
//! same numbers.

/// Compliance percentages are capped at this ceiling.
pub const COMPLIANCE_PCT_CEILING: f64 = 150.0;

/// Compliance strictly below this percentage raises `UNDERUSE`.
pub const UNDERUSE_BELOW_PCT: f64 = 90.0;

/// Compliance strictly above this percentage raises `OVERUSE`.
pub const OVERUSE_ABOVE_PCT: f64 = 110.0;

/// Environment variable holding the UTC offset of the study calendar.
pub const UTC_OFFSET_ENV: &str = "STUDYCOOR_UTC_OFFSET";

/// Environment variable holding the REST listen address.
pub const REST_ADDR_ENV: &str = "STUDYCOOR_REST_ADDR";

/// Default REST listen address.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
