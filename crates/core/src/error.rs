#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ComplianceError {
    #[error("End date must be on or after start date.")]
    InvalidDates,
    #[error("Inputs cannot be negative.")]
    NegativeValues,
    #[error("Returned cannot exceed dispensed.")]
    ReturnedExceedsDispensed,
}

impl ComplianceError {
    /// Stable machine-readable kind, used by API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            ComplianceError::InvalidDates => "invalid_dates",
            ComplianceError::NegativeValues => "negative_values",
            ComplianceError::ReturnedExceedsDispensed => "returned_exceeds_dispensed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("unknown dosing frequency: {0}")]
    UnknownFrequency(String),
    #[error("invalid flag token: {0}")]
    InvalidFlag(String),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("record schema mismatch at {path}: {message}")]
    SchemaMismatch { path: String, message: String },
    #[error(transparent)]
    Compliance(#[from] ComplianceError),
    #[error(transparent)]
    Visit(#[from] crate::visit::VisitError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
