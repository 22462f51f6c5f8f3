use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid telemetry: {0}")]
    InvalidTelemetry(String),

    #[error("Zone reload anomaly: {0}")]
    ZoneReloadAnomaly(String),

    #[error("Update transport failure: {0}")]
    UpdateTransportFailure(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DomainError {
    /// Only invariant violations terminate the process; everything else is
    /// recovered locally by the component that hit it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::InvariantViolation(_))
    }
}
