use crate::address::RpzAddress;
use crate::errors::DomainError;
use serde::Deserialize;

/// Wire form of one telemetry event as received over JSON/UDP.
///
/// The chain arrives terminal name first, original query name last; the
/// dnstap-shaped ingress produces the same payload already ordered
/// query-first and uses [`ResolutionObservation::from_chain`] directly.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryEvent {
    pub address: String,
    pub chain: Vec<String>,
}

impl TelemetryEvent {
    /// Validate and canonicalize into the internal observation form.
    pub fn into_observation(self) -> Result<ResolutionObservation, DomainError> {
        let mut chain = self.chain;
        chain.reverse();
        ResolutionObservation::new(&self.address, chain)
    }
}

/// A validated observation: canonical address plus a normalized chain ordered
/// outermost query first, terminal last.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionObservation {
    pub address: RpzAddress,
    pub chain: Vec<String>,
}

impl ResolutionObservation {
    pub fn new(address_literal: &str, chain: Vec<String>) -> Result<Self, DomainError> {
        let address = RpzAddress::parse(address_literal)?;
        Self::from_chain(address, chain)
    }

    pub fn from_chain(address: RpzAddress, chain: Vec<String>) -> Result<Self, DomainError> {
        if chain.is_empty() {
            return Err(DomainError::InvalidTelemetry(format!(
                "empty chain for {}",
                address
            )));
        }
        let chain = chain
            .into_iter()
            .map(|name| normalize_fqdn(&name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { address, chain })
    }

    pub fn terminal(&self) -> &str {
        self.chain.last().map(String::as_str).unwrap_or("")
    }
}

/// Lowercase, enforce a trailing root dot, and reject empty labels.
fn normalize_fqdn(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim().to_ascii_lowercase();
    let body = trimmed.strip_suffix('.').unwrap_or(&trimmed);
    if body.is_empty() {
        return Err(DomainError::InvalidTelemetry("empty name in chain".to_string()));
    }
    if body.split('.').any(|label| label.is_empty()) {
        return Err(DomainError::InvalidTelemetry(format!(
            "empty label in '{}'",
            name
        )));
    }
    Ok(format!("{}.", body))
}
