use crate::address::RpzAddress;
use crate::errors::DomainError;
use crate::resolution::Resolution;
use std::fmt;

/// Metadata published next to each synthesized `PTR`, as a `TXT` record:
/// `first=<Δ>;last=<Δ>;update=<abs>;score=<float>`.
///
/// Sign convention: `first` and `last` are non-positive offsets in seconds
/// relative to `update`, so `update + first` recovers the absolute
/// first-seen time.
#[derive(Debug, Clone, PartialEq)]
pub struct TxtMetadata {
    pub first_delta: i64,
    pub last_delta: i64,
    pub updated: u64,
    pub score: f64,
}

impl TxtMetadata {
    pub fn from_resolution(resolution: &Resolution, updated: f64, score: f64) -> Self {
        Self {
            first_delta: (resolution.first_seen() - updated).round() as i64,
            last_delta: (resolution.last_seen() - updated).round() as i64,
            updated: updated.max(0.0) as u64,
            score,
        }
    }

    pub fn first_seen(&self) -> f64 {
        self.updated as f64 + self.first_delta as f64
    }

    pub fn last_seen(&self) -> f64 {
        self.updated as f64 + self.last_delta as f64
    }

    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let mut first = None;
        let mut last = None;
        let mut updated = None;
        let mut score = None;

        for field in text.trim().trim_matches('"').split(';') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let (key, value) = field.split_once('=').ok_or_else(|| {
                DomainError::ZoneReloadAnomaly(format!("TXT field without '=': '{}'", field))
            })?;
            match key {
                "first" => first = value.parse::<i64>().ok(),
                "last" => last = value.parse::<i64>().ok(),
                "update" => updated = value.parse::<u64>().ok(),
                "score" => score = value.parse::<f64>().ok(),
                _ => {}
            }
        }

        match (first, last, updated, score) {
            (Some(first_delta), Some(last_delta), Some(updated), Some(score)) => Ok(Self {
                first_delta,
                last_delta,
                updated,
                score,
            }),
            _ => Err(DomainError::ZoneReloadAnomaly(format!(
                "incomplete TXT metadata: '{}'",
                text
            ))),
        }
    }
}

impl fmt::Display for TxtMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "first={};last={};update={};score={:.4}",
            self.first_delta, self.last_delta, self.updated, self.score
        )
    }
}

/// One published reverse-mapping: the `PTR` target plus its metadata `TXT`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneEntry {
    pub address: RpzAddress,
    pub terminal: String,
    pub metadata: Option<TxtMetadata>,
}

impl ZoneEntry {
    pub fn new(address: RpzAddress, terminal: String, metadata: Option<TxtMetadata>) -> Self {
        Self {
            address,
            terminal,
            metadata,
        }
    }

    pub fn reverse_name(&self) -> String {
        self.address.reverse_name()
    }
}
