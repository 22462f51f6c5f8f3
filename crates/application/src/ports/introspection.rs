use async_trait::async_trait;
use ferrous_rpz_domain::{Batch, DomainError};
use std::str::FromStr;

/// Snapshot of one resolution for diagnostic display.
#[derive(Debug, Clone)]
pub struct ResolutionDetails {
    pub terminal: String,
    pub chain: Vec<String>,
    pub query_count: u64,
    pub first_seen: f64,
    pub last_seen: f64,
    pub trend: f64,
    pub score: f64,
    pub reloaded: bool,
}

/// Snapshot of one association for diagnostic display.
#[derive(Debug, Clone)]
pub struct AddressDetails {
    pub address: String,
    pub best_terminal: Option<String>,
    pub enqueued: bool,
    pub resolutions: Vec<ResolutionDetails>,
}

/// One resolution removed by an eviction pass, with the score it lost on.
#[derive(Debug, Clone)]
pub struct RemovedResolution {
    pub address: String,
    pub terminal: String,
    pub score: f64,
}

/// Statistics of one eviction pass, retained in the eviction log.
#[derive(Debug, Clone)]
pub struct EvictionEvent {
    pub at: f64,
    pub overage: usize,
    pub target_pool: usize,
    pub actual_pool: usize,
    pub selected: usize,
    pub recycled: usize,
    pub deleted: usize,
    pub affected: usize,
    pub removed: Vec<RemovedResolution>,
}

/// Telemetry-view vs zone-view discrepancy for one address.
#[derive(Debug, Clone)]
pub struct Divergence {
    pub address: String,
    pub store_terminal: Option<String>,
    pub zone_terminal: Option<String>,
}

/// Result of the `a2z` cross check.
#[derive(Debug, Clone, Default)]
pub struct CrossCheckReport {
    pub associations: usize,
    pub zone_entries: usize,
    pub missing_in_zone: Vec<String>,
    pub missing_in_store: Vec<String>,
    pub divergent: Vec<Divergence>,
}

impl CrossCheckReport {
    pub fn discrepancies(&self) -> usize {
        self.missing_in_zone.len() + self.missing_in_store.len() + self.divergent.len()
    }
}

/// Depth counters across the engine's structures.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueDepths {
    pub associations: usize,
    pub resolutions: usize,
    pub cache_size: usize,
    pub eviction_queue: usize,
    pub batch_pending: usize,
    pub batch_writing: bool,
    pub invalid_telemetry: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEnd {
    Head,
    Tail,
}

impl FromStr for QueueEnd {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "head" => Ok(QueueEnd::Head),
            "tail" => Ok(QueueEnd::Tail),
            _ => Err(()),
        }
    }
}

/// Read-only introspection points exposed to the diagnostic console.
#[async_trait]
pub trait IntrospectionPort: Send + Sync {
    async fn associations_cross_check(&self) -> CrossCheckReport;
    async fn address_details(&self, address: &str) -> Result<AddressDetails, DomainError>;
    async fn zone_entry(&self, address: &str) -> Result<ferrous_rpz_domain::ZoneEntry, DomainError>;
    async fn queue_depths(&self) -> QueueDepths;
    async fn queue_slice(&self, end: QueueEnd, n: usize) -> Vec<String>;
    async fn recent_evictions(&self, n: usize) -> Vec<EvictionEvent>;
    async fn recent_refreshes(&self, n: usize) -> Vec<Batch>;
}
