use async_trait::async_trait;
use ferrous_rpz_domain::{DomainError, ZoneEntry};

/// Result of the one-shot startup zone read.
#[derive(Debug, Clone, Default)]
pub struct ZoneSnapshot {
    pub entries: Vec<ZoneEntry>,
    /// Count of records under the zone that are neither structural nor a
    /// recognizable PTR/TXT reverse-mapping pair.
    pub garbage_records: u64,
}

/// Port for reading the published zone once at startup.
#[async_trait]
pub trait ZoneSourcePort: Send + Sync {
    async fn load(&self) -> Result<ZoneSnapshot, DomainError>;
}
