use async_trait::async_trait;
use ferrous_rpz_domain::{DomainError, UpdateRcode};

/// Outcome of one periodic refresh cycle, for job-level logging.
#[derive(Debug, Clone, Default)]
pub struct RefreshCycleOutcome {
    pub batch_written: bool,
    pub addresses: usize,
    pub rcode: Option<UpdateRcode>,
    pub transport_error: Option<String>,
    pub pending: usize,
}

/// Port the periodic refresh job drives.
#[async_trait]
pub trait ZoneRefreshPort: Send + Sync {
    async fn run_refresh_cycle(&self) -> Result<RefreshCycleOutcome, DomainError>;
}
