#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_rpz_application::ports::{RefreshCycleOutcome, ZoneRefreshPort};
use ferrous_rpz_domain::DomainError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct MockZoneRefreshPort {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl MockZoneRefreshPort {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::Relaxed);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ZoneRefreshPort for MockZoneRefreshPort {
    async fn run_refresh_cycle(&self) -> Result<RefreshCycleOutcome, DomainError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.fail.load(Ordering::Relaxed) {
            return Err(DomainError::UpdateTransportFailure("mock failure".to_string()));
        }
        Ok(RefreshCycleOutcome::default())
    }
}
