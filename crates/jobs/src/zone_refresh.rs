use ferrous_rpz_application::ports::ZoneRefreshPort;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const DEFAULT_TICK_INTERVAL_SECS: u64 = 1;

/// Periodic clock for the refresh batcher: every tick asks the engine to
/// promote and commit a due batch. The engine enforces the batch timing
/// rules; the tick only has to be frequent enough to notice them.
pub struct ZoneRefreshJob {
    refresh: Arc<dyn ZoneRefreshPort>,
    tick_interval_secs: u64,
    shutdown: CancellationToken,
}

impl ZoneRefreshJob {
    pub fn new(refresh: Arc<dyn ZoneRefreshPort>) -> Self {
        Self {
            refresh,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_tick_interval(mut self, secs: u64) -> Self {
        self.tick_interval_secs = secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval = self.tick_interval_secs,
            "Starting zone refresh job"
        );

        let job = Arc::clone(&self);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(job.tick_interval_secs));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("ZoneRefreshJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match job.refresh.run_refresh_cycle().await {
                            Ok(outcome) => {
                                if outcome.batch_written {
                                    info!(
                                        addresses = outcome.addresses,
                                        rcode = outcome.rcode.map(|r| r.as_str()).unwrap_or("none"),
                                        error = outcome.transport_error.as_deref().unwrap_or("none"),
                                        pending = outcome.pending,
                                        "Zone refresh cycle completed"
                                    );
                                }
                            }
                            Err(e) => {
                                error!(error = %e, "Zone refresh cycle failed");
                                if e.is_fatal() {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        });
    }
}
