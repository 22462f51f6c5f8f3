use crate::ports::{
    AddressDetails, CrossCheckReport, DnsUpdatePort, EvictionEvent, IntrospectionPort, PtrUpdate,
    QueueDepths, QueueEnd, RefreshCycleOutcome, TelemetrySink, UpdateRequest, ZoneRefreshPort,
    ZoneSnapshot,
};
use crate::services::association_store::AssociationStore;
use crate::services::refresh_batcher::RefreshBatcher;
use crate::services::zone_view::ZoneView;
use async_trait::async_trait;
use ferrous_rpz_domain::{
    Batch, Config, DomainError, Heuristic, RpzAddress, TelemetryEvent, TrendingHeuristic,
    ZoneEntry,
};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub fn now_unix_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Facade over the association store, the refresh batcher and the zone
/// view. Owns the locking discipline: the store lock covers a whole observe
/// plus any eviction pass, the batcher has its own lock, and no lock is held
/// across the update-wire await.
pub struct RpzEngine {
    store: Mutex<AssociationStore>,
    batcher: Mutex<RefreshBatcher>,
    zone_view: Mutex<ZoneView>,
    update_client: Arc<dyn DnsUpdatePort>,
    zone_name: String,
    update_timeout: Duration,
}

impl RpzEngine {
    pub fn new(config: &Config, update_client: Arc<dyn DnsUpdatePort>) -> Self {
        Self::with_heuristic(config, update_client, Arc::new(TrendingHeuristic))
    }

    pub fn with_heuristic(
        config: &Config,
        update_client: Arc<dyn DnsUpdatePort>,
        heuristic: Arc<dyn Heuristic>,
    ) -> Self {
        Self {
            store: Mutex::new(AssociationStore::new(
                config.cache.size,
                config.cache.trending_alpha,
                config.cache.eviction_log_size,
                heuristic,
            )),
            batcher: Mutex::new(RefreshBatcher::new(
                config.batch.update_size,
                config.batch.update_frequency,
                config.batch.threshold,
                config.batch.refresh_log_size,
            )),
            zone_view: Mutex::new(ZoneView::new()),
            update_client,
            zone_name: config.zone.name.clone(),
            update_timeout: Duration::from_secs(config.batch.update_timeout),
        }
    }

    /// Seed the association store and the zone view from the startup zone
    /// read.
    pub async fn bootstrap(&self, snapshot: ZoneSnapshot) {
        let now = now_unix_seconds();
        {
            let mut store = self.store.lock().await;
            for entry in &snapshot.entries {
                store.seed_reloaded(entry, now);
            }
        }
        let entries = snapshot.entries.len();
        let garbage = snapshot.garbage_records;
        self.zone_view.lock().await.load(snapshot);
        info!(entries, garbage, "Zone view seeded from zone file");
    }

    /// Resolve the batch's addresses to their current publication state.
    /// This is the moment the batch's consistency window closes.
    async fn resolve_batch(
        &self,
        batch: &Batch,
        now: f64,
    ) -> (Vec<PtrUpdate>, Vec<(RpzAddress, Option<ZoneEntry>)>) {
        let mut store = self.store.lock().await;
        let mut updates = Vec::with_capacity(batch.len());
        let mut committed = Vec::with_capacity(batch.len());
        let mut seen: Vec<RpzAddress> = Vec::with_capacity(batch.len());

        for address in batch.addresses() {
            if seen.contains(address) {
                continue;
            }
            seen.push(*address);
            let entry = store.publish_entry(address, now);
            updates.push(match &entry {
                Some(entry) => PtrUpdate {
                    reverse_name: entry.reverse_name(),
                    terminal: Some(entry.terminal.clone()),
                    txt: entry.metadata.as_ref().map(|m| m.to_string()),
                },
                None => PtrUpdate {
                    reverse_name: address.reverse_name(),
                    terminal: None,
                    txt: None,
                },
            });
            committed.push((*address, entry));
        }
        (updates, committed)
    }
}

#[async_trait]
impl TelemetrySink for RpzEngine {
    async fn submit(&self, event: TelemetryEvent) -> Result<(), DomainError> {
        let now = now_unix_seconds();
        let observation = match event.into_observation() {
            Ok(observation) => observation,
            Err(e) => {
                debug!(error = %e, "Telemetry event dropped");
                self.store.lock().await.note_invalid_telemetry();
                return Ok(());
            }
        };

        let affected = {
            let mut store = self.store.lock().await;
            if let Err(e) = store.observe(observation, now) {
                if e.is_fatal() {
                    error!(error = %e, "Engine state is undefined");
                    return Err(e);
                }
                debug!(error = %e, "Telemetry event dropped");
                store.note_invalid_telemetry();
                return Ok(());
            }
            let mut affected: Vec<RpzAddress> = Vec::new();
            while store.needs_eviction() {
                match store.run_eviction_pass(now) {
                    Ok(outcome) => affected.extend(outcome.affected),
                    Err(e) => {
                        error!(error = %e, "Engine state is undefined");
                        return Err(e);
                    }
                }
            }
            affected
        };

        if !affected.is_empty() {
            let mut batcher = self.batcher.lock().await;
            for address in affected {
                batcher.add(address, now);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ZoneRefreshPort for RpzEngine {
    async fn run_refresh_cycle(&self) -> Result<RefreshCycleOutcome, DomainError> {
        let now = now_unix_seconds();
        let batch = self.batcher.lock().await.tick(now);
        let Some(mut batch) = batch else {
            let pending = self.batcher.lock().await.pending();
            return Ok(RefreshCycleOutcome {
                pending,
                ..RefreshCycleOutcome::default()
            });
        };

        let write_started = now_unix_seconds();
        let (updates, committed) = self.resolve_batch(&batch, write_started).await;
        let request = UpdateRequest {
            zone: self.zone_name.clone(),
            updates,
        };

        let result =
            tokio::time::timeout(self.update_timeout, self.update_client.send_update(request))
                .await;
        let finished = now_unix_seconds();

        let (rcode, transport_error) = match &result {
            Ok(Ok(response)) => {
                batch.wire_request_bytes = response.request_bytes;
                batch.wire_response_bytes = response.response_bytes;
                (Some(response.rcode), None)
            }
            Ok(Err(e)) => (None, Some(e.to_string())),
            Err(_) => (
                None,
                Some(format!(
                    "update timed out after {}s",
                    self.update_timeout.as_secs()
                )),
            ),
        };
        batch.complete(write_started, finished, rcode, transport_error.clone())?;

        if batch.succeeded() {
            let mut zone_view = self.zone_view.lock().await;
            for (address, entry) in committed {
                zone_view.apply(address, entry);
            }
            info!(
                addresses = batch.len(),
                request_bytes = batch.wire_request_bytes,
                elapsed = batch.elapsed_processing,
                "Zone refresh committed"
            );
        } else {
            warn!(
                addresses = batch.len(),
                rcode = rcode.map(|r| r.as_str()).unwrap_or("none"),
                error = transport_error.as_deref().unwrap_or("none"),
                "Zone refresh failed; zone view not advanced"
            );
        }

        let outcome = RefreshCycleOutcome {
            batch_written: true,
            addresses: batch.len(),
            rcode: batch.rcode,
            transport_error: batch.transport_error.clone(),
            pending: 0,
        };

        let mut batcher = self.batcher.lock().await;
        batcher.finish(batch);
        let outcome = RefreshCycleOutcome {
            pending: batcher.pending(),
            ..outcome
        };
        Ok(outcome)
    }
}

#[async_trait]
impl IntrospectionPort for RpzEngine {
    async fn associations_cross_check(&self) -> CrossCheckReport {
        let now = now_unix_seconds();
        let bests = self.store.lock().await.best_terminals(now);
        self.zone_view.lock().await.cross_check(&bests)
    }

    async fn address_details(&self, address: &str) -> Result<AddressDetails, DomainError> {
        let address =
            RpzAddress::parse(address).map_err(|_| DomainError::NotFound(address.to_string()))?;
        let now = now_unix_seconds();
        self.store.lock().await.address_details(&address, now)
    }

    async fn zone_entry(&self, address: &str) -> Result<ZoneEntry, DomainError> {
        let address =
            RpzAddress::parse(address).map_err(|_| DomainError::NotFound(address.to_string()))?;
        self.zone_view
            .lock()
            .await
            .get(&address)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(address.to_string()))
    }

    async fn queue_depths(&self) -> QueueDepths {
        let store = self.store.lock().await;
        let batcher = self.batcher.lock().await;
        QueueDepths {
            associations: store.association_count(),
            resolutions: store.resolution_count(),
            cache_size: store.cache_size(),
            eviction_queue: store.queue_len(),
            batch_pending: batcher.pending(),
            batch_writing: batcher.is_writing(),
            invalid_telemetry: store.invalid_telemetry(),
        }
    }

    async fn queue_slice(&self, end: QueueEnd, n: usize) -> Vec<String> {
        let store = self.store.lock().await;
        let slice = match end {
            QueueEnd::Head => store.queue().peek_head(n),
            QueueEnd::Tail => store.queue().peek_tail(n),
        };
        slice.into_iter().map(|a| a.to_string()).collect()
    }

    async fn recent_evictions(&self, n: usize) -> Vec<EvictionEvent> {
        self.store.lock().await.recent_evictions(n)
    }

    async fn recent_refreshes(&self, n: usize) -> Vec<Batch> {
        self.batcher.lock().await.recent(n)
    }
}
