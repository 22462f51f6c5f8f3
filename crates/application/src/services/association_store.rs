use crate::ports::{AddressDetails, EvictionEvent, RemovedResolution, ResolutionDetails};
use crate::services::eviction_queue::EvictionQueue;
use crate::services::ring_log::RingLog;
use ferrous_rpz_domain::{
    Association, DomainError, Heuristic, Resolution, ResolutionObservation, RpzAddress,
    TxtMetadata, ZoneEntry,
};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Result of one eviction pass: the addresses the refresh pipeline must
/// republish (recycled survivors and deleted associations alike) plus the
/// retained statistics.
#[derive(Debug, Clone)]
pub struct EvictionOutcome {
    pub affected: Vec<RpzAddress>,
    pub event: EvictionEvent,
}

/// Sole owner of all associations and resolutions. Enforces the cache bound
/// through shearing passes over the eviction queue and records each pass in
/// a bounded log.
pub struct AssociationStore {
    associations: FxHashMap<RpzAddress, Association>,
    queue: EvictionQueue,
    resolution_count: usize,
    cache_size: usize,
    trending_alpha: f64,
    heuristic: Arc<dyn Heuristic>,
    eviction_log: RingLog<EvictionEvent>,
    invalid_telemetry: u64,
}

impl AssociationStore {
    pub fn new(
        cache_size: usize,
        trending_alpha: f64,
        eviction_log_size: usize,
        heuristic: Arc<dyn Heuristic>,
    ) -> Self {
        Self {
            associations: FxHashMap::default(),
            queue: EvictionQueue::new(),
            resolution_count: 0,
            cache_size,
            trending_alpha,
            heuristic,
            eviction_log: RingLog::new(eviction_log_size),
            invalid_telemetry: 0,
        }
    }

    /// Fold one validated observation in and refresh the address's queue
    /// position. The cache bound is not enforced here; callers follow up
    /// with [`run_eviction_pass`](Self::run_eviction_pass) while
    /// [`needs_eviction`](Self::needs_eviction) reports an overage.
    pub fn observe(
        &mut self,
        observation: ResolutionObservation,
        now: f64,
    ) -> Result<(), DomainError> {
        if observation.chain.is_empty() {
            return Err(DomainError::InvalidTelemetry(format!(
                "empty chain for {}",
                observation.address
            )));
        }
        let address = observation.address;
        let association = self
            .associations
            .entry(address)
            .or_insert_with(|| Association::new(address));
        if association.observe(observation.chain, now, self.trending_alpha) {
            self.resolution_count += 1;
        }
        self.queue.touch(address);
        Ok(())
    }

    /// Snapshot lookup; does not touch the queue.
    pub fn lookup(&self, address: &RpzAddress) -> Option<&Association> {
        self.associations.get(address)
    }

    /// Recompute and cache the best resolution for `address`.
    pub fn best(&mut self, address: &RpzAddress, now: f64) -> Option<Resolution> {
        let heuristic = Arc::clone(&self.heuristic);
        self.associations
            .get_mut(address)?
            .best(heuristic.as_ref(), now)
            .cloned()
    }

    /// The zone entry this address would publish right now: best resolution
    /// plus its metadata TXT. `None` when the address is unknown (publishes
    /// as a delete).
    pub fn publish_entry(&mut self, address: &RpzAddress, now: f64) -> Option<ZoneEntry> {
        let heuristic = Arc::clone(&self.heuristic);
        let association = self.associations.get_mut(address)?;
        let best = association.best(heuristic.as_ref(), now)?.clone();
        let score = heuristic.score(&best, now);
        Some(ZoneEntry::new(
            *address,
            best.terminal().to_string(),
            Some(TxtMetadata::from_resolution(&best, now, score)),
        ))
    }

    /// Seed one reload-marker resolution from the published zone.
    pub fn seed_reloaded(&mut self, entry: &ZoneEntry, loaded_at: f64) {
        let (first_seen, last_seen) = match &entry.metadata {
            Some(meta) => (meta.first_seen(), meta.last_seen()),
            None => (loaded_at, loaded_at),
        };
        let association = self
            .associations
            .entry(entry.address)
            .or_insert_with(|| Association::new(entry.address));
        if association.seed_reloaded(entry.terminal.clone(), first_seen, last_seen) {
            self.resolution_count += 1;
        }
        self.queue.touch(entry.address);
    }

    pub fn needs_eviction(&self) -> bool {
        self.resolution_count > self.cache_size
    }

    /// One shearing pass: select associations from the head of the queue
    /// until they cover the overage, drop the lowest-scoring resolutions
    /// across that cohort, recycle surviving associations to the tail and
    /// delete emptied ones. All selected addresses are reported for
    /// republication.
    pub fn run_eviction_pass(&mut self, now: f64) -> Result<EvictionOutcome, DomainError> {
        let overage = self.resolution_count.saturating_sub(self.cache_size);
        if overage == 0 {
            return Ok(EvictionOutcome {
                affected: Vec::new(),
                event: EvictionEvent {
                    at: now,
                    overage: 0,
                    target_pool: self.cache_size,
                    actual_pool: self.resolution_count,
                    selected: 0,
                    recycled: 0,
                    deleted: 0,
                    affected: 0,
                    removed: Vec::new(),
                },
            });
        }

        // 1. shear head nodes until the cohort covers the overage
        let mut selected: Vec<RpzAddress> = Vec::new();
        let mut covered = 0usize;
        while covered < overage {
            let (sheared, shortfall) = self.queue.shear(1);
            if shortfall > 0 {
                return Err(DomainError::InvariantViolation(format!(
                    "queue exhausted covering {} of overage {}",
                    covered, overage
                )));
            }
            let address = sheared[0];
            let association = self.associations.get(&address).ok_or_else(|| {
                DomainError::InvariantViolation(format!(
                    "queued address {} missing from store",
                    address
                ))
            })?;
            covered += association.len();
            selected.push(address);
        }

        // 2. score the cohort's resolutions, lowest first
        struct Candidate {
            address: RpzAddress,
            terminal: String,
            score: f64,
        }
        let mut candidates: Vec<Candidate> = Vec::with_capacity(covered);
        for address in &selected {
            if let Some(association) = self.associations.get(address) {
                for resolution in association.resolutions() {
                    candidates.push(Candidate {
                        address: *address,
                        terminal: resolution.terminal().to_string(),
                        score: self.heuristic.score(resolution, now),
                    });
                }
            }
        }
        candidates.sort_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.terminal.cmp(&b.terminal))
        });

        // 3. shear the overage
        let mut removed = Vec::with_capacity(overage);
        for candidate in candidates.into_iter().take(overage) {
            if let Some(association) = self.associations.get_mut(&candidate.address) {
                if association.remove(&candidate.terminal).is_some() {
                    self.resolution_count -= 1;
                    removed.push(RemovedResolution {
                        address: candidate.address.to_string(),
                        terminal: candidate.terminal,
                        score: candidate.score,
                    });
                }
            }
        }

        // 4. recycle survivors back to the tail, delete emptied associations
        // (their nodes were already sheared off)
        let mut recycled = 0usize;
        let mut deleted = 0usize;
        for address in &selected {
            let empty = self
                .associations
                .get(address)
                .map(|a| a.is_empty())
                .unwrap_or(true);
            if empty {
                self.associations.remove(address);
                deleted += 1;
            } else {
                self.queue.touch(*address);
                recycled += 1;
            }
        }

        let affected = {
            let mut addresses: Vec<&str> = removed.iter().map(|r| r.address.as_str()).collect();
            addresses.sort_unstable();
            addresses.dedup();
            addresses.len()
        };

        let event = EvictionEvent {
            at: now,
            overage,
            target_pool: self.cache_size,
            actual_pool: self.resolution_count,
            selected: selected.len(),
            recycled,
            deleted,
            affected,
            removed,
        };
        debug!(
            overage = event.overage,
            selected = event.selected,
            recycled = event.recycled,
            deleted = event.deleted,
            pool = event.actual_pool,
            "Eviction pass completed"
        );
        self.eviction_log.push(event.clone());

        Ok(EvictionOutcome {
            affected: selected,
            event,
        })
    }

    /// The cache bound can be changed at runtime; subsequent eviction passes
    /// converge to the new size.
    pub fn set_cache_size(&mut self, cache_size: usize) {
        self.cache_size = cache_size;
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    pub fn association_count(&self) -> usize {
        self.associations.len()
    }

    pub fn resolution_count(&self) -> usize {
        self.resolution_count
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queue(&self) -> &EvictionQueue {
        &self.queue
    }

    pub fn note_invalid_telemetry(&mut self) {
        self.invalid_telemetry += 1;
    }

    pub fn invalid_telemetry(&self) -> u64 {
        self.invalid_telemetry
    }

    pub fn recent_evictions(&self, n: usize) -> Vec<EvictionEvent> {
        self.eviction_log.recent(n)
    }

    /// Best terminal per association, for the a2z cross check. Sorted by
    /// address for deterministic reports.
    pub fn best_terminals(&mut self, now: f64) -> Vec<(RpzAddress, String)> {
        let heuristic = Arc::clone(&self.heuristic);
        let mut out: Vec<(RpzAddress, String)> = self
            .associations
            .values_mut()
            .filter_map(|association| {
                let address = association.address();
                association
                    .best(heuristic.as_ref(), now)
                    .map(|best| (address, best.terminal().to_string()))
            })
            .collect();
        out.sort_unstable_by_key(|(address, _)| *address);
        out
    }

    /// Full diagnostic snapshot of one association.
    pub fn address_details(
        &mut self,
        address: &RpzAddress,
        now: f64,
    ) -> Result<AddressDetails, DomainError> {
        let heuristic = Arc::clone(&self.heuristic);
        let enqueued = self.queue.contains(address);
        let association = self
            .associations
            .get_mut(address)
            .ok_or_else(|| DomainError::NotFound(address.to_string()))?;

        let best_terminal = association
            .best(heuristic.as_ref(), now)
            .map(|r| r.terminal().to_string());
        let mut resolutions: Vec<ResolutionDetails> = association
            .resolutions()
            .map(|r| ResolutionDetails {
                terminal: r.terminal().to_string(),
                chain: r.chain().to_vec(),
                query_count: r.query_count(),
                first_seen: r.first_seen(),
                last_seen: r.last_seen(),
                trend: r.trend(),
                score: heuristic.score(r, now),
                reloaded: r.is_reloaded(),
            })
            .collect();
        resolutions.sort_unstable_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.terminal.cmp(&b.terminal))
        });

        Ok(AddressDetails {
            address: address.to_string(),
            best_terminal,
            enqueued,
            resolutions,
        })
    }
}
