use crate::services::ring_log::RingLog;
use ferrous_rpz_domain::{Batch, BatchState, RpzAddress};
use tracing::{debug, warn};

/// Accumulates sheared addresses into bounded batches and decides when one
/// is ready to write. At most one batch is writing at a time; a fresh batch
/// keeps accumulating while a commit is in flight. The commit itself is
/// driven by the engine so no wire I/O happens under the batcher.
pub struct RefreshBatcher {
    update_size: usize,
    update_frequency: f64,
    threshold: f64,
    current: Option<Batch>,
    writing: bool,
    refresh_log: RingLog<Batch>,
}

impl RefreshBatcher {
    pub fn new(
        update_size: usize,
        update_frequency: u64,
        threshold: f64,
        refresh_log_size: usize,
    ) -> Self {
        Self {
            update_size,
            update_frequency: update_frequency as f64,
            threshold,
            current: None,
            writing: false,
            refresh_log: RingLog::new(refresh_log_size),
        }
    }

    /// Queue one address for republication. Appends past the cap are
    /// dropped but still counted in the batch's `add_calls`.
    pub fn add(&mut self, address: RpzAddress, now: f64) {
        let batch = self.current.get_or_insert_with(|| Batch::new(now));
        if !batch.try_add(address, self.update_size) {
            debug!(address = %address, "Batch at capacity, recycle dropped");
        }
    }

    /// Periodic clock. Promotes the current batch to writing and hands it to
    /// the caller when it is both old enough and full enough. Returns `None`
    /// while a commit is already in flight.
    pub fn tick(&mut self, now: f64) -> Option<Batch> {
        if self.writing {
            return None;
        }
        let batch = self.current.as_ref()?;
        if batch.state() != BatchState::Accumulating {
            return None;
        }
        let old_enough = now - batch.created_at() >= self.update_frequency;
        let full_enough = batch.len() as f64 >= self.update_size as f64 * self.threshold;
        if !(old_enough && full_enough) {
            return None;
        }

        let mut batch = self.current.take()?;
        if let Err(e) = batch.promote_to_writing(now) {
            warn!(error = %e, "Batch promotion refused");
            return None;
        }
        self.writing = true;
        Some(batch)
    }

    /// Record a completed batch and release the writer slot.
    pub fn finish(&mut self, batch: Batch) {
        debug_assert_eq!(batch.state(), BatchState::Complete);
        self.writing = false;
        self.refresh_log.push(batch);
    }

    pub fn pending(&self) -> usize {
        self.current.as_ref().map(Batch::len).unwrap_or(0)
    }

    pub fn is_writing(&self) -> bool {
        self.writing
    }

    pub fn recent(&self, n: usize) -> Vec<Batch> {
        self.refresh_log.recent(n)
    }
}
