use crate::ports::{CrossCheckReport, Divergence, ZoneSnapshot};
use ferrous_rpz_domain::{RpzAddress, ZoneEntry};
use rustc_hash::{FxHashMap, FxHashSet};

/// Passive in-memory mirror of the RPZ as published. Populated once at
/// startup from the zone read, advanced only by successful commits. Never
/// issues DNS queries.
#[derive(Debug, Default)]
pub struct ZoneView {
    entries: FxHashMap<RpzAddress, ZoneEntry>,
    garbage_records: u64,
}

impl ZoneView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, snapshot: ZoneSnapshot) {
        self.garbage_records = snapshot.garbage_records;
        self.entries = snapshot
            .entries
            .into_iter()
            .map(|entry| (entry.address, entry))
            .collect();
    }

    /// Apply one committed change. `None` records a deletion.
    pub fn apply(&mut self, address: RpzAddress, entry: Option<ZoneEntry>) {
        match entry {
            Some(entry) => {
                self.entries.insert(address, entry);
            }
            None => {
                self.entries.remove(&address);
            }
        }
    }

    pub fn get(&self, address: &RpzAddress) -> Option<&ZoneEntry> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn garbage_records(&self) -> u64 {
        self.garbage_records
    }

    /// Diff the telemetry view's best terminals against the published zone.
    pub fn cross_check(&self, store_bests: &[(RpzAddress, String)]) -> CrossCheckReport {
        let mut report = CrossCheckReport {
            associations: store_bests.len(),
            zone_entries: self.entries.len(),
            ..CrossCheckReport::default()
        };

        for (address, terminal) in store_bests {
            match self.entries.get(address) {
                None => report.missing_in_zone.push(address.to_string()),
                Some(entry) if &entry.terminal != terminal => {
                    report.divergent.push(Divergence {
                        address: address.to_string(),
                        store_terminal: Some(terminal.clone()),
                        zone_terminal: Some(entry.terminal.clone()),
                    });
                }
                Some(_) => {}
            }
        }

        let known: FxHashSet<&RpzAddress> = store_bests.iter().map(|(a, _)| a).collect();
        let mut zone_only: Vec<&RpzAddress> = self
            .entries
            .keys()
            .filter(|address| !known.contains(address))
            .collect();
        zone_only.sort_unstable();
        report.missing_in_store = zone_only.into_iter().map(|a| a.to_string()).collect();

        report
    }
}
