use crate::address::RpzAddress;
use crate::heuristic::{select_best, Heuristic};
use crate::resolution::Resolution;
use std::collections::HashMap;

/// All resolutions observed for one address, keyed by terminal name, plus the
/// cached best selection.
#[derive(Debug, Clone)]
pub struct Association {
    address: RpzAddress,
    resolutions: HashMap<String, Resolution>,
    best: Option<String>,
}

impl Association {
    pub fn new(address: RpzAddress) -> Self {
        Self {
            address,
            resolutions: HashMap::new(),
            best: None,
        }
    }

    pub fn address(&self) -> RpzAddress {
        self.address
    }

    /// Fold one observed chain in. Returns `true` when a new resolution was
    /// created (the store tracks the global resolution count).
    pub fn observe(&mut self, chain: Vec<String>, now: f64, alpha: f64) -> bool {
        debug_assert!(!chain.is_empty());
        let terminal = chain.last().cloned().unwrap_or_default();
        self.best = None;

        match self.resolutions.get_mut(&terminal) {
            Some(existing) => {
                existing.observe_chain(chain, now, alpha);
                false
            }
            None => {
                self.resolutions.insert(terminal, Resolution::observed(chain, now));
                true
            }
        }
    }

    /// Insert a reload-marker resolution reconstructed from the zone. No-op
    /// when a resolution with that terminal already exists.
    pub fn seed_reloaded(&mut self, terminal: String, first_seen: f64, last_seen: f64) -> bool {
        if self.resolutions.contains_key(&terminal) {
            return false;
        }
        self.best = None;
        self.resolutions
            .insert(terminal.clone(), Resolution::reloaded(terminal, first_seen, last_seen));
        true
    }

    /// Recompute and cache the best resolution. The cache stays valid until
    /// the next mutation on this association.
    pub fn best(&mut self, heuristic: &dyn Heuristic, now: f64) -> Option<&Resolution> {
        let terminal =
            select_best(self.resolutions.values(), heuristic, now).map(|r| r.terminal().to_string());
        self.best = terminal;
        self.cached_best()
    }

    /// The best resolution as of the last [`best`](Self::best) call, if the
    /// cache is still valid.
    pub fn cached_best(&self) -> Option<&Resolution> {
        self.best.as_ref().and_then(|t| self.resolutions.get(t))
    }

    pub fn resolution(&self, terminal: &str) -> Option<&Resolution> {
        self.resolutions.get(terminal)
    }

    pub fn remove(&mut self, terminal: &str) -> Option<Resolution> {
        if self.best.as_deref() == Some(terminal) {
            self.best = None;
        }
        self.resolutions.remove(terminal)
    }

    pub fn len(&self) -> usize {
        self.resolutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolutions.is_empty()
    }

    pub fn resolutions(&self) -> impl Iterator<Item = &Resolution> {
        self.resolutions.values()
    }

    pub fn terminals(&self) -> impl Iterator<Item = &str> {
        self.resolutions.keys().map(String::as_str)
    }
}
