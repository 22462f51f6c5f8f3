/// One observed forward chain leading to an address.
///
/// `chain` is ordered outermost query first, terminal name last; names are
/// lowercase absolute FQDNs. Timestamps are wall-clock seconds; they stay
/// `f64` because telemetry arrives at sub-second cadence and the trend
/// estimate feeds on inter-observation gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    chain: Vec<String>,
    query_count: u64,
    first_seen: f64,
    last_seen: f64,
    trend: f64,
    reloaded: bool,
}

impl Resolution {
    /// Seed from a live observation. `trend` starts at zero; the next
    /// observation's gap is the first real sample.
    pub fn observed(chain: Vec<String>, now: f64) -> Self {
        debug_assert!(!chain.is_empty());
        Self {
            chain,
            query_count: 1,
            first_seen: now,
            last_seen: now,
            trend: 0.0,
            reloaded: false,
        }
    }

    /// Reconstruct a placeholder from the zone at startup. The chain is just
    /// the published terminal; the entry is not eligible as "best" while any
    /// live resolution exists.
    pub fn reloaded(terminal: String, first_seen: f64, last_seen: f64) -> Self {
        Self {
            chain: vec![terminal],
            query_count: 1,
            first_seen: first_seen.min(last_seen),
            last_seen,
            trend: 0.0,
            reloaded: true,
        }
    }

    /// Fold one more observation in: update the trend with the gap since the
    /// previous observation, advance `last_seen`, bump the counter.
    pub fn record_observation(&mut self, now: f64, alpha: f64) {
        let gap = now - self.last_seen;
        self.trend = (1.0 - alpha) * self.trend + alpha * gap;
        self.last_seen = self.last_seen.max(now);
        self.query_count += 1;
    }

    /// A live observation for this terminal. The chain is replaced with the
    /// most recently observed path (which also turns a reload marker into a
    /// real resolution); counters and `first_seen` continuity are kept.
    pub fn observe_chain(&mut self, chain: Vec<String>, now: f64, alpha: f64) {
        debug_assert!(!chain.is_empty());
        debug_assert_eq!(chain.last().map(String::as_str), Some(self.terminal()));
        self.chain = chain;
        self.reloaded = false;
        self.record_observation(now, alpha);
    }

    pub fn terminal(&self) -> &str {
        self.chain.last().map(String::as_str).unwrap_or("")
    }

    /// Number of dot-separated labels in the terminal name, trailing root
    /// label excluded.
    pub fn terminal_labels(&self) -> usize {
        let terminal = self.terminal();
        let trimmed = terminal.strip_suffix('.').unwrap_or(terminal);
        if trimmed.is_empty() {
            0
        } else {
            trimmed.split('.').count()
        }
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn query_count(&self) -> u64 {
        self.query_count
    }

    pub fn first_seen(&self) -> f64 {
        self.first_seen
    }

    pub fn last_seen(&self) -> f64 {
        self.last_seen
    }

    pub fn trend(&self) -> f64 {
        self.trend
    }

    pub fn is_reloaded(&self) -> bool {
        self.reloaded
    }
}
