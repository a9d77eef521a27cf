use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Counters for one intern table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternStatsSnapshot {
    pub symbols: u64,
    pub keywords: u64,
    pub uninterned: u64,
    pub name_bytes: u64,
    pub lookups: u64,
    pub hits: u64,
}

impl InternStatsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct InternStats {
    inner: Mutex<InternStatsSnapshot>,
}

impl InternStats {
    pub fn record_lookup(&self, hit: bool) {
        let mut g = self.inner.lock();
        g.lookups = g.lookups.saturating_add(1);
        if hit {
            g.hits = g.hits.saturating_add(1);
        }
    }

    pub fn record_symbol(&self, name_len: usize) {
        let mut g = self.inner.lock();
        g.symbols = g.symbols.saturating_add(1);
        g.name_bytes = g.name_bytes.saturating_add(name_len as u64);
    }

    pub fn record_keyword(&self) {
        let mut g = self.inner.lock();
        g.keywords = g.keywords.saturating_add(1);
    }

    pub fn record_uninterned(&self) {
        let mut g = self.inner.lock();
        g.uninterned = g.uninterned.saturating_add(1);
    }

    pub fn snapshot(&self) -> InternStatsSnapshot {
        self.inner.lock().clone()
    }
}
