// Key -> count aggregate with bounded top-N ranked extraction
//
// Backs the port and address frequency summaries. Counts only ever grow
// during one report run; the map is read-only once rendering starts.

use std::collections::HashMap;
use std::hash::Hash;

/// Counts observations per discrete key and extracts the top-N ranked
/// entries for display.
#[derive(Debug, Clone)]
pub struct RankedCounter<K> {
    counts: HashMap<K, u64>,
}

impl<K> Default for RankedCounter<K> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Ord + Copy> RankedCounter<K> {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Record one observation of `key`.
    pub fn record(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Number of distinct keys observed.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Up to `n` (key, count) pairs, ranked by count descending.
    ///
    /// Exact ties rank the higher key value first; the tie-break carries
    /// no meaning beyond making the output deterministic. Fewer than `n`
    /// distinct keys yields a short list, never zero-count padding.
    pub fn top_n(&self, n: usize) -> Vec<(K, u64)> {
        let mut pairs: Vec<(K, u64)> = self.counts.iter().map(|(k, c)| (*k, *c)).collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
        pairs.truncate(n);
        pairs
    }
}
