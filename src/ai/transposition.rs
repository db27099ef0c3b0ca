/// Bound classification for a stored search value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundFlag {
    /// Exact value (PV node).
    Exact,
    /// Search failed high, value is a lower bound.
    LowerBound,
    /// Search failed low, value is an upper bound.
    UpperBound,
}

#[derive(Debug, Clone, Copy)]
pub struct TtEntry {
    pub hash: u64,
    pub depth: i32,
    pub flag: BoundFlag,
    pub value: i32,
    pub best_move: Option<(usize, usize)>,
}

/// Default slot count. Must be a power of two so indexing reduces to a mask.
pub const TT_SIZE: usize = 1 << 16;

/// One-entry-per-slot table indexed by `hash & mask`. Entries survive
/// between root moves; deeper-or-equal stores overwrite.
pub struct TranspositionTable {
    entries: Vec<Option<TtEntry>>,
    mask: usize,
    hits: u64,
    misses: u64,
}

impl TranspositionTable {
    pub fn new(size: usize) -> Self {
        assert!(size.is_power_of_two(), "table size must be a power of two");
        Self {
            entries: vec![None; size],
            mask: size - 1,
            hits: 0,
            misses: 0,
        }
    }

    pub fn new_default() -> Self {
        Self::new(TT_SIZE)
    }

    /// An entry is usable only on an exact hash match searched at least as
    /// deep as the caller needs. The caller applies the bound flag.
    pub fn probe(&mut self, hash: u64, depth: i32) -> Option<TtEntry> {
        let slot = self.entries[(hash as usize) & self.mask];
        match slot {
            Some(entry) if entry.hash == hash && entry.depth >= depth => {
                self.hits += 1;
                Some(entry)
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn store(
        &mut self,
        hash: u64,
        depth: i32,
        flag: BoundFlag,
        value: i32,
        best_move: Option<(usize, usize)>,
    ) {
        let idx = (hash as usize) & self.mask;
        // Keep the deeper result; equal depth favours the newer search.
        if let Some(existing) = self.entries[idx] {
            if existing.depth > depth {
                return;
            }
        }
        self.entries[idx] = Some(TtEntry {
            hash,
            depth,
            flag,
            value,
            best_move,
        });
    }

    pub fn clear(&mut self) {
        self.entries.fill(None);
        self.hits = 0;
        self.misses = 0;
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub const MAX_KILLER_DEPTH: usize = 16;
pub const KILLERS_PER_DEPTH: usize = 2;

/// Two most recent cutoff moves per search depth. First in, first out
/// within the pair; duplicates are ignored. Consulted only when ordering
/// candidate moves.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: [[Option<(usize, usize)>; KILLERS_PER_DEPTH]; MAX_KILLER_DEPTH],
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: [[None; KILLERS_PER_DEPTH]; MAX_KILLER_DEPTH],
        }
    }

    pub fn record(&mut self, depth: i32, mv: (usize, usize)) {
        let Some(row) = self.slot_index(depth) else {
            return;
        };
        if self.slots[row][0] == Some(mv) || self.slots[row][1] == Some(mv) {
            return;
        }
        self.slots[row][1] = self.slots[row][0];
        self.slots[row][0] = Some(mv);
    }

    pub fn matches(&self, depth: i32, mv: (usize, usize)) -> bool {
        self.slot_index(depth)
            .is_some_and(|row| self.slots[row].contains(&Some(mv)))
    }

    fn slot_index(&self, depth: i32) -> Option<usize> {
        if depth >= 0 && (depth as usize) < MAX_KILLER_DEPTH {
            Some(depth as usize)
        } else {
            None
        }
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_requires_exact_hash_and_depth() {
        let mut tt = TranspositionTable::new(64);
        tt.store(123_456, 5, BoundFlag::Exact, 50, Some((7, 7)));

        let entry = tt.probe(123_456, 5).expect("stored entry");
        assert_eq!(entry.value, 50);
        assert_eq!(entry.best_move, Some((7, 7)));

        // Shallower stored depth is unusable for a deeper probe.
        assert!(tt.probe(123_456, 8).is_none());
        // A colliding hash with the same slot index must not match.
        assert!(tt.probe(123_456 + 64, 5).is_none());
    }

    #[test]
    fn deeper_entries_are_kept() {
        let mut tt = TranspositionTable::new(64);
        tt.store(42, 6, BoundFlag::Exact, 10, None);
        tt.store(42, 3, BoundFlag::Exact, 99, None);
        assert_eq!(tt.probe(42, 3).expect("kept").value, 10);

        tt.store(42, 6, BoundFlag::LowerBound, 77, None);
        assert_eq!(tt.probe(42, 6).expect("replaced").value, 77);
    }

    #[test]
    fn killers_keep_last_two_without_duplicates() {
        let mut killers = KillerTable::new();
        killers.record(3, (1, 1));
        killers.record(3, (1, 1));
        killers.record(3, (2, 2));
        assert!(killers.matches(3, (1, 1)));
        assert!(killers.matches(3, (2, 2)));

        killers.record(3, (3, 3));
        assert!(killers.matches(3, (2, 2)));
        assert!(killers.matches(3, (3, 3)));
        assert!(!killers.matches(3, (1, 1)));
        assert!(!killers.matches(4, (3, 3)));
    }

    #[test]
    fn out_of_range_depths_are_ignored() {
        let mut killers = KillerTable::new();
        killers.record(-1, (0, 0));
        killers.record(MAX_KILLER_DEPTH as i32, (0, 0));
        assert!(!killers.matches(-1, (0, 0)));
        assert!(!killers.matches(MAX_KILLER_DEPTH as i32, (0, 0)));
    }
}
