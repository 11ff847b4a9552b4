//! Memoization of fetched and generated tables, keyed by request tuple.
//!
//! Entries are immutable `Sourced` snapshots (the table sits behind an `Arc`),
//! so concurrent readers never see one being changed in place. There is no
//! eviction: a cache lives as long as its controller. Failed fetches are not
//! stored, so the next interaction retries the provider.

use chrono::NaiveDate;
use dashlab_core::data::Sourced;
use dashlab_core::domain::{AnalysisMode, AnalysisRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    pub mode: AnalysisMode,
    pub symbol: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl From<&AnalysisRequest> for MemoKey {
    fn from(req: &AnalysisRequest) -> Self {
        Self {
            mode: req.mode,
            symbol: req.symbol.clone(),
            start: req.start,
            end: req.end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub struct MemoCache {
    entries: RwLock<HashMap<MemoKey, Sourced>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MemoKey) -> Option<Sourced> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Cached value for `key`, or run `compute` and remember a successful result.
    ///
    /// `compute` runs without holding the lock. If two callers race on the same
    /// key, the first stored value wins and both get it back.
    pub fn get_or_insert_with(&self, key: MemoKey, compute: impl FnOnce() -> Sourced) -> Sourced {
        if let Some(hit) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(mode = ?key.mode, symbol = ?key.symbol, "memo hit");
            return hit;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(mode = ?key.mode, symbol = ?key.symbol, "memo miss");
        let fresh = compute();
        if fresh.is_failure() {
            return fresh;
        }

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(fresh)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry, e.g. at the start of a new rendering pass.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashlab_core::data::DataOrigin;
    use dashlab_core::domain::{fields, TimeSeriesTable};
    use std::cell::Cell;
    use std::sync::Arc;

    fn key(symbol: &str) -> MemoKey {
        MemoKey::from(&AnalysisRequest::financial(
            symbol,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        ))
    }

    fn sourced(diagnostic: Option<&str>) -> Sourced {
        Sourced {
            table: Arc::new(TimeSeriesTable::empty(&fields::OHLCV)),
            origin: DataOrigin::Static,
            diagnostic: diagnostic.map(String::from),
        }
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = MemoCache::new();
        let calls = Cell::new(0);

        for _ in 0..3 {
            cache.get_or_insert_with(key("AAPL"), || {
                calls.set(calls.get() + 1);
                sourced(None)
            });
        }

        assert_eq!(calls.get(), 1);
        assert_eq!(
            cache.stats(),
            MemoStats {
                hits: 2,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn hits_share_the_same_table() {
        let cache = MemoCache::new();
        let a = cache.get_or_insert_with(key("AAPL"), || sourced(None));
        let b = cache.get_or_insert_with(key("AAPL"), || sourced(None));
        assert!(Arc::ptr_eq(&a.table, &b.table));
    }

    #[test]
    fn different_keys_are_separate_entries() {
        let cache = MemoCache::new();
        cache.get_or_insert_with(key("AAPL"), || sourced(None));
        cache.get_or_insert_with(key("MSFT"), || sourced(None));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failures_are_not_memoized() {
        let cache = MemoCache::new();
        let first = cache.get_or_insert_with(key("AAPL"), || sourced(Some("timeout")));
        assert!(first.is_failure());
        assert!(cache.is_empty());

        let second = cache.get_or_insert_with(key("AAPL"), || sourced(None));
        assert!(!second.is_failure());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_cache() {
        let cache = MemoCache::new();
        cache.get_or_insert_with(key("AAPL"), || sourced(None));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&key("AAPL")).is_none());
    }
}
