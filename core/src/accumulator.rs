//! Lock-striped score accumulator used while scoring a single query.
//!
//! Keys are spread over a fixed number of shards (`key mod shard_count`), each
//! behind its own mutex, so tasks scoring different terms only contend when
//! they touch documents in the same shard.

use crate::DocId;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::ops::AddAssign;

pub struct ConcurrentAccumulator<V> {
    shards: Vec<Mutex<BTreeMap<DocId, V>>>,
}

impl<V> ConcurrentAccumulator<V>
where
    V: AddAssign + Default + Copy,
{
    /// `shard_count` is clamped to at least one shard.
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(BTreeMap::new()))
            .collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_for(&self, key: DocId) -> usize {
        (i64::from(key).rem_euclid(self.shards.len() as i64)) as usize
    }

    /// Add `delta` to the value stored under `key`, starting from `V::default()`.
    pub fn accumulate(&self, key: DocId, delta: V) {
        let mut shard = self.shards[self.shard_for(key)].lock();
        *shard.entry(key).or_default() += delta;
    }

    /// Snapshot every shard into one ordered map.
    ///
    /// Locks are taken in ascending shard order and held until the copy is
    /// complete, so no `accumulate` can interleave with the snapshot.
    pub fn merge(&self) -> BTreeMap<DocId, V> {
        let guards: Vec<_> = self.shards.iter().map(|shard| shard.lock()).collect();
        let mut merged = BTreeMap::new();
        for guard in &guards {
            merged.extend(guard.iter().map(|(&key, &value)| (key, value)));
        }
        // Vec drops front to back: release in acquisition order.
        drop(guards);
        merged
    }

    /// Consume the accumulator without locking.
    pub fn into_map(self) -> BTreeMap<DocId, V> {
        let mut merged = BTreeMap::new();
        for shard in self.shards {
            merged.append(&mut shard.into_inner());
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn accumulates_per_key() {
        let acc = ConcurrentAccumulator::<f64>::new(4);
        acc.accumulate(1, 0.5);
        acc.accumulate(5, 1.0);
        acc.accumulate(1, 0.25);
        let merged = acc.merge();
        assert_eq!(merged.len(), 2);
        assert!((merged[&1] - 0.75).abs() < 1e-12);
        assert!((merged[&5] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn merged_snapshot_is_ordered_across_shards() {
        let acc = ConcurrentAccumulator::<i64>::new(3);
        for key in [9, 2, 7, 0, 4] {
            acc.accumulate(key, 1);
        }
        let keys: Vec<_> = acc.merge().into_keys().collect();
        assert_eq!(keys, vec![0, 2, 4, 7, 9]);
    }

    #[test]
    fn zero_shards_is_clamped() {
        let acc = ConcurrentAccumulator::<i64>::new(0);
        assert_eq!(acc.shard_count(), 1);
        acc.accumulate(3, 2);
        assert_eq!(acc.into_map()[&3], 2);
    }

    #[test]
    fn parallel_increments_are_not_lost() {
        let acc = ConcurrentAccumulator::<i64>::new(16);
        (0..10_000).into_par_iter().for_each(|i| acc.accumulate(i % 100, 1));
        let merged = acc.merge();
        assert_eq!(merged.len(), 100);
        assert!(merged.values().all(|&v| v == 100));
    }
}
