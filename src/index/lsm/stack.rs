//! Level stack
//!
//! Insert, delete and search bookkeeping shared by every leveled tree. The
//! merge strategy decides how a batch lands on a disk level; the stack
//! decides when batches move.
//!
//! ```text
//!   insert ──► level 0 (memory) ──flush──► level 1 ──drain──► level 2 ...
//!                                  spill              spill
//! ```

use tracing::debug;

use crate::config::BulkloadPolicy;
use crate::device::AccessPattern;
use crate::index::IoSink;

use super::{Level, LevelGeometry, MergeStrategy};

#[derive(Debug, Clone)]
pub(crate) struct LevelStack<S> {
    strategy: S,
    geometry: LevelGeometry,
    levels: Vec<Level>,
}

impl<S: MergeStrategy> LevelStack<S> {
    pub(crate) fn new(strategy: S, geometry: LevelGeometry) -> Self {
        let head = Level::new(0, strategy.max_entries(&geometry, 0));
        Self {
            strategy,
            geometry,
            levels: vec![head],
        }
    }

    pub(crate) fn strategy(&self) -> &S {
        &self.strategy
    }

    pub(crate) fn geometry(&self) -> &LevelGeometry {
        &self.geometry
    }

    pub(crate) fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Index of the deepest level holding records
    pub(crate) fn height(&self) -> u64 {
        self.levels
            .iter()
            .rposition(|level| !level.is_empty())
            .unwrap_or(0) as u64
    }

    /// Whether level `index` occupies every page of its capacity
    pub(crate) fn is_saturated(&self, index: usize) -> bool {
        self.levels.get(index).is_some_and(|level| {
            !level.is_empty()
                && level.num_pages() == self.geometry.pages_for(level.max_entries())
        })
    }

    fn ensure_level(&mut self, index: usize) {
        while self.levels.len() <= index {
            let next = self.levels.len();
            let max_entries = self.strategy.max_entries(&self.geometry, next);
            self.levels.push(Level::new(next, max_entries));
        }
    }

    // =========================================================================
    // Insert / Delete
    // =========================================================================

    pub(crate) fn insert<K: IoSink>(&mut self, n: u64, sink: &mut K) {
        let mut remaining = n;
        while remaining > 0 {
            let head = &mut self.levels[0];
            let room = head.max_entries().saturating_sub(head.physical_entries());
            if remaining < room {
                head.add_entries(remaining);
                return;
            }
            head.add_entries(room);
            remaining -= room;
            self.flush_head(sink);
        }
    }

    pub(crate) fn delete<K: IoSink>(&mut self, n: u64, sink: &mut K) {
        let mut remaining = n;
        while remaining > 0 {
            let head_live = self.levels[0].num_entries();
            if head_live > 0 {
                let batch = head_live.min(remaining);
                self.levels[0].remove_entries(batch);
                remaining -= batch;
                continue;
            }

            let room = self.levels[0]
                .max_entries()
                .saturating_sub(self.levels[0].physical_entries());
            let Some(level) = self
                .levels
                .iter_mut()
                .skip(1)
                .find(|level| level.num_entries() > 0)
            else {
                debug_assert!(false, "delete from an empty leveled tree");
                return;
            };

            let batch = remaining.min(level.num_entries()).min(room.max(1));
            level.doom_entries(batch);
            self.levels[0].add_markers(batch);
            remaining -= batch;

            if self.levels[0].is_full() {
                self.flush_head(sink);
            }
        }
    }

    /// Move the live records of level 0 down
    ///
    /// A level that the batch would fill up is drained instead, and its live
    /// records travel on with the batch to the next level.
    fn flush_head<K: IoSink>(&mut self, sink: &mut K) {
        let mut incoming = self.levels[0].num_entries();
        self.levels[0].clear();

        let mut target = 1;
        while incoming > 0 {
            self.ensure_level(target);
            let Self {
                strategy,
                geometry,
                levels,
            } = self;
            let level = &mut levels[target];

            if level.physical_entries() + incoming < level.max_entries() {
                strategy.spill(geometry, level, incoming, sink);
                return;
            }

            incoming += level.drain(sink);
            debug!(level = target, entries = incoming, "level drained into the next");
            target += 1;
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub(crate) fn point_lookup<K: IoSink>(&self, n: u64, sink: &mut K) {
        let runs: u64 = self.levels.iter().skip(1).map(Level::runs).sum();
        sink.repeat(n, |sink| {
            for _ in 0..runs {
                sink.read(1, AccessPattern::Random);
            }
        });
    }

    pub(crate) fn range_scan<K: IoSink>(&self, length: u64, repeats: u64, sink: &mut K) {
        let total: u64 = self
            .levels
            .iter()
            .skip(1)
            .map(Level::physical_entries)
            .sum();
        if total == 0 {
            return;
        }

        // (runs, sequential pages) per non-empty level
        let plan: Vec<(u64, u64)> = self
            .levels
            .iter()
            .skip(1)
            .filter(|level| !level.is_empty())
            .map(|level| {
                let share = (u128::from(length) * u128::from(level.physical_entries()))
                    .div_ceil(u128::from(total)) as u64;
                let pages = self
                    .geometry
                    .pages_for(share)
                    .clamp(1, level.num_pages().max(1));
                (level.runs(), pages - 1)
            })
            .collect();

        sink.repeat(repeats, |sink| {
            for &(runs, sequential) in &plan {
                for _ in 0..runs {
                    sink.read(1, AccessPattern::Random);
                }
                sink.read(sequential, AccessPattern::Sequential);
            }
        });
    }

    // =========================================================================
    // Bulkload
    // =========================================================================

    /// Bill the difference between `before` and the current levels as one
    /// bulk rewrite
    ///
    /// The policies only disagree on levels that were stored but not
    /// saturated. A level is saturated when its pages equal the pages of its
    /// capacity; it can never hold `max_entries` records since the batch
    /// that would get there drains it first.
    pub(crate) fn charge_bulkload<K: IoSink>(
        &self,
        before: &[Level],
        policy: BulkloadPolicy,
        sink: &mut K,
    ) {
        let changed = |index: usize| match before.get(index) {
            Some(old) => !old.same_contents(&self.levels[index]),
            None => !self.levels[index].is_empty(),
        };

        let Some(deepest) = (1..self.levels.len()).rev().find(|&index| changed(index)) else {
            return;
        };

        for index in 1..=deepest {
            let old_pages = before.get(index).map_or(0, Level::num_pages);
            let rewritten = changed(index);

            let read = match policy {
                BulkloadPolicy::AccordingToMaxCapacity if old_pages > 0 => self
                    .geometry
                    .pages_for(self.levels[index].max_entries()),
                BulkloadPolicy::AccordingToMaxCapacity => 0,
                _ if rewritten => old_pages,
                _ => 0,
            };
            sink.read(read, AccessPattern::Sequential);
            if rewritten {
                sink.free(old_pages);
                sink.write(self.levels[index].num_pages(), AccessPattern::Sequential);
            }
        }

        debug!(deepest, ?policy, "bulkload rewrote levels");
    }
}
