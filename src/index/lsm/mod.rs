//! Leveled trees
//!
//! LSM-Tree, FALSM-Tree and FA-Tree share one level stack and differ only in
//! how a batch of records is merged into a disk level:
//!
//! | index     | strategy       | level `i` capacity              | merge           |
//! |-----------|----------------|---------------------------------|-----------------|
//! | LSM-Tree  | `Leveling`     | `head * ratio^i` bytes          | rewrite         |
//! | FALSM     | `Overflowing`  | `ratio^i` nodes (+ overflow)    | rewrite / append|
//! | FA-Tree   | `NodeCascade`  | `ratio^i` nodes                 | rewrite, by node|
//!
//! Level 0 is the in-memory head and costs nothing.

mod cascade;
mod level;
mod leveling;
mod overflow;
mod stack;

pub use cascade::NodeCascade;
pub use level::{Level, LevelGeometry};
pub use leveling::Leveling;
pub use overflow::Overflowing;

use std::fmt;

use tracing::debug;

use crate::config::{BulkloadPolicy, FaConfig, FalsmConfig, LsmConfig};
use crate::device::Disk;
use crate::error::{Result, SimError};
use crate::table::DbTable;

use self::stack::LevelStack;
use super::{Charger, DbIndex, Discard, IndexBase, IndexKind, IoSink, OpKind};

/// How a batch of records lands on a disk level
pub trait MergeStrategy: fmt::Debug + Clone {
    const KIND: IndexKind;

    /// Physical records level `level` holds before it is drained
    fn max_entries(&self, geometry: &LevelGeometry, level: usize) -> u64;

    /// Fold `incoming` live records into `target`
    fn spill<S: IoSink>(
        &self,
        geometry: &LevelGeometry,
        target: &mut Level,
        incoming: u64,
        sink: &mut S,
    );

    /// `None` when the structure has no bulk path
    fn bulkload_policy(&self) -> Option<BulkloadPolicy>;
}

pub type LsmTree = LeveledTree<Leveling>;
pub type FalsmTree = LeveledTree<Overflowing>;
pub type FaTree = LeveledTree<NodeCascade>;

/// A leveled index over one disk
#[derive(Debug, Clone)]
pub struct LeveledTree<S> {
    base: IndexBase,
    stack: LevelStack<S>,
}

impl<S: MergeStrategy> LeveledTree<S> {
    fn build(
        disk: Disk,
        table: &DbTable,
        head_tree_size: u64,
        level_ratio: u64,
        strategy: S,
    ) -> Result<Self> {
        let base = IndexBase::new(S::KIND.label(), disk, table)?;

        if head_tree_size < table.record_size() {
            return Err(SimError::Config(format!(
                "head tree of {} bytes cannot hold a record of {}",
                head_tree_size, table
            )));
        }
        if level_ratio < 2 {
            return Err(SimError::Config(format!(
                "level ratio must be at least 2, got {}",
                level_ratio
            )));
        }

        let geometry = LevelGeometry::new(
            table.record_size(),
            base.disk().page_size(),
            head_tree_size,
            level_ratio,
        );

        Ok(Self {
            base,
            stack: LevelStack::new(strategy, geometry),
        })
    }

    /// Every level including the head, shallowest first
    pub fn levels(&self) -> &[Level] {
        self.stack.levels()
    }

    pub fn level(&self, index: usize) -> Option<&Level> {
        self.stack.levels().get(index)
    }

    pub fn geometry(&self) -> &LevelGeometry {
        self.stack.geometry()
    }

    pub fn strategy(&self) -> &S {
        self.stack.strategy()
    }

    /// Whether level `index` fills all the pages its capacity allows, so
    /// every bulkload policy prices it like the insert path
    pub fn is_level_saturated(&self, index: usize) -> bool {
        self.stack.is_saturated(index)
    }

    /// Records per node
    pub fn node_entries(&self) -> u64 {
        self.stack.geometry().node_entries
    }
}

impl LeveledTree<Leveling> {
    pub fn new(disk: Disk, table: &DbTable, config: LsmConfig) -> Result<Self> {
        Self::build(
            disk,
            table,
            config.head_tree_size,
            config.level_ratio,
            Leveling::new(config.bulkload_policy),
        )
    }
}

impl LeveledTree<Overflowing> {
    pub fn new(disk: Disk, table: &DbTable, config: FalsmConfig) -> Result<Self> {
        if !config.capacity_ratio.is_finite() || config.capacity_ratio < 0.0 {
            return Err(SimError::Config(format!(
                "capacity ratio must be a non-negative number, got {}",
                config.capacity_ratio
            )));
        }

        Self::build(
            disk,
            table,
            config.head_tree_size,
            config.level_ratio,
            Overflowing::new(config.capacity_ratio, config.bulkload_policy),
        )
    }

    /// Overflow nodes over all levels
    pub fn num_overflow_nodes(&self) -> u64 {
        self.levels().iter().map(Level::num_overflow_nodes).sum()
    }
}

impl LeveledTree<NodeCascade> {
    pub fn new(disk: Disk, table: &DbTable, config: FaConfig) -> Result<Self> {
        Self::build(
            disk,
            table,
            config.head_tree_size,
            config.level_ratio,
            NodeCascade,
        )
    }
}

impl<S: MergeStrategy> DbIndex for LeveledTree<S> {
    fn base(&self) -> &IndexBase {
        &self.base
    }

    fn kind(&self) -> IndexKind {
        S::KIND
    }

    fn insert_entries(&mut self, n: u64) -> f64 {
        let mut charger = Charger::new(self.base.disk_mut());
        self.stack.insert(n, &mut charger);
        let time = charger.elapsed();

        self.base.add_entries(n);
        self.base.record(OpKind::Insert, n, time);
        time
    }

    fn delete_entries(&mut self, n: u64) -> f64 {
        let mut charger = Charger::new(self.base.disk_mut());
        self.stack.delete(n, &mut charger);
        let time = charger.elapsed();

        self.base.remove_entries(n);
        self.base.record(OpKind::Delete, n, time);
        time
    }

    fn find_point_entries(&mut self, n: u64) -> f64 {
        let mut charger = Charger::new(self.base.disk_mut());
        self.stack.point_lookup(n, &mut charger);
        let time = charger.elapsed();

        self.base.record(OpKind::PointSearch, n, time);
        time
    }

    fn find_range_entries(&mut self, length: u64, repeats: u64) -> f64 {
        let mut charger = Charger::new(self.base.disk_mut());
        self.stack.range_scan(length, repeats, &mut charger);
        let time = charger.elapsed();

        self.base.record(OpKind::RangeSearch, repeats, time);
        time
    }

    fn bulkload_entries(&mut self, n: u64) -> Result<f64> {
        let policy = self.stack.strategy().bulkload_policy().ok_or_else(|| {
            SimError::BulkloadUnsupported {
                index: self.base.name().to_string(),
            }
        })?;

        let mut charger = Charger::new(self.base.disk_mut());
        match policy {
            BulkloadPolicy::FeatureOff => self.stack.insert(n, &mut charger),
            _ => {
                let before = self.stack.levels().to_vec();
                self.stack.insert(n, &mut Discard);
                self.stack.charge_bulkload(&before, policy, &mut charger);
            }
        }
        let time = charger.elapsed();

        debug!(
            index = self.base.name(),
            entries = n,
            height = self.stack.height(),
            "bulkload"
        );

        self.base.add_entries(n);
        self.base.record(OpKind::Bulkload, n, time);
        Ok(time)
    }

    fn is_bulkload_supported(&self) -> bool {
        self.stack.strategy().bulkload_policy().is_some()
    }

    fn create_topology_after_insert(&mut self, n: u64) {
        self.stack.insert(n, &mut Discard);
        self.base.add_entries(n);
        debug!(
            index = self.base.name(),
            entries = self.base.num_entries(),
            height = self.stack.height(),
            "topology fast-forwarded"
        );
    }

    fn height(&self) -> u64 {
        self.stack.height()
    }

    fn reset_counters(&mut self) {
        self.base.reset_counters();
    }
}
