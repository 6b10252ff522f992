//! Overflowing merges (FALSM-Tree)
//!
//! Up to its nominal `ratio^i` nodes a level merges like leveling. A batch
//! that would push the merged run past the nominal count is appended as an
//! overflow run instead, without reading the level. The level tolerates
//! `floor(ratio^i * capacity_ratio)` nodes beyond the nominal count and is
//! drained into the next level once its records would fill them.
//!
//! ```text
//!   level i:  [ base run (ratio^i nodes) ][ ovf ][ ovf ]
//!             └──────── merged ─────────┘└ appended ┘
//!   drain at (ratio^i + overflow_limit) * node_entries records
//! ```

use tracing::debug;

use crate::config::BulkloadPolicy;
use crate::device::AccessPattern;
use crate::index::{IndexKind, IoSink};

use super::{Level, LevelGeometry, MergeStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overflowing {
    capacity_ratio: f64,
    bulkload_policy: BulkloadPolicy,
}

impl Overflowing {
    pub fn new(capacity_ratio: f64, bulkload_policy: BulkloadPolicy) -> Self {
        Self {
            capacity_ratio,
            bulkload_policy,
        }
    }

    pub fn capacity_ratio(&self) -> f64 {
        self.capacity_ratio
    }

    /// Nodes a level tolerates beyond its nominal count
    pub fn overflow_limit(&self, geometry: &LevelGeometry, level: usize) -> u64 {
        (geometry.nominal_nodes(level) as f64 * self.capacity_ratio).floor() as u64
    }

    /// Nominal plus overflow nodes of a level
    pub fn node_capacity(&self, geometry: &LevelGeometry, level: usize) -> u64 {
        geometry
            .nominal_nodes(level)
            .saturating_add(self.overflow_limit(geometry, level))
    }
}

impl MergeStrategy for Overflowing {
    const KIND: IndexKind = IndexKind::Falsm;

    fn max_entries(&self, geometry: &LevelGeometry, level: usize) -> u64 {
        // the head is a single node and never overflows
        if level == 0 {
            return geometry.node_entries;
        }
        self.node_capacity(geometry, level)
            .saturating_mul(geometry.node_entries)
    }

    fn spill<S: IoSink>(
        &self,
        geometry: &LevelGeometry,
        target: &mut Level,
        incoming: u64,
        sink: &mut S,
    ) {
        let index = target.index();
        let nominal = geometry.nominal_nodes(index);
        let pages = geometry.pages_for(incoming);
        let nodes = geometry.nodes_for(incoming);

        if target.is_empty() {
            sink.write(pages, AccessPattern::Sequential);
            target.rewrite(incoming, pages, nodes);
            target.mark_overflow(nominal);
            return;
        }

        let live = target.num_entries() + incoming;
        let merged_nodes = geometry.nodes_for(live);

        if merged_nodes > nominal
            && target.num_nodes() + nodes <= self.node_capacity(geometry, index)
        {
            sink.write(pages, AccessPattern::Sequential);
            target.append_run(incoming, pages, nodes);
            target.mark_overflow(nominal);
            debug!(
                level = index,
                overflow_nodes = target.num_overflow_nodes(),
                "FALSM overflow run appended"
            );
            return;
        }

        // Within the nominal count this is an ordinary merge; past it the
        // overflow runs are folded back into one run
        let compaction = target.num_overflow_runs() > 0;
        target.merge(live, geometry.pages_for(live), merged_nodes, sink);
        target.mark_overflow(nominal);
        if compaction {
            debug!(
                level = index,
                entries = live,
                overflow_nodes = target.num_overflow_nodes(),
                "FALSM level compacted"
            );
        }
    }

    fn bulkload_policy(&self) -> Option<BulkloadPolicy> {
        Some(self.bulkload_policy)
    }
}
