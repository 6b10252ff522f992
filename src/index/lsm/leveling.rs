//! Leveling merges (LSM-Tree)

use crate::config::BulkloadPolicy;
use crate::index::{IndexKind, IoSink};

use super::{Level, LevelGeometry, MergeStrategy};

/// One run per level, rewritten with every batch it receives
///
/// Level `i` holds `head_tree_size * ratio^i` bytes of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leveling {
    bulkload_policy: BulkloadPolicy,
}

impl Leveling {
    pub fn new(bulkload_policy: BulkloadPolicy) -> Self {
        Self { bulkload_policy }
    }
}

impl MergeStrategy for Leveling {
    const KIND: IndexKind = IndexKind::Lsm;

    fn max_entries(&self, geometry: &LevelGeometry, level: usize) -> u64 {
        geometry
            .node_size
            .saturating_mul(geometry.nominal_nodes(level))
            / geometry.record_size
    }

    fn spill<S: IoSink>(
        &self,
        geometry: &LevelGeometry,
        target: &mut Level,
        incoming: u64,
        sink: &mut S,
    ) {
        let live = target.num_entries() + incoming;
        target.merge(
            live,
            geometry.pages_for(live),
            geometry.nodes_for(live),
            sink,
        );
    }

    fn bulkload_policy(&self) -> Option<BulkloadPolicy> {
        Some(self.bulkload_policy)
    }
}
