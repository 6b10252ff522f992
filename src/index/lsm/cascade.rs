//! Node cascade merges (FA-Tree)

use crate::config::BulkloadPolicy;
use crate::index::{IndexKind, IoSink};

use super::{Level, LevelGeometry, MergeStrategy};

/// Whole-node merges with a single head node
///
/// Level `i` holds `ratio^i` nodes. Every read and write moves whole nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeCascade;

impl MergeStrategy for NodeCascade {
    const KIND: IndexKind = IndexKind::Fa;

    fn max_entries(&self, geometry: &LevelGeometry, level: usize) -> u64 {
        geometry
            .nominal_nodes(level)
            .saturating_mul(geometry.node_entries)
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
            geometry.node_pages_for(live),
            geometry.nodes_for(live),
            sink,
        );
    }

    fn bulkload_policy(&self) -> Option<BulkloadPolicy> {
        None
    }
}
