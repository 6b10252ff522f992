//! Level bookkeeping

use serde::{Deserialize, Serialize};

use crate::device::AccessPattern;
use crate::index::IoSink;

/// Sizes shared by every level of a leveled tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelGeometry {
    pub record_size: u64,
    pub page_size: u64,
    /// Head tree size, which is also the node size
    pub node_size: u64,
    pub level_ratio: u64,
    /// Records per node
    pub node_entries: u64,
    pub pages_per_node: u64,
}

impl LevelGeometry {
    pub(crate) fn new(record_size: u64, page_size: u64, node_size: u64, level_ratio: u64) -> Self {
        Self {
            record_size,
            page_size,
            node_size,
            level_ratio,
            node_entries: node_size / record_size,
            pages_per_node: node_size.div_ceil(page_size),
        }
    }

    /// Pages holding `entries` packed records
    pub fn pages_for(&self, entries: u64) -> u64 {
        entries
            .saturating_mul(self.record_size)
            .div_ceil(self.page_size)
    }

    pub fn nodes_for(&self, entries: u64) -> u64 {
        entries.div_ceil(self.node_entries)
    }

    /// Pages of the whole nodes holding `entries` records
    pub fn node_pages_for(&self, entries: u64) -> u64 {
        self.nodes_for(entries).saturating_mul(self.pages_per_node)
    }

    /// `level_ratio ^ level`, saturating
    pub fn nominal_nodes(&self, level: usize) -> u64 {
        u32::try_from(level)
            .ok()
            .and_then(|exp| self.level_ratio.checked_pow(exp))
            .unwrap_or(u64::MAX)
    }
}

/// One level of a leveled tree
///
/// Level 0 lives in memory and only uses the entry fields. `entries` counts
/// live records; `num_entries_to_delete` counts records that are deleted but
/// still physically stored (on level 0: tombstone markers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    index: usize,
    max_entries: u64,
    entries: u64,
    num_entries_to_delete: u64,
    pages: u64,
    nodes: u64,
    overflow_nodes: u64,
    overflow_runs: u64,
}

impl Level {
    pub(crate) fn new(index: usize, max_entries: u64) -> Self {
        Self {
            index,
            max_entries,
            entries: 0,
            num_entries_to_delete: 0,
            pages: 0,
            nodes: 0,
            overflow_nodes: 0,
            overflow_runs: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }

    pub fn num_entries(&self) -> u64 {
        self.entries
    }

    pub fn num_entries_to_delete(&self) -> u64 {
        self.num_entries_to_delete
    }

    /// Live plus doomed records
    pub fn physical_entries(&self) -> u64 {
        self.entries + self.num_entries_to_delete
    }

    pub fn num_pages(&self) -> u64 {
        self.pages
    }

    pub fn num_nodes(&self) -> u64 {
        self.nodes
    }

    pub fn num_overflow_nodes(&self) -> u64 {
        self.overflow_nodes
    }

    pub fn num_overflow_runs(&self) -> u64 {
        self.overflow_runs
    }

    pub fn is_empty(&self) -> bool {
        self.physical_entries() == 0
    }

    pub fn is_full(&self) -> bool {
        self.physical_entries() >= self.max_entries
    }

    /// Sorted runs a lookup has to visit
    pub fn runs(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            1 + self.overflow_runs
        }
    }

    /// Same stored content, ignoring capacity
    pub(crate) fn same_contents(&self, other: &Level) -> bool {
        self.entries == other.entries
            && self.num_entries_to_delete == other.num_entries_to_delete
            && self.pages == other.pages
            && self.nodes == other.nodes
            && self.overflow_runs == other.overflow_runs
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.index, self.max_entries);
    }

    pub(crate) fn add_entries(&mut self, n: u64) {
        self.entries += n;
    }

    pub(crate) fn remove_entries(&mut self, n: u64) {
        self.entries -= n;
    }

    /// Turn `n` live records into doomed ones
    pub(crate) fn doom_entries(&mut self, n: u64) {
        self.entries -= n;
        self.num_entries_to_delete += n;
    }

    pub(crate) fn add_markers(&mut self, n: u64) {
        self.num_entries_to_delete += n;
    }

    /// Replace the content with one run
    pub(crate) fn rewrite(&mut self, entries: u64, pages: u64, nodes: u64) {
        let index = self.index;
        let max_entries = self.max_entries;
        *self = Self {
            entries,
            pages,
            nodes,
            ..Self::new(index, max_entries)
        };
    }

    /// Add a run next to the existing ones
    pub(crate) fn append_run(&mut self, entries: u64, pages: u64, nodes: u64) {
        self.entries += entries;
        self.pages += pages;
        self.nodes += nodes;
        self.overflow_runs += 1;
    }

    /// Count the nodes stored beyond `nominal_nodes` as overflow
    pub(crate) fn mark_overflow(&mut self, nominal_nodes: u64) {
        self.overflow_nodes = self.nodes.saturating_sub(nominal_nodes);
    }

    /// Read the level, write `live` records as one run and free the old pages
    pub(crate) fn merge<S: IoSink>(&mut self, live: u64, pages: u64, nodes: u64, sink: &mut S) {
        let old_pages = self.pages;
        sink.read(old_pages, AccessPattern::Sequential);
        sink.write(pages, AccessPattern::Sequential);
        sink.free(old_pages);
        self.rewrite(live, pages, nodes);
    }

    /// Read and free the level; returns its live records
    pub(crate) fn drain<S: IoSink>(&mut self, sink: &mut S) -> u64 {
        sink.read(self.pages, AccessPattern::Sequential);
        sink.free(self.pages);
        let live = self.entries;
        self.clear();
        live
    }
}
