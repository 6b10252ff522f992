//! B+Tree shape
//!
//! Keys arrive in ascending order, so every insert and delete happens on the
//! right edge of the tree. A level is therefore fully described by the fills
//! of its nodes from left to right, kept as a run-length stack:
//!
//! ```text
//!   level 1:  [57 x1]
//!   level 0:  [56 x1][112 x40][57 x1]      fill x count
//! ```
//!
//! Only the top of each stack is ever touched.

use tracing::debug;

use crate::device::AccessPattern;
use crate::index::IoSink;

/// Consecutive nodes of one level with the same fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeRun {
    fill: u64,
    count: u64,
}

/// All nodes of one level, left to right
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NodeLevel {
    runs: Vec<NodeRun>,
    nodes: u64,
    items: u64,
}

impl NodeLevel {
    fn single(fill: u64) -> Self {
        let mut level = Self::default();
        level.push(fill, 1);
        level
    }

    pub(crate) fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Sum of fills (records for leaves, children for inner nodes)
    pub(crate) fn items(&self) -> u64 {
        self.items
    }

    /// Fill of the right-most node
    fn last(&self) -> Option<u64> {
        self.runs.last().map(|run| run.fill)
    }

    fn push(&mut self, fill: u64, count: u64) {
        if count == 0 {
            return;
        }
        match self.runs.last_mut() {
            Some(top) if top.fill == fill => top.count += count,
            _ => self.runs.push(NodeRun { fill, count }),
        }
        self.nodes += count;
        self.items += fill * count;
    }

    fn pop(&mut self) -> Option<u64> {
        let top = self.runs.last_mut()?;
        let fill = top.fill;
        top.count -= 1;
        if top.count == 0 {
            self.runs.pop();
        }
        self.nodes -= 1;
        self.items -= fill;
        Some(fill)
    }

    fn set_last(&mut self, fill: u64) {
        if self.pop().is_some() {
            self.push(fill, 1);
        }
    }
}

/// Node capacities derived from the node size and the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeGeometry {
    pub leaf_capacity: u64,
    pub fanout: u64,
    pub pages_per_node: u64,
}

impl NodeGeometry {
    fn capacity(&self, level: usize) -> u64 {
        if level == 0 {
            self.leaf_capacity
        } else {
            self.fanout
        }
    }

    fn min_fill(&self, level: usize) -> u64 {
        self.capacity(level) / 2
    }
}

/// Node fills of every level; level 0 holds the leaves
#[derive(Debug, Clone)]
pub(crate) struct TreeShape {
    geometry: NodeGeometry,
    levels: Vec<NodeLevel>,
}

impl TreeShape {
    pub(crate) fn new(geometry: NodeGeometry) -> Self {
        Self {
            geometry,
            levels: Vec::new(),
        }
    }

    pub(crate) fn geometry(&self) -> &NodeGeometry {
        &self.geometry
    }

    pub(crate) fn height(&self) -> u64 {
        self.levels.len() as u64
    }

    pub(crate) fn level(&self, level: usize) -> Option<&NodeLevel> {
        self.levels.get(level)
    }

    fn last_fill(&self, level: usize) -> u64 {
        self.levels
            .get(level)
            .and_then(NodeLevel::last)
            .unwrap_or(0)
    }

    /// Random read of every node from the root down to the right-most leaf
    fn read_path<S: IoSink>(&self, sink: &mut S) {
        for _ in 0..self.height() {
            sink.read(self.geometry.pages_per_node, AccessPattern::Random);
        }
    }

    // =========================================================================
    // Insert
    // =========================================================================

    pub(crate) fn insert<S: IoSink>(&mut self, n: u64, sink: &mut S) {
        let pages = self.geometry.pages_per_node;
        let mut remaining = n;

        while remaining > 0 {
            if self.levels.is_empty() {
                // The root slot is read like any other leaf before the
                // first record lands in it
                self.levels.push(NodeLevel::single(1));
                sink.read(pages, AccessPattern::Random);
                sink.write(pages, AccessPattern::Random);
                remaining -= 1;
                continue;
            }

            let fill = self.last_fill(0);
            let batch = self
                .geometry
                .leaf_capacity
                .saturating_sub(fill)
                .min(remaining);

            if batch > 0 {
                let height = self.height();
                sink.repeat(batch, |sink| {
                    for _ in 0..height {
                        sink.read(pages, AccessPattern::Random);
                    }
                    sink.overwrite(pages, AccessPattern::Random);
                });
                self.levels[0].set_last(fill + batch);
                remaining -= batch;
            } else {
                self.split_insert(sink);
                remaining -= 1;
            }
        }
    }

    /// Insert into a full right-most leaf
    fn split_insert<S: IoSink>(&mut self, sink: &mut S) {
        let pages = self.geometry.pages_per_node;
        self.read_path(sink);

        let mut level = 0;
        let mut fill = self.last_fill(0) + 1;
        loop {
            let left = fill / 2;
            self.levels[level].set_last(left);
            self.levels[level].push(fill - left, 1);
            sink.overwrite(pages, AccessPattern::Random);
            sink.write(pages, AccessPattern::Random);

            if level + 1 == self.levels.len() {
                self.levels.push(NodeLevel::single(2));
                sink.write(pages, AccessPattern::Random);
                debug!(height = self.levels.len(), "B+Tree root split");
                return;
            }

            let parent = self.last_fill(level + 1) + 1;
            if parent <= self.geometry.fanout {
                self.levels[level + 1].set_last(parent);
                sink.overwrite(pages, AccessPattern::Random);
                return;
            }

            level += 1;
            fill = parent;
        }
    }

    // =========================================================================
    // Delete
    // =========================================================================

    pub(crate) fn delete<S: IoSink>(&mut self, n: u64, sink: &mut S) {
        let pages = self.geometry.pages_per_node;
        let mut remaining = n;

        while remaining > 0 {
            let height = self.height();
            if height == 0 {
                debug_assert!(false, "delete from an empty B+Tree");
                return;
            }

            let fill = self.last_fill(0);
            if height == 1 {
                if fill > 1 {
                    let batch = (fill - 1).min(remaining);
                    sink.repeat(batch, |sink| {
                        sink.read(pages, AccessPattern::Random);
                        sink.overwrite(pages, AccessPattern::Random);
                    });
                    self.levels[0].set_last(fill - batch);
                    remaining -= batch;
                } else {
                    sink.read(pages, AccessPattern::Random);
                    sink.free(pages);
                    self.levels.clear();
                    debug!("B+Tree emptied");
                    remaining -= 1;
                }
                continue;
            }

            let batch = fill
                .saturating_sub(self.geometry.min_fill(0))
                .min(remaining);
            if batch > 0 {
                sink.repeat(batch, |sink| {
                    for _ in 0..height {
                        sink.read(pages, AccessPattern::Random);
                    }
                    sink.overwrite(pages, AccessPattern::Random);
                });
                self.levels[0].set_last(fill - batch);
                remaining -= batch;
            } else {
                self.underflow_delete(sink);
                remaining -= 1;
            }
        }
    }

    /// Delete from a right-most leaf at minimum fill
    fn underflow_delete<S: IoSink>(&mut self, sink: &mut S) {
        let pages = self.geometry.pages_per_node;
        self.read_path(sink);

        let mut level = 0;
        let mut fill = self.last_fill(0).saturating_sub(1);
        loop {
            let capacity = self.geometry.capacity(level);
            let nodes = &mut self.levels[level];
            nodes.pop();
            // a non-root node always has a left sibling under the same parent
            let sibling = nodes.last().unwrap_or(0);
            sink.read(pages, AccessPattern::Random);

            if sibling + fill > capacity {
                let total = sibling + fill;
                let right = total / 2;
                nodes.set_last(total - right);
                nodes.push(right, 1);
                sink.overwrite(pages, AccessPattern::Random);
                sink.overwrite(pages, AccessPattern::Random);
                sink.overwrite(pages, AccessPattern::Random);
                return;
            }

            nodes.set_last(sibling + fill);
            sink.overwrite(pages, AccessPattern::Random);
            sink.free(pages);

            let parent_level = level + 1;
            let parent = self.last_fill(parent_level) - 1;
            if parent_level + 1 == self.levels.len() {
                if parent == 1 {
                    self.levels.pop();
                    sink.free(pages);
                    debug!(height = self.levels.len(), "B+Tree root collapsed");
                } else {
                    self.levels[parent_level].set_last(parent);
                    sink.overwrite(pages, AccessPattern::Random);
                }
                return;
            }

            if parent >= self.geometry.min_fill(parent_level) {
                self.levels[parent_level].set_last(parent);
                sink.overwrite(pages, AccessPattern::Random);
                return;
            }

            debug!(level = parent_level, "B+Tree merge cascades");
            level = parent_level;
            fill = parent;
        }
    }

    // =========================================================================
    // Bulkload
    // =========================================================================

    /// Append `n` records bottom-up; returns the inner nodes created or rewritten
    pub(crate) fn bulkload<S: IoSink>(&mut self, n: u64, sink: &mut S) -> u64 {
        if n == 0 {
            return 0;
        }

        if self.levels.is_empty() {
            self.levels.push(NodeLevel::default());
        } else {
            self.read_path(sink);
        }

        let (_, mut created) = self.append(0, n, sink);
        let mut inner_nodes = 0;
        let mut level = 1;
        loop {
            if level == self.levels.len() {
                let below = self.levels[level - 1].nodes();
                if below <= 1 {
                    break;
                }
                self.levels.push(NodeLevel::default());
                let (_, new_nodes) = self.append(level, below, sink);
                inner_nodes += new_nodes;
                created = new_nodes;
            } else {
                if created == 0 {
                    break;
                }
                let (touched, new_nodes) = self.append(level, created, sink);
                inner_nodes += new_nodes + u64::from(touched);
                created = new_nodes;
            }
            level += 1;
        }

        inner_nodes
    }

    /// Add `items` to the right edge of a level
    ///
    /// Returns whether the existing right-most node was rewritten and how many
    /// nodes were created.
    fn append<S: IoSink>(&mut self, level: usize, items: u64, sink: &mut S) -> (bool, u64) {
        let pages = self.geometry.pages_per_node;
        let capacity = self.geometry.capacity(level);
        let min_fill = self.geometry.min_fill(level);
        let nodes = &mut self.levels[level];

        let mut remaining = items;
        let mut touched = false;
        if let Some(fill) = nodes.last() {
            if fill < capacity {
                let top_up = (capacity - fill).min(remaining);
                nodes.set_last(fill + top_up);
                remaining -= top_up;
                touched = true;
            }
        }

        let full = remaining / capacity;
        let partial = remaining % capacity;
        nodes.push(capacity, full);
        nodes.push(partial, u64::from(partial > 0));
        let created = full + u64::from(partial > 0);

        if partial > 0 && partial < min_fill && nodes.nodes() >= 2 {
            nodes.pop();
            let neighbour = nodes.pop().unwrap_or(0);
            let total = neighbour + partial;
            let right = total / 2;
            nodes.push(total - right, 1);
            nodes.push(right, 1);
            if created == 1 {
                touched = true;
            }
        }

        if touched {
            sink.overwrite(pages, AccessPattern::Random);
        }
        if created > 0 {
            sink.write(created * pages, AccessPattern::Sequential);
        }
        (touched, created)
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub(crate) fn point_lookup<S: IoSink>(&self, n: u64, sink: &mut S) {
        let height = self.height();
        let pages = self.geometry.pages_per_node;
        sink.repeat(n, |sink| {
            for _ in 0..height {
                sink.read(pages, AccessPattern::Random);
            }
        });
    }

    pub(crate) fn range_scan<S: IoSink>(&self, length: u64, repeats: u64, sink: &mut S) {
        let Some(leaves) = self.levels.first() else {
            return;
        };
        let height = self.height();
        let pages = self.geometry.pages_per_node;
        let spanned = leaves_spanned(length, leaves.nodes(), leaves.items());
        sink.repeat(repeats, |sink| {
            for _ in 0..height {
                sink.read(pages, AccessPattern::Random);
            }
            sink.read((spanned - 1) * pages, AccessPattern::Sequential);
        });
    }
}

/// Leaves a scan over `length` entries touches
fn leaves_spanned(length: u64, leaves: u64, entries: u64) -> u64 {
    if entries == 0 || leaves == 0 {
        return 1;
    }
    let spanned = (u128::from(length) * u128::from(leaves)).div_ceil(u128::from(entries));
    (spanned.min(u128::from(leaves)) as u64).max(1)
}
