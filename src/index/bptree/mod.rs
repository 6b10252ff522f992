//! B+Tree
//!
//! Page-oriented B+Tree with in-place node updates. Every node access is one
//! page-granular device call, so a node larger than a page costs several
//! pages per visit.

mod shape;

use tracing::debug;

use crate::config::BpTreeConfig;
use crate::device::Disk;
use crate::error::{Result, SimError};
use crate::table::DbTable;

use self::shape::{NodeGeometry, TreeShape};
use super::{Charger, DbIndex, Discard, IndexBase, IndexKind, OpKind};

/// Size of a child pointer in an inner node
pub const POINTER_SIZE: u64 = 8;

/// B+Tree cost model
#[derive(Debug, Clone)]
pub struct BpTree {
    base: IndexBase,
    config: BpTreeConfig,
    shape: TreeShape,
    last_bulkload_inner_nodes: u64,
}

impl BpTree {
    pub fn new(disk: Disk, table: &DbTable, config: BpTreeConfig) -> Result<Self> {
        let base = IndexBase::new(IndexKind::BpTree.label(), disk, table)?;

        let record_size = table.record_size();
        let leaf_capacity = (config.node_size / record_size).saturating_sub(1);
        if leaf_capacity < 2 {
            return Err(SimError::Config(format!(
                "node of {} bytes holds fewer than two records of {}",
                config.node_size, table
            )));
        }

        let fanout = config.node_size / (table.key_size() + POINTER_SIZE);
        if fanout < 3 {
            return Err(SimError::Config(format!(
                "node of {} bytes holds fewer than three children for {}",
                config.node_size, table
            )));
        }

        let geometry = NodeGeometry {
            leaf_capacity,
            fanout,
            pages_per_node: config.node_size.div_ceil(base.disk().page_size()),
        };

        Ok(Self {
            base,
            config,
            shape: TreeShape::new(geometry),
            last_bulkload_inner_nodes: 0,
        })
    }

    pub fn config(&self) -> &BpTreeConfig {
        &self.config
    }

    /// Records per leaf
    pub fn leaf_capacity(&self) -> u64 {
        self.shape.geometry().leaf_capacity
    }

    /// Children per inner node
    pub fn fanout(&self) -> u64 {
        self.shape.geometry().fanout
    }

    pub fn pages_per_node(&self) -> u64 {
        self.shape.geometry().pages_per_node
    }

    /// Nodes on a level, 0 being the leaves
    pub fn nodes_at_level(&self, level: usize) -> u64 {
        self.shape.level(level).map_or(0, |nodes| nodes.nodes())
    }

    pub fn leaf_count(&self) -> u64 {
        self.nodes_at_level(0)
    }

    pub fn inner_node_count(&self) -> u64 {
        (1..self.shape.height() as usize)
            .map(|level| self.nodes_at_level(level))
            .sum()
    }

    /// Inner nodes created or rewritten by the last bulkload
    pub fn last_bulkload_inner_nodes(&self) -> u64 {
        self.last_bulkload_inner_nodes
    }
}

impl DbIndex for BpTree {
    fn base(&self) -> &IndexBase {
        &self.base
    }

    fn kind(&self) -> IndexKind {
        IndexKind::BpTree
    }

    fn insert_entries(&mut self, n: u64) -> f64 {
        let mut charger = Charger::new(self.base.disk_mut());
        self.shape.insert(n, &mut charger);
        let time = charger.elapsed();

        self.base.add_entries(n);
        self.base.record(OpKind::Insert, n, time);
        time
    }

    fn delete_entries(&mut self, n: u64) -> f64 {
        let mut charger = Charger::new(self.base.disk_mut());
        self.shape.delete(n, &mut charger);
        let time = charger.elapsed();

        self.base.remove_entries(n);
        self.base.record(OpKind::Delete, n, time);
        time
    }

    fn find_point_entries(&mut self, n: u64) -> f64 {
        let mut charger = Charger::new(self.base.disk_mut());
        self.shape.point_lookup(n, &mut charger);
        let time = charger.elapsed();

        self.base.record(OpKind::PointSearch, n, time);
        time
    }

    fn find_range_entries(&mut self, length: u64, repeats: u64) -> f64 {
        let mut charger = Charger::new(self.base.disk_mut());
        self.shape.range_scan(length, repeats, &mut charger);
        let time = charger.elapsed();

        self.base.record(OpKind::RangeSearch, repeats, time);
        time
    }

    fn bulkload_entries(&mut self, n: u64) -> Result<f64> {
        if !self.config.bulkload {
            return Err(SimError::BulkloadUnsupported {
                index: self.base.name().to_string(),
            });
        }

        let mut charger = Charger::new(self.base.disk_mut());
        self.last_bulkload_inner_nodes = self.shape.bulkload(n, &mut charger);
        let time = charger.elapsed();

        debug!(
            entries = n,
            inner_nodes = self.last_bulkload_inner_nodes,
            height = self.shape.height(),
            "B+Tree bulkload"
        );

        self.base.add_entries(n);
        self.base.record(OpKind::Bulkload, n, time);
        Ok(time)
    }

    fn is_bulkload_supported(&self) -> bool {
        self.config.bulkload
    }

    fn create_topology_after_insert(&mut self, n: u64) {
        self.shape.insert(n, &mut Discard);
        self.base.add_entries(n);
        debug!(
            entries = self.base.num_entries(),
            height = self.shape.height(),
            "B+Tree topology fast-forwarded"
        );
    }

    fn height(&self) -> u64 {
        self.shape.height()
    }

    fn reset_counters(&mut self) {
        self.base.reset_counters();
    }
}
