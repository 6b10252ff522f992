//! Index Module
//!
//! Cost models of four index structures. Each index owns one `Disk` and keeps
//! only structural bookkeeping (node fills, level sizes), never keys.
//!
//! ## Layering
//!
//! ```text
//!   DbIndex::insert_entries(n)
//!          │
//!          ▼
//!   ┌──────────────┐   node / page accesses   ┌───────────┐
//!   │  structure   │ ───────────────────────► │  IoSink   │
//!   │ (tree/levels)│                          └─────┬─────┘
//!   └──────────────┘                 Charger ┌──────┴──────┐ Discard
//!                                            ▼             ▼
//!                                          Disk        (dropped)
//! ```
//!
//! The structure code is written once against `IoSink`. Charged operations
//! hand it a `Charger`, the topology fast-forward hands it `Discard`, so both
//! paths end in exactly the same structure.

mod base;
mod bptree;
mod counters;
mod lsm;
mod sink;

pub use base::IndexBase;
pub use bptree::BpTree;
pub use counters::{CountCounter, CounterId, CounterValue, IndexCounters, OpKind, TimeCounter};
pub use lsm::{
    FaTree, FalsmTree, Level, LevelGeometry, LeveledTree, Leveling, LsmTree, MergeStrategy,
    NodeCascade, Overflowing,
};
pub use sink::{Charger, Discard, IoSink};

use serde::{Deserialize, Serialize};

use crate::device::Disk;
use crate::error::Result;

// =============================================================================
// Index Kinds
// =============================================================================

/// The closed set of index structures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    BpTree,
    Lsm,
    Falsm,
    Fa,
}

impl IndexKind {
    pub fn label(&self) -> &'static str {
        match self {
            IndexKind::BpTree => "BPTree",
            IndexKind::Lsm => "LSMTree",
            IndexKind::Falsm => "FALSMTree",
            IndexKind::Fa => "FATree",
        }
    }
}

/// Number of entries a selectivity fraction stands for
pub fn entries_for_selectivity(num_entries: u64, selectivity: f64) -> u64 {
    debug_assert!(
        (0.0..=1.0).contains(&selectivity),
        "selectivity {} outside [0, 1]",
        selectivity
    );
    (selectivity * num_entries as f64).floor() as u64
}

// =============================================================================
// Index Contract
// =============================================================================

/// Operations every index offers
///
/// Every operation returns the simulated time it took in microseconds and
/// books it under its category counter. Deleting more entries than exist is a
/// caller error and is only checked by debug assertions.
pub trait DbIndex {
    fn base(&self) -> &IndexBase;

    fn kind(&self) -> IndexKind;

    /// Insert `n` entries one by one
    fn insert_entries(&mut self, n: u64) -> f64;

    /// Remove the `n` most recent entries one by one
    fn delete_entries(&mut self, n: u64) -> f64;

    /// Run `n` point lookups
    fn find_point_entries(&mut self, n: u64) -> f64;

    /// Run `repeats` scans over `length` consecutive entries
    fn find_range_entries(&mut self, length: u64, repeats: u64) -> f64;

    /// Insert `n` entries through the bulk path
    fn bulkload_entries(&mut self, n: u64) -> Result<f64>;

    fn is_bulkload_supported(&self) -> bool;

    /// Shape the index as if `n` entries had been inserted, without cost
    fn create_topology_after_insert(&mut self, n: u64);

    fn height(&self) -> u64;

    fn reset_counters(&mut self);

    // -------------------------------------------------------------------------
    // Provided
    // -------------------------------------------------------------------------

    fn name(&self) -> &str {
        self.base().name()
    }

    fn insert_entry(&mut self) -> f64 {
        self.insert_entries(1)
    }

    fn delete_entry(&mut self) -> f64 {
        self.delete_entries(1)
    }

    fn find_point_entry(&mut self) -> f64 {
        self.find_point_entries(1)
    }

    /// `repeats` rounds of `floor(selectivity * entries)` point lookups
    fn find_point_entries_by_selectivity(&mut self, selectivity: f64, repeats: u64) -> f64 {
        let lookups = entries_for_selectivity(self.num_entries(), selectivity);
        let mut time = 0.0;
        for _ in 0..repeats {
            time += self.find_point_entries(lookups);
        }
        time
    }

    /// `repeats` scans over `floor(selectivity * entries)` entries
    fn find_range_entries_by_selectivity(&mut self, selectivity: f64, repeats: u64) -> f64 {
        let length = entries_for_selectivity(self.num_entries(), selectivity);
        self.find_range_entries(length, repeats)
    }

    fn num_entries(&self) -> u64 {
        self.base().num_entries()
    }

    fn key_size(&self) -> u64 {
        self.base().table().key_size()
    }

    fn data_size(&self) -> u64 {
        self.base().table().data_size()
    }

    fn record_size(&self) -> u64 {
        self.base().table().record_size()
    }

    fn disk(&self) -> &Disk {
        self.base().disk()
    }

    fn counter(&self, id: CounterId) -> (&'static str, CounterValue) {
        self.base().counters().get(id)
    }

    fn time_counter(&self, counter: TimeCounter) -> f64 {
        self.base().counters().time(counter)
    }

    fn count_counter(&self, counter: CountCounter) -> u64 {
        self.base().counters().count(counter)
    }
}

// =============================================================================
// Index Enum
// =============================================================================

/// Any of the four index structures
#[derive(Debug, Clone)]
pub enum Index {
    BpTree(BpTree),
    Lsm(LsmTree),
    Falsm(FalsmTree),
    Fa(FaTree),
}

macro_rules! dispatch {
    ($self:expr, $index:ident => $body:expr) => {
        match $self {
            Index::BpTree($index) => $body,
            Index::Lsm($index) => $body,
            Index::Falsm($index) => $body,
            Index::Fa($index) => $body,
        }
    };
}

impl DbIndex for Index {
    fn base(&self) -> &IndexBase {
        dispatch!(self, index => index.base())
    }

    fn kind(&self) -> IndexKind {
        dispatch!(self, index => index.kind())
    }

    fn insert_entries(&mut self, n: u64) -> f64 {
        dispatch!(self, index => index.insert_entries(n))
    }

    fn delete_entries(&mut self, n: u64) -> f64 {
        dispatch!(self, index => index.delete_entries(n))
    }

    fn find_point_entries(&mut self, n: u64) -> f64 {
        dispatch!(self, index => index.find_point_entries(n))
    }

    fn find_range_entries(&mut self, length: u64, repeats: u64) -> f64 {
        dispatch!(self, index => index.find_range_entries(length, repeats))
    }

    fn bulkload_entries(&mut self, n: u64) -> Result<f64> {
        dispatch!(self, index => index.bulkload_entries(n))
    }

    fn is_bulkload_supported(&self) -> bool {
        dispatch!(self, index => index.is_bulkload_supported())
    }

    fn create_topology_after_insert(&mut self, n: u64) {
        dispatch!(self, index => index.create_topology_after_insert(n))
    }

    fn height(&self) -> u64 {
        dispatch!(self, index => index.height())
    }

    fn reset_counters(&mut self) {
        dispatch!(self, index => index.reset_counters())
    }
}

impl From<BpTree> for Index {
    fn from(index: BpTree) -> Self {
        Index::BpTree(index)
    }
}

impl From<LsmTree> for Index {
    fn from(index: LsmTree) -> Self {
        Index::Lsm(index)
    }
}

impl From<FalsmTree> for Index {
    fn from(index: FalsmTree) -> Self {
        Index::Falsm(index)
    }
}

impl From<FaTree> for Index {
    fn from(index: FaTree) -> Self {
        Index::Fa(index)
    }
}
