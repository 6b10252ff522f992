//! Workload Tests
//!
//! Step sequencing, per-step counters and report output.

mod workload_tests;

use indexsim::device::Disk;
use indexsim::{
    BpTree, BpTreeConfig, DbTable, FaConfig, FaTree, FalsmConfig, FalsmTree, Index, LsmConfig,
    LsmTree,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// One index of each kind on fresh copies of `disk`
pub fn index_set(disk: &Disk) -> Vec<Index> {
    let table = DbTable::order_line();
    vec![
        BpTree::new(disk.fresh_clone(), &table, BpTreeConfig::default().bulkload(true))
            .unwrap()
            .into(),
        LsmTree::new(disk.fresh_clone(), &table, LsmConfig::default())
            .unwrap()
            .into(),
        FalsmTree::new(disk.fresh_clone(), &table, FalsmConfig::default())
            .unwrap()
            .into(),
        FaTree::new(disk.fresh_clone(), &table, FaConfig::default())
            .unwrap()
            .into(),
    ]
}
