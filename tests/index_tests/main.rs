//! Index Tests
//!
//! B+Tree, LSM-Tree, FALSM-Tree and FA-Tree cost models and the shared
//! index contract.

mod bptree_tests;
mod contract_tests;

use indexsim::DbTable;

// =============================================================================
// Helper Functions
// =============================================================================

/// 8-byte keys with 64-byte payloads: 72-byte records
pub fn scenario_table() -> DbTable {
    DbTable::new("Scenario", 8, 64)
}

/// Ten SSD pages
pub const TEN_PAGE_HEAD: u64 = 10 * 8192;

/// Compare simulated times that were built from many additions
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {}, got {}",
        expected,
        actual
    );
}
