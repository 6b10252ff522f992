//! B+Tree Tests
//!
//! Tests verify:
//! - Node geometry derived from node size and record size
//! - Insert costs before and at the first split
//! - Merge and borrow on delete underflow
//! - Bottom-up bulkload and its inner node count
//! - Point and range search costs
//! - Raw flash overwrite penalty

use indexsim::device::{AccessPattern, Disk, NandCell};
use indexsim::{BpTree, BpTreeConfig, DbIndex, DbTable, SimError, TimeCounter};

use crate::{assert_close, scenario_table};

// =============================================================================
// Helper Functions
// =============================================================================

fn ssd_tree() -> BpTree {
    BpTree::new(Disk::ssd(), &scenario_table(), BpTreeConfig::default()).unwrap()
}

fn bulk_tree() -> BpTree {
    BpTree::new(
        Disk::ssd(),
        &scenario_table(),
        BpTreeConfig::default().bulkload(true),
    )
    .unwrap()
}

// =============================================================================
// Geometry Tests
// =============================================================================

#[test]
fn test_node_geometry() {
    let tree = ssd_tree();

    assert_eq!(tree.leaf_capacity(), 8192 / 72 - 1);
    assert_eq!(tree.leaf_capacity(), 112);
    assert_eq!(tree.fanout(), 8192 / 16);
    assert_eq!(tree.pages_per_node(), 1);
    assert_eq!(tree.height(), 0);
}

#[test]
fn test_node_spanning_pages() {
    let tree = BpTree::new(Disk::pcm(), &scenario_table(), BpTreeConfig::default()).unwrap();
    assert_eq!(tree.pages_per_node(), 8192 / 64);
}

#[test]
fn test_too_small_node_rejected() {
    let result = BpTree::new(
        Disk::ssd(),
        &DbTable::customer(),
        BpTreeConfig::default().node_size(1024),
    );
    assert!(matches!(result, Err(SimError::Config(_))));

    let zero_key = BpTree::new(Disk::ssd(), &DbTable::new("Bad", 0, 10), BpTreeConfig::default());
    assert!(matches!(zero_key, Err(SimError::Config(_))));
}

// =============================================================================
// Insert Tests
// =============================================================================

#[test]
fn test_first_insert_reads_and_writes_root_leaf() {
    let mut tree = ssd_tree();

    assert_eq!(tree.insert_entry(), 21.0 + 45.0);
    assert_eq!(tree.height(), 1);
    assert_eq!(tree.disk().counters().read.operations, 1);
    assert_eq!(tree.disk().counters().write.operations, 1);
    assert_eq!(tree.num_entries(), 1);
}

#[test]
fn test_insert_costs_read_plus_write_until_erase() {
    let mut tree = ssd_tree();
    assert_eq!(tree.insert_entry(), 21.0 + 45.0);

    // overwrites 1..=63 leave the dirty backlog below one block
    for _ in 2..=64 {
        assert_eq!(tree.insert_entry(), 21.0 + 45.0);
    }

    // the 64th overwrite fills a block of dirty pages
    assert_eq!(tree.insert_entry(), 21.0 + 45.0 + 1500.0);
    assert_eq!(tree.disk().low_level_controller().dirty_pages(), 0);
}

#[test]
fn test_leaf_fills_before_first_split() {
    let mut tree = ssd_tree();

    tree.insert_entries(112);
    assert_eq!(tree.height(), 1);
    assert_eq!(tree.leaf_count(), 1);

    // read leaf, rewrite left half, write right half, write new root
    let time = tree.insert_entry();
    assert_eq!(time, 21.0 + 45.0 + 45.0 + 45.0);
    assert_eq!(tree.height(), 2);
    assert_eq!(tree.leaf_count(), 2);
    assert_eq!(tree.inner_node_count(), 1);
}

#[test]
fn test_batch_insert_equals_single_inserts() {
    let mut batch = ssd_tree();
    let mut single = ssd_tree();

    let batch_time = batch.insert_entries(5000);
    let mut single_time = 0.0;
    for _ in 0..5000 {
        single_time += single.insert_entry();
    }

    assert_close(batch_time, single_time);
    assert_eq!(batch.height(), single.height());
    assert_eq!(batch.leaf_count(), single.leaf_count());
    assert_eq!(
        batch.disk().counters().overwrite.operations,
        single.disk().counters().overwrite.operations
    );
}

#[test]
fn test_height_grows_one_level_at_a_time() {
    let mut tree = ssd_tree();
    let mut height = tree.height();

    for _ in 0..20_000 {
        tree.insert_entry();
        assert!(tree.height() <= height + 1);
        height = tree.height();
    }
    assert_eq!(height, 2);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_from_root_leaf() {
    let mut tree = ssd_tree();
    tree.insert_entries(10);

    let time = tree.delete_entries(9);
    assert_eq!(time, 9.0 * (21.0 + 45.0));
    assert_eq!(tree.height(), 1);

    tree.delete_entry();
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.num_entries(), 0);
    assert_eq!(tree.disk().counters().free.operations, 1);
}

#[test]
fn test_underflow_merges_and_collapses_root() {
    let mut tree = ssd_tree();
    tree.insert_entries(113);
    assert_eq!(tree.height(), 2);

    // right leaf 57 -> 56 stays at minimum fill
    tree.delete_entry();
    assert_eq!(tree.height(), 2);

    // right leaf underflows, merges left, root keeps one child
    tree.delete_entry();
    assert_eq!(tree.height(), 1);
    assert_eq!(tree.leaf_count(), 1);
    assert_eq!(tree.num_entries(), 111);
}

#[test]
fn test_underflow_borrows_from_full_sibling() {
    let mut tree = bulk_tree();
    tree.bulkload_entries(224).unwrap();
    assert_eq!(tree.leaf_count(), 2);

    tree.delete_entries(56);
    let frees = tree.disk().counters().free.operations;

    tree.delete_entry();

    assert_eq!(tree.leaf_count(), 2);
    assert_eq!(tree.height(), 2);
    assert_eq!(tree.num_entries(), 167);
    assert_eq!(tree.disk().counters().free.operations, frees);
}

#[test]
fn test_insert_delete_round_trip_restores_height() {
    let mut tree = ssd_tree();
    tree.insert_entries(30_000);
    assert_eq!(tree.height(), 3);

    tree.delete_entries(30_000);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.num_entries(), 0);
}

// =============================================================================
// Bulkload Tests
// =============================================================================

#[test]
fn test_bulkload_requires_bulk_mode() {
    let mut tree = ssd_tree();

    assert!(!tree.is_bulkload_supported());
    assert!(matches!(
        tree.bulkload_entries(100),
        Err(SimError::BulkloadUnsupported { .. })
    ));
    assert_eq!(tree.num_entries(), 0);
}

#[test]
fn test_bulkload_fresh_tree() {
    let mut tree = bulk_tree();

    let time = tree.bulkload_entries(10 * 112).unwrap();

    // ten full leaves and one root, all written sequentially
    assert_close(time, 11.0 * 15.3);
    assert_eq!(tree.leaf_count(), 10);
    assert_eq!(tree.height(), 2);
    assert_eq!(tree.last_bulkload_inner_nodes(), 1);
    assert_eq!(tree.time_counter(TimeCounter::BulkloadTime), time);
}

#[test]
fn test_bulkload_reuses_rightmost_path() {
    let mut tree = bulk_tree();
    tree.bulkload_entries(10 * 112).unwrap();

    let time = tree.bulkload_entries(200).unwrap();

    // read path, two new leaves, root topped up in place
    assert_close(time, 2.0 * 21.0 + 2.0 * 15.3 + 45.0);
    assert_eq!(tree.leaf_count(), 12);
    assert_eq!(tree.height(), 2);
    assert_eq!(tree.last_bulkload_inner_nodes(), 1);
    assert_eq!(tree.num_entries(), 1320);
}

#[test]
fn test_bulkload_balances_trailing_leaf() {
    let mut tree = bulk_tree();

    tree.bulkload_entries(122).unwrap();

    assert_eq!(tree.leaf_count(), 2);
    assert_eq!(tree.height(), 2);

    // both halves survive deleting down to minimum fill without merging
    tree.delete_entries(5);
    assert_eq!(tree.leaf_count(), 2);
}

#[test]
fn test_bulkload_grows_inner_levels() {
    let mut tree = bulk_tree();

    tree.bulkload_entries(600 * 112).unwrap();

    assert_eq!(tree.leaf_count(), 600);
    assert_eq!(tree.nodes_at_level(1), 2);
    assert_eq!(tree.nodes_at_level(2), 1);
    assert_eq!(tree.height(), 3);
    assert_eq!(tree.last_bulkload_inner_nodes(), 3);
}

// =============================================================================
// Search Tests
// =============================================================================

#[test]
fn test_point_search_reads_one_node_per_level() {
    let mut tree = bulk_tree();
    tree.bulkload_entries(10 * 112).unwrap();

    let time = tree.find_point_entries(10);

    assert_eq!(time, 10.0 * 2.0 * 21.0);
    assert_eq!(tree.num_entries(), 1120);
}

#[test]
fn test_range_search_reads_spanned_leaves() {
    let mut tree = bulk_tree();
    tree.bulkload_entries(10 * 112).unwrap();

    // 300 of 1120 entries span three of ten leaves
    let time = tree.find_range_entries(300, 2);

    assert_eq!(time, 2.0 * (2.0 * 21.0 + 2.0 * 10.5));
}

#[test]
fn test_search_on_empty_tree_is_free() {
    let mut tree = ssd_tree();

    assert_eq!(tree.find_point_entries(5), 0.0);
    assert_eq!(tree.find_range_entries(100, 5), 0.0);
}

// =============================================================================
// Device Tests
// =============================================================================

#[test]
fn test_raw_flash_rewrites_whole_block_per_insert() {
    let table = scenario_table();
    let config = BpTreeConfig::default().node_size(4096);
    let mut raw = BpTree::new(Disk::raw_flash(NandCell::Slc), &table, config).unwrap();
    let mut ftl = BpTree::new(Disk::ftl_flash(NandCell::Slc), &table, config).unwrap();

    raw.insert_entry();
    ftl.insert_entry();

    let raw_time = raw.insert_entry();
    let ftl_time = ftl.insert_entry();

    assert_eq!(raw_time, 64.0 * 25.0 + 64.0 * 200.0 + 1500.0);
    assert_eq!(ftl_time, 25.0 + 200.0);
    assert!(raw_time > ftl_time);
}

#[test]
fn test_topology_matches_incremental_inserts() {
    let mut incremental = ssd_tree();
    let mut fast = ssd_tree();

    incremental.insert_entries(50_000);
    fast.create_topology_after_insert(50_000);

    assert_eq!(fast.num_entries(), 50_000);
    assert_eq!(fast.height(), incremental.height());
    assert_eq!(fast.leaf_count(), incremental.leaf_count());
    assert_eq!(fast.inner_node_count(), incremental.inner_node_count());
    assert_eq!(fast.time_counter(TimeCounter::TotalTime), 0.0);
    assert_eq!(fast.disk().counters().total_operations(), 0);

    // the shapes stay in step afterwards
    fast.insert_entries(1000);
    incremental.insert_entries(1000);
    assert_eq!(fast.leaf_count(), incremental.leaf_count());
    assert!(fast.time_counter(TimeCounter::InsertTime) > 0.0);
}

#[test]
fn test_node_accesses_are_page_granular() {
    let mut tree = BpTree::new(Disk::pcm(), &scenario_table(), BpTreeConfig::default()).unwrap();
    tree.insert_entries(2);

    // one root leaf read per insert
    let reads = tree.disk().counters().read;
    assert_eq!(reads.operations, 2);
    assert_eq!(reads.amount, 256);

    let mut scratch = tree.disk().fresh_clone();
    assert_close(
        2.0 * scratch.read_pages(128, AccessPattern::Random),
        tree.disk().counters().read.time,
    );
}
