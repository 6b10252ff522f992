//! Index Contract Tests
//!
//! Tests verify:
//! - Totals equal the sum of their categories
//! - Uniform counter access by id
//! - Selectivity-based searches
//! - Clone independence and counter reset
//! - The `Index` enum forwards to the wrapped structure

use indexsim::device::Disk;
use indexsim::index::entries_for_selectivity;
use indexsim::{
    BpTree, BpTreeConfig, CountCounter, CounterId, CounterValue, DbIndex, FaConfig, FaTree,
    FalsmConfig, FalsmTree, Index, IndexKind, LsmConfig, LsmTree, TimeCounter,
};

use crate::{assert_close, scenario_table, TEN_PAGE_HEAD};

// =============================================================================
// Helper Functions
// =============================================================================

fn all_indexes(disk: &Disk) -> Vec<Index> {
    let table = scenario_table();
    vec![
        BpTree::new(disk.fresh_clone(), &table, BpTreeConfig::default().bulkload(true))
            .unwrap()
            .into(),
        LsmTree::new(
            disk.fresh_clone(),
            &table,
            LsmConfig::default().head_tree_size(TEN_PAGE_HEAD),
        )
        .unwrap()
        .into(),
        FalsmTree::new(
            disk.fresh_clone(),
            &table,
            FalsmConfig::default().head_tree_size(TEN_PAGE_HEAD),
        )
        .unwrap()
        .into(),
        FaTree::new(
            disk.fresh_clone(),
            &table,
            FaConfig::default().head_tree_size(TEN_PAGE_HEAD),
        )
        .unwrap()
        .into(),
    ]
}

fn mixed_workload(index: &mut Index) {
    index.insert_entries(20_000);
    index.find_point_entries(50);
    index.find_range_entries(2_000, 4);
    index.delete_entries(3_000);
    let _ = index.bulkload_entries(5_000);
    index.insert_entries(1_000);
}

// =============================================================================
// Counter Tests
// =============================================================================

#[test]
fn test_totals_equal_sum_of_categories() {
    for mut index in all_indexes(&Disk::ssd()) {
        mixed_workload(&mut index);

        let categories = [
            TimeCounter::InsertTime,
            TimeCounter::BulkloadTime,
            TimeCounter::DeleteTime,
            TimeCounter::PointSearchTime,
            TimeCounter::RangeSearchTime,
        ];
        let sum: f64 = categories.iter().map(|&c| index.time_counter(c)).sum();
        assert_close(index.time_counter(TimeCounter::TotalTime), sum);

        let operations: u64 = CountCounter::ALL[1..]
            .iter()
            .map(|&c| index.count_counter(c))
            .sum();
        assert_eq!(index.count_counter(CountCounter::TotalOperations), operations);
    }
}

#[test]
fn test_single_category_equals_total() {
    for mut index in all_indexes(&Disk::ssd()) {
        index.insert_entries(12_345);

        assert_eq!(
            index.time_counter(TimeCounter::TotalTime),
            index.time_counter(TimeCounter::InsertTime)
        );
        assert_eq!(index.count_counter(CountCounter::InsertOperations), 12_345);
        assert_eq!(index.count_counter(CountCounter::TotalOperations), 12_345);
    }
}

#[test]
fn test_search_counts() {
    for mut index in all_indexes(&Disk::ssd()) {
        index.insert_entries(5_000);
        index.find_point_entries(7);
        index.find_range_entries(100, 3);

        assert_eq!(index.count_counter(CountCounter::PointSearchOperations), 7);
        assert_eq!(index.count_counter(CountCounter::RangeSearchOperations), 3);
        assert_eq!(index.num_entries(), 5_000);
    }
}

#[test]
fn test_counter_by_id() {
    let mut index = all_indexes(&Disk::ssd()).remove(0);
    let time = index.insert_entries(500);

    assert_eq!(
        index.counter(TimeCounter::InsertTime.into()),
        ("insert time", CounterValue::Time(time))
    );
    assert_eq!(
        index.counter(CountCounter::InsertOperations.into()),
        ("insert operations", CounterValue::Count(500))
    );
    assert_eq!(CounterId::all().count(), 12);

    let names: Vec<&str> = CounterId::all().map(|id| id.name()).collect();
    assert_eq!(names[0], "total time");
    assert_eq!(names[6], "total operations");
}

#[test]
fn test_reset_keeps_structure() {
    for mut index in all_indexes(&Disk::ftl_flash(indexsim::NandCell::Mlc)) {
        index.insert_entries(30_000);
        let height = index.height();

        index.reset_counters();

        assert_eq!(index.time_counter(TimeCounter::TotalTime), 0.0);
        assert_eq!(index.count_counter(CountCounter::TotalOperations), 0);
        assert_eq!(index.disk().counters().total_operations(), 0);
        assert_eq!(index.disk().wear_out(), 0);
        assert_eq!(index.num_entries(), 30_000);
        assert_eq!(index.height(), height);
    }
}

// =============================================================================
// Selectivity Tests
// =============================================================================

#[test]
fn test_entries_for_selectivity_floors() {
    assert_eq!(entries_for_selectivity(1000, 0.0105), 10);
    assert_eq!(entries_for_selectivity(1000, 0.0), 0);
    assert_eq!(entries_for_selectivity(1000, 1.0), 1000);
    assert_eq!(entries_for_selectivity(0, 0.5), 0);
}

#[test]
fn test_point_search_by_selectivity() {
    for mut index in all_indexes(&Disk::ssd()) {
        index.insert_entries(10_000);

        let time = index.find_point_entries_by_selectivity(0.01, 2);

        assert_eq!(index.count_counter(CountCounter::PointSearchOperations), 200);
        assert_eq!(index.time_counter(TimeCounter::PointSearchTime), time);
    }
}

#[test]
fn test_range_search_by_selectivity() {
    for mut index in all_indexes(&Disk::ssd()) {
        index.insert_entries(10_000);
        let mut twin = index.clone();

        let by_selectivity = index.find_range_entries_by_selectivity(0.1, 3);
        let by_length = twin.find_range_entries(1_000, 3);

        assert_close(by_selectivity, by_length);
        assert_eq!(index.count_counter(CountCounter::RangeSearchOperations), 3);
    }
}

// =============================================================================
// Ownership Tests
// =============================================================================

#[test]
fn test_clone_is_independent() {
    for mut index in all_indexes(&Disk::ssd()) {
        index.insert_entries(10_000);
        let time = index.time_counter(TimeCounter::TotalTime);
        let operations = index.disk().counters().total_operations();

        let mut copy = index.clone();
        copy.insert_entries(10_000);
        copy.delete_entries(500);

        assert_eq!(index.num_entries(), 10_000);
        assert_eq!(index.time_counter(TimeCounter::TotalTime), time);
        assert_eq!(index.disk().counters().total_operations(), operations);
        assert_eq!(copy.num_entries(), 19_500);
    }
}

#[test]
fn test_index_enum_forwards() {
    let kinds: Vec<(IndexKind, String)> = all_indexes(&Disk::pcm())
        .iter()
        .map(|index| (index.kind(), index.name().to_string()))
        .collect();

    assert_eq!(
        kinds,
        vec![
            (IndexKind::BpTree, "BPTree".to_string()),
            (IndexKind::Lsm, "LSMTree".to_string()),
            (IndexKind::Falsm, "FALSMTree".to_string()),
            (IndexKind::Fa, "FATree".to_string()),
        ]
    );

    let index = &all_indexes(&Disk::pcm())[1];
    assert_eq!(index.key_size(), 8);
    assert_eq!(index.data_size(), 64);
    assert_eq!(index.record_size(), 72);
    assert_eq!(index.disk().name(), "PCM");
}

#[test]
fn test_bulkload_support_by_kind() {
    let supported: Vec<bool> = all_indexes(&Disk::ssd())
        .iter()
        .map(|index| index.is_bulkload_supported())
        .collect();

    assert_eq!(supported, vec![true, true, true, false]);
}
