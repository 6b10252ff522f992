//! Workload Driver Tests
//!
//! Tests verify:
//! - Steps run in order on every index
//! - Per-step counters match the index counters
//! - Unsupported bulkloads are skipped, not fatal
//! - Step labels

use indexsim::device::Disk;
use indexsim::{DbIndex, TimeCounter, Workload, WorkloadStep};

use crate::index_set;

// =============================================================================
// Helper Functions
// =============================================================================

fn mixed() -> Workload {
    Workload::new("mixed")
        .step(WorkloadStep::Topology(50_000))
        .step(WorkloadStep::Insert(10_000))
        .step(WorkloadStep::Bulkload(5_000))
        .step(WorkloadStep::PointSearch(100))
        .step(WorkloadStep::RangeSearch {
            length: 1_000,
            repeats: 3,
        })
        .step(WorkloadStep::Delete(2_000))
}

// =============================================================================
// Run Tests
// =============================================================================

#[test]
fn test_report_has_one_row_per_step_and_index() {
    let workload = mixed();
    let mut indexes = index_set(&Disk::ssd());

    let report = workload.run(&mut indexes);

    assert_eq!(report.workload, "mixed");
    assert_eq!(report.steps.len(), 6);
    for (step, expected) in report.steps.iter().zip(workload.steps()) {
        assert_eq!(&step.step, expected);
        let names: Vec<&str> = step.results.iter().map(|r| r.index.as_str()).collect();
        assert_eq!(names, vec!["BPTree", "LSMTree", "FALSMTree", "FATree"]);
    }
}

#[test]
fn test_step_times_add_up_to_index_counters() {
    let mut indexes = index_set(&Disk::ftl_flash(indexsim::NandCell::Slc));

    let report = mixed().run(&mut indexes);

    for index in &indexes {
        let total = index.time_counter(TimeCounter::TotalTime);
        let reported = report.total_time(index.name());
        assert!((total - reported).abs() <= 1e-9 * total.max(1.0));
        assert_eq!(report.total_wear_out(index.name()), index.disk().wear_out());
    }
}

#[test]
fn test_topology_step_is_free() {
    let mut indexes = index_set(&Disk::ssd());

    let report = Workload::new("warm-up")
        .step(WorkloadStep::Topology(20_000))
        .run(&mut indexes);

    for counters in &report.steps[0].results {
        assert_eq!(counters.time, 0.0);
        assert_eq!(counters.operations, 0);
        assert_eq!(counters.entries, 20_000);
        assert!(counters.height >= 1);
    }
}

#[test]
fn test_unsupported_bulkload_skipped() {
    let mut indexes = index_set(&Disk::ssd());

    let report = mixed().run(&mut indexes);

    let bulk = &report.steps[2];
    let skipped: Vec<bool> = bulk.results.iter().map(|r| r.skipped).collect();
    assert_eq!(skipped, vec![false, false, false, true]);

    let fa = &bulk.results[3];
    assert_eq!(fa.time, 0.0);
    assert_eq!(fa.entries, 60_000);

    // the run went on after the skipped step
    let last = report.steps.last().unwrap();
    assert_eq!(last.results[3].entries, 58_000);
    assert_eq!(last.results[0].entries, 63_000);
}

#[test]
fn test_search_steps_keep_entry_count() {
    let mut indexes = index_set(&Disk::pcm());

    let report = Workload::new("searches")
        .step(WorkloadStep::Insert(3_000))
        .step(WorkloadStep::PointSearchSelectivity {
            selectivity: 0.01,
            repeats: 2,
        })
        .step(WorkloadStep::RangeSearchSelectivity {
            selectivity: 0.5,
            repeats: 4,
        })
        .run(&mut indexes);

    for counters in &report.steps[1].results {
        assert_eq!(counters.entries, 3_000);
        assert_eq!(counters.operations, 60);
    }
    for counters in &report.steps[2].results {
        assert_eq!(counters.operations, 4);
    }
}

// =============================================================================
// Step Tests
// =============================================================================

#[test]
fn test_step_labels() {
    assert_eq!(WorkloadStep::Insert(5).to_string(), "insert(5)");
    assert_eq!(WorkloadStep::Bulkload(7).to_string(), "bulkload(7)");
    assert_eq!(WorkloadStep::Delete(1).to_string(), "delete(1)");
    assert_eq!(WorkloadStep::PointSearch(3).to_string(), "point search(3)");
    assert_eq!(
        WorkloadStep::RangeSearch {
            length: 10,
            repeats: 2
        }
        .to_string(),
        "range search(10, x2)"
    );
    assert_eq!(WorkloadStep::Topology(9).to_string(), "topology(9)");
}

#[test]
fn test_workload_builder_and_push() {
    let mut workload = Workload::new("w").step(WorkloadStep::Insert(1));
    workload.push(WorkloadStep::Delete(1));

    assert_eq!(workload.name(), "w");
    assert_eq!(
        workload.steps(),
        &[WorkloadStep::Insert(1), WorkloadStep::Delete(1)]
    );
}
