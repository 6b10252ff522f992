//! Workload Module
//!
//! A workload is an ordered list of steps applied to a set of indexes. Every
//! step runs on every index before the next step starts, and the driver
//! records what each (step, index) pair cost.
//!
//! ```text
//!   step 1 ──► index A, index B, ...  ──► StepReport
//!   step 2 ──► index A, index B, ...  ──► StepReport
//! ```
//!
//! After each step the entry count of every index is checked against what
//! the step should have produced. A mismatch is logged and the run goes on.

mod counters;

pub use counters::{StepCounters, StepReport, WorkloadReport};

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::index::{CountCounter, DbIndex, Index};

/// One step of a workload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WorkloadStep {
    Insert(u64),
    Bulkload(u64),
    Delete(u64),
    PointSearch(u64),
    PointSearchSelectivity { selectivity: f64, repeats: u64 },
    RangeSearch { length: u64, repeats: u64 },
    RangeSearchSelectivity { selectivity: f64, repeats: u64 },
    /// Cost-free fast-forward of the structure
    Topology(u64),
}

impl fmt::Display for WorkloadStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadStep::Insert(n) => write!(f, "insert({})", n),
            WorkloadStep::Bulkload(n) => write!(f, "bulkload({})", n),
            WorkloadStep::Delete(n) => write!(f, "delete({})", n),
            WorkloadStep::PointSearch(n) => write!(f, "point search({})", n),
            WorkloadStep::PointSearchSelectivity {
                selectivity,
                repeats,
            } => write!(f, "point search({}, x{})", selectivity, repeats),
            WorkloadStep::RangeSearch { length, repeats } => {
                write!(f, "range search({}, x{})", length, repeats)
            }
            WorkloadStep::RangeSearchSelectivity {
                selectivity,
                repeats,
            } => write!(f, "range search({}, x{})", selectivity, repeats),
            WorkloadStep::Topology(n) => write!(f, "topology({})", n),
        }
    }
}

/// Named sequence of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    name: String,
    steps: Vec<WorkloadStep>,
}

impl Workload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn step(mut self, step: WorkloadStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: WorkloadStep) {
        self.steps.push(step);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[WorkloadStep] {
        &self.steps
    }

    /// Apply every step to every index
    pub fn run(&self, indexes: &mut [Index]) -> WorkloadReport {
        let mut steps = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let results = indexes
                .iter_mut()
                .map(|index| Self::apply(*step, index))
                .collect();

            info!(workload = %self.name, step = %step, "step finished");
            steps.push(StepReport {
                step: *step,
                results,
            });
        }

        WorkloadReport {
            workload: self.name.clone(),
            steps,
        }
    }

    fn apply(step: WorkloadStep, index: &mut Index) -> StepCounters {
        let entries_before = index.num_entries();
        let operations_before = index.count_counter(CountCounter::TotalOperations);
        let wear_before = index.disk().wear_out();

        let mut skipped = false;
        let time = match step {
            WorkloadStep::Insert(n) => index.insert_entries(n),
            WorkloadStep::Bulkload(n) => match index.bulkload_entries(n) {
                Ok(time) => time,
                Err(err) => {
                    info!(index = index.name(), error = %err, "bulkload skipped");
                    skipped = true;
                    0.0
                }
            },
            WorkloadStep::Delete(n) => index.delete_entries(n),
            WorkloadStep::PointSearch(n) => index.find_point_entries(n),
            WorkloadStep::PointSearchSelectivity {
                selectivity,
                repeats,
            } => index.find_point_entries_by_selectivity(selectivity, repeats),
            WorkloadStep::RangeSearch { length, repeats } => {
                index.find_range_entries(length, repeats)
            }
            WorkloadStep::RangeSearchSelectivity {
                selectivity,
                repeats,
            } => index.find_range_entries_by_selectivity(selectivity, repeats),
            WorkloadStep::Topology(n) => {
                index.create_topology_after_insert(n);
                0.0
            }
        };

        let expected = match step {
            WorkloadStep::Insert(n) | WorkloadStep::Topology(n) => entries_before + n,
            WorkloadStep::Bulkload(n) if !skipped => entries_before + n,
            WorkloadStep::Delete(n) => entries_before.saturating_sub(n),
            _ => entries_before,
        };
        if index.num_entries() != expected {
            warn!(
                index = index.name(),
                step = %step,
                expected,
                actual = index.num_entries(),
                "entry count mismatch"
            );
        }

        StepCounters {
            index: index.name().to_string(),
            kind: index.kind(),
            time,
            operations: index
                .count_counter(CountCounter::TotalOperations)
                .saturating_sub(operations_before),
            entries: index.num_entries(),
            height: index.height(),
            wear_out: index.disk().wear_out().saturating_sub(wear_before),
            skipped,
        }
    }
}
