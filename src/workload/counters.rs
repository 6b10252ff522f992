//! Per-step results of a workload run

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::IndexKind;

use super::WorkloadStep;

/// What one step cost one index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCounters {
    pub index: String,
    pub kind: IndexKind,

    /// Simulated time of the step (microseconds)
    pub time: f64,

    /// Operations booked by the step
    pub operations: u64,

    /// Entries after the step
    pub entries: u64,

    /// Height after the step
    pub height: u64,

    /// Wear-out added by the step (bytes)
    pub wear_out: u64,

    /// The index could not run the step
    pub skipped: bool,
}

/// Results of one step over all indexes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: WorkloadStep,
    pub results: Vec<StepCounters>,
}

/// Results of a whole workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadReport {
    pub workload: String,
    pub steps: Vec<StepReport>,
}

impl WorkloadReport {
    /// Summed step time of one index
    pub fn total_time(&self, index: &str) -> f64 {
        self.results_of(index).map(|counters| counters.time).sum()
    }

    /// Summed wear-out of one index
    pub fn total_wear_out(&self, index: &str) -> u64 {
        self.results_of(index).map(|counters| counters.wear_out).sum()
    }

    fn results_of<'a>(&'a self, index: &'a str) -> impl Iterator<Item = &'a StepCounters> + 'a {
        self.steps
            .iter()
            .flat_map(|step| step.results.iter())
            .filter(move |counters| counters.index == index)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for WorkloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "workload {}", self.workload)?;
        writeln!(
            f,
            "{:<36} {:<10} {:>16} {:>12} {:>12} {:>7} {:>16}",
            "step", "index", "time (us)", "operations", "entries", "height", "wear-out (B)"
        )?;

        for step in &self.steps {
            let label = step.step.to_string();
            for counters in &step.results {
                if counters.skipped {
                    writeln!(f, "{:<36} {:<10} {:>16}", label, counters.index, "skipped")?;
                    continue;
                }
                writeln!(
                    f,
                    "{:<36} {:<10} {:>16.3} {:>12} {:>12} {:>7} {:>16}",
                    label,
                    counters.index,
                    counters.time,
                    counters.operations,
                    counters.entries,
                    counters.height,
                    counters.wear_out
                )?;
            }
        }
        Ok(())
    }
}
