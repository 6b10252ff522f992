//! Device counters
//!
//! One accumulator shape is shared by the three device layers. Each layer
//! only fills the categories it knows about:
//!
//! | layer      | amount unit | categories                        |
//! |------------|-------------|-----------------------------------|
//! | model      | bytes       | read, write, overwrite, erase     |
//! | controller | pages       | read, write, overwrite, erase     |
//! | disk       | pages       | read, write, overwrite, free      |
//!
//! A controller books every overwrite request under `overwrite` with its
//! full time. The remap write, block rewrite and erases it caused are booked
//! again under their own categories, so `total_time` of a controller counts
//! them twice.

use serde::{Deserialize, Serialize};

/// Accumulated time, volume and call count of one operation category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpCounter {
    /// Total time in microseconds
    pub time: f64,
    /// Total volume (bytes, pages or blocks depending on the layer)
    pub amount: u64,
    /// Number of calls
    pub operations: u64,
}

impl OpCounter {
    /// Record one call
    pub fn record(&mut self, time: f64, amount: u64) {
        self.time += time;
        self.amount += amount;
        self.operations += 1;
    }
}

/// Per-category counters of one device layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IoCounters {
    pub read: OpCounter,
    pub write: OpCounter,
    pub overwrite: OpCounter,
    pub free: OpCounter,
    pub erase: OpCounter,
}

impl IoCounters {
    /// Sum of the time of all categories
    pub fn total_time(&self) -> f64 {
        self.read.time + self.write.time + self.overwrite.time + self.free.time + self.erase.time
    }

    /// Sum of the call counts of all categories
    pub fn total_operations(&self) -> u64 {
        self.read.operations
            + self.write.operations
            + self.overwrite.operations
            + self.free.operations
            + self.erase.operations
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
