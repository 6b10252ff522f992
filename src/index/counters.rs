//! Index counters
//!
//! Time counters hold accumulated microseconds, count counters hold
//! operation counts. Both families start with a total that is bumped together
//! with the category of every recorded call, so for an index that only ever
//! saw one kind of operation the total and the category are identical.

use serde::{Deserialize, Serialize};

/// Time-valued counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeCounter {
    TotalTime,
    InsertTime,
    BulkloadTime,
    DeleteTime,
    PointSearchTime,
    RangeSearchTime,
}

impl TimeCounter {
    pub const ALL: [TimeCounter; 6] = [
        TimeCounter::TotalTime,
        TimeCounter::InsertTime,
        TimeCounter::BulkloadTime,
        TimeCounter::DeleteTime,
        TimeCounter::PointSearchTime,
        TimeCounter::RangeSearchTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TimeCounter::TotalTime => "total time",
            TimeCounter::InsertTime => "insert time",
            TimeCounter::BulkloadTime => "bulkload time",
            TimeCounter::DeleteTime => "delete time",
            TimeCounter::PointSearchTime => "point search time",
            TimeCounter::RangeSearchTime => "range search time",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

/// Count-valued counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountCounter {
    TotalOperations,
    InsertOperations,
    BulkloadOperations,
    DeleteOperations,
    PointSearchOperations,
    RangeSearchOperations,
}

impl CountCounter {
    pub const ALL: [CountCounter; 6] = [
        CountCounter::TotalOperations,
        CountCounter::InsertOperations,
        CountCounter::BulkloadOperations,
        CountCounter::DeleteOperations,
        CountCounter::PointSearchOperations,
        CountCounter::RangeSearchOperations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CountCounter::TotalOperations => "total operations",
            CountCounter::InsertOperations => "insert operations",
            CountCounter::BulkloadOperations => "bulkload operations",
            CountCounter::DeleteOperations => "delete operations",
            CountCounter::PointSearchOperations => "point search operations",
            CountCounter::RangeSearchOperations => "range search operations",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

/// Any counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterId {
    Time(TimeCounter),
    Count(CountCounter),
}

impl CounterId {
    pub fn name(&self) -> &'static str {
        match self {
            CounterId::Time(counter) => counter.name(),
            CounterId::Count(counter) => counter.name(),
        }
    }

    /// Every counter, time counters first
    pub fn all() -> impl Iterator<Item = CounterId> {
        TimeCounter::ALL
            .into_iter()
            .map(CounterId::Time)
            .chain(CountCounter::ALL.into_iter().map(CounterId::Count))
    }
}

impl From<TimeCounter> for CounterId {
    fn from(counter: TimeCounter) -> Self {
        CounterId::Time(counter)
    }
}

impl From<CountCounter> for CounterId {
    fn from(counter: CountCounter) -> Self {
        CounterId::Count(counter)
    }
}

/// Value of a counter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CounterValue {
    Time(f64),
    Count(u64),
}

/// The operation category a call is booked under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    Insert,
    Bulkload,
    Delete,
    PointSearch,
    RangeSearch,
}

impl OpKind {
    pub fn time_counter(&self) -> TimeCounter {
        match self {
            OpKind::Insert => TimeCounter::InsertTime,
            OpKind::Bulkload => TimeCounter::BulkloadTime,
            OpKind::Delete => TimeCounter::DeleteTime,
            OpKind::PointSearch => TimeCounter::PointSearchTime,
            OpKind::RangeSearch => TimeCounter::RangeSearchTime,
        }
    }

    pub fn count_counter(&self) -> CountCounter {
        match self {
            OpKind::Insert => CountCounter::InsertOperations,
            OpKind::Bulkload => CountCounter::BulkloadOperations,
            OpKind::Delete => CountCounter::DeleteOperations,
            OpKind::PointSearch => CountCounter::PointSearchOperations,
            OpKind::RangeSearch => CountCounter::RangeSearchOperations,
        }
    }
}

/// Counter table of one index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexCounters {
    times: [f64; 6],
    counts: [u64; 6],
}

impl IndexCounters {
    /// Book `time` and `operations` under `kind` and the totals
    pub fn record(&mut self, kind: OpKind, operations: u64, time: f64) {
        self.times[TimeCounter::TotalTime.slot()] += time;
        self.times[kind.time_counter().slot()] += time;
        self.counts[CountCounter::TotalOperations.slot()] += operations;
        self.counts[kind.count_counter().slot()] += operations;
    }

    pub fn time(&self, counter: TimeCounter) -> f64 {
        self.times[counter.slot()]
    }

    pub fn count(&self, counter: CountCounter) -> u64 {
        self.counts[counter.slot()]
    }

    /// Uniform `(name, value)` accessor
    pub fn get(&self, id: CounterId) -> (&'static str, CounterValue) {
        match id {
            CounterId::Time(counter) => (counter.name(), CounterValue::Time(self.time(counter))),
            CounterId::Count(counter) => {
                (counter.name(), CounterValue::Count(self.count(counter)))
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
