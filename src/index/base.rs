//! State shared by every index kind

use crate::device::Disk;
use crate::error::{Result, SimError};
use crate::table::DbTable;

use super::{IndexCounters, OpKind};

/// Disk, schema sizes, entry count and counters of one index
#[derive(Debug, Clone)]
pub struct IndexBase {
    name: String,
    disk: Disk,
    table: DbTable,
    num_entries: u64,
    counters: IndexCounters,
}

impl IndexBase {
    pub(crate) fn new(name: impl Into<String>, disk: Disk, table: &DbTable) -> Result<Self> {
        let name = name.into();

        if table.key_size() == 0 {
            return Err(SimError::Config(format!(
                "{}: key size of {} must be positive",
                name, table
            )));
        }

        Ok(Self {
            name,
            disk,
            table: table.clone(),
            num_entries: 0,
            counters: IndexCounters::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn disk(&self) -> &Disk {
        &self.disk
    }

    pub(crate) fn disk_mut(&mut self) -> &mut Disk {
        &mut self.disk
    }

    pub fn table(&self) -> &DbTable {
        &self.table
    }

    pub fn num_entries(&self) -> u64 {
        self.num_entries
    }

    pub fn counters(&self) -> &IndexCounters {
        &self.counters
    }

    pub(crate) fn record(&mut self, kind: OpKind, operations: u64, time: f64) {
        self.counters.record(kind, operations, time);
    }

    pub(crate) fn add_entries(&mut self, n: u64) {
        self.num_entries += n;
    }

    pub(crate) fn remove_entries(&mut self, n: u64) {
        debug_assert!(
            n <= self.num_entries,
            "{}: deleting {} of {} entries",
            self.name,
            n,
            self.num_entries
        );
        self.num_entries = self.num_entries.saturating_sub(n);
    }

    /// Zero index counters and every device counter below them
    pub(crate) fn reset_counters(&mut self) {
        self.counters.reset();
        self.disk.reset_counters();
    }
}
