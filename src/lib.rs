//! # indexsim
//!
//! An analytical cost simulator for on-disk index structures:
//! - Device models for SSD, raw and FTL-managed NAND flash and PCM
//! - Page/block/erase accounting with wear-out tracking
//! - B+Tree, LSM-Tree, FALSM-Tree and FA-Tree structural bookkeeping
//! - Workload driver with per-step counters and parallel evaluation
//!
//! No real I/O happens. Every operation returns the time the device would
//! have needed, computed from calibrated per-page timings.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Workload driver / Report sink                 │
//! │                 (one worker per job, crossbeam)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ DbIndex operations
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │        Index  (BpTree | LsmTree | FalsmTree | FaTree)        │
//! │               structural bookkeeping + counters              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ page reads / writes / overwrites / frees
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                            Disk                              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │      LowLevelController (FTL remap, raw rewrite, GC)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes / blocks
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │          MemoryModel (SSD | NAND SLC/MLC/TLC | PCM)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod device;
pub mod table;
pub mod index;
pub mod workload;
pub mod report;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SimError};
pub use config::{
    BpTreeConfig, BulkloadPolicy, DeviceConfig, DeviceKind, FaConfig, FalsmConfig, LsmConfig,
};
pub use device::{AccessPattern, Disk, NandCell};
pub use table::DbTable;
pub use index::{
    BpTree, CountCounter, CounterId, CounterValue, DbIndex, FaTree, FalsmTree, Index, IndexKind,
    LsmTree, TimeCounter,
};
pub use workload::{Workload, WorkloadReport, WorkloadStep};
pub use report::{run_parallel, Job, ReportFormat, ReportSink};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of indexsim
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
