//! Device Module
//!
//! Analytical models of the storage media an index runs on.
//!
//! ## Layers
//! ```text
//! ┌──────────────────────────────┐
//! │ Disk                         │  index-visible read/write/overwrite/free
//! ├──────────────────────────────┤
//! │ LowLevelController           │  pages, blocks, FTL remap, dirty pages,
//! │                              │  erase amortization, wear-out
//! ├──────────────────────────────┤
//! │ MemoryModel                  │  bytes -> microseconds per medium
//! └──────────────────────────────┘
//! ```
//!
//! Every layer keeps its own `IoCounters`, so index-requested traffic and
//! controller-generated traffic can be told apart.

mod controller;
mod counters;
mod disk;
mod model;

use serde::{Deserialize, Serialize};

pub use controller::{LowLevelController, Translation};
pub use counters::{IoCounters, OpCounter};
pub use disk::Disk;
pub use model::{
    Medium, MemoryModel, NandCell, PcmTimings, SsdTimings, PCM_CELL_SIZE, PCM_PAGE_SIZE,
};

/// Locality of an access, media price sequential runs differently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessPattern {
    Random,
    Sequential,
}
