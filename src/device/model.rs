//! Memory models
//!
//! Byte-level cost functions of the supported media. A model knows its
//! access granularity and timings but nothing about FTL remapping or
//! dirty pages; that bookkeeping lives in the controller.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

use super::{AccessPattern, IoCounters};

/// PCM cells are written and read in 8-byte groups
pub const PCM_CELL_SIZE: u64 = 8;

/// PCM exposes 64-byte lines as its page
pub const PCM_PAGE_SIZE: u64 = 64;

// =============================================================================
// Timings
// =============================================================================

/// Per-page timings of an FTL-managed SSD (microseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SsdTimings {
    pub read_random: f64,
    pub read_sequential: f64,
    pub write_random: f64,
    pub write_sequential: f64,
    /// Update of a page that already holds data
    pub overwrite: f64,
    pub erase: f64,
}

impl SsdTimings {
    pub const PAGE_SIZE: u64 = 8192;
    pub const BLOCK_SIZE: u64 = 512 * 1024;
}

impl Default for SsdTimings {
    fn default() -> Self {
        Self {
            read_random: 21.0,
            read_sequential: 10.5,
            write_random: 45.0,
            write_sequential: 15.3,
            overwrite: 15.3,
            erase: 1500.0,
        }
    }
}

/// NAND cell technology of a flash chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NandCell {
    /// Single level cell
    Slc,
    /// Multi level cell
    Mlc,
    /// Triple level cell
    Tlc,
}

impl NandCell {
    pub fn page_size(&self) -> u64 {
        match self {
            NandCell::Slc => 4096,
            NandCell::Mlc => 8192,
            NandCell::Tlc => 16384,
        }
    }

    pub fn pages_per_block(&self) -> u64 {
        match self {
            NandCell::Slc => 64,
            NandCell::Mlc => 128,
            NandCell::Tlc => 256,
        }
    }

    pub fn block_size(&self) -> u64 {
        self.page_size() * self.pages_per_block()
    }

    /// Page read time (microseconds)
    pub fn read_time(&self) -> f64 {
        match self {
            NandCell::Slc => 25.0,
            NandCell::Mlc => 50.0,
            NandCell::Tlc => 75.0,
        }
    }

    /// Page program time (microseconds)
    pub fn program_time(&self) -> f64 {
        match self {
            NandCell::Slc => 200.0,
            NandCell::Mlc => 600.0,
            NandCell::Tlc => 1250.0,
        }
    }

    /// Block erase time (microseconds)
    pub fn erase_time(&self) -> f64 {
        match self {
            NandCell::Slc => 1500.0,
            NandCell::Mlc => 3000.0,
            NandCell::Tlc => 4500.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NandCell::Slc => "SLC",
            NandCell::Mlc => "MLC",
            NandCell::Tlc => "TLC",
        }
    }
}

/// Per-cell timings of phase change memory (microseconds per 8-byte cell)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PcmTimings {
    pub cell_read: f64,
    pub cell_write: f64,
}

impl Default for PcmTimings {
    fn default() -> Self {
        Self {
            cell_read: 0.0125,
            cell_write: 0.125,
        }
    }
}

// =============================================================================
// Medium
// =============================================================================

/// The physical medium behind a memory model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Medium {
    Ssd(SsdTimings),
    Nand(NandCell),
    Pcm(PcmTimings),
}

impl Medium {
    /// Time of reading one access unit
    fn unit_read(&self, pattern: AccessPattern) -> f64 {
        match (self, pattern) {
            (Medium::Ssd(t), AccessPattern::Random) => t.read_random,
            (Medium::Ssd(t), AccessPattern::Sequential) => t.read_sequential,
            // NAND chips have no internal parallelism to exploit
            (Medium::Nand(cell), _) => cell.read_time(),
            (Medium::Pcm(t), _) => t.cell_read,
        }
    }

    /// Time of writing one access unit
    fn unit_write(&self, pattern: AccessPattern) -> f64 {
        match (self, pattern) {
            (Medium::Ssd(t), AccessPattern::Random) => t.write_random,
            (Medium::Ssd(t), AccessPattern::Sequential) => t.write_sequential,
            (Medium::Nand(cell), _) => cell.program_time(),
            (Medium::Pcm(t), _) => t.cell_write,
        }
    }

    /// Time of updating one access unit in place
    fn unit_overwrite(&self) -> f64 {
        match self {
            Medium::Ssd(t) => t.overwrite,
            // a bare chip programs the page again
            Medium::Nand(cell) => cell.program_time(),
            Medium::Pcm(t) => t.cell_write,
        }
    }

    /// Time of erasing one block (PCM never erases)
    fn block_erase(&self) -> f64 {
        match self {
            Medium::Ssd(t) => t.erase,
            Medium::Nand(cell) => cell.erase_time(),
            Medium::Pcm(_) => 0.0,
        }
    }

    pub fn is_erase_free(&self) -> bool {
        matches!(self, Medium::Pcm(_))
    }
}

// =============================================================================
// MemoryModel
// =============================================================================

/// Byte cost engine of one medium
#[derive(Debug, Clone)]
pub struct MemoryModel {
    name: String,
    medium: Medium,
    page_size: u64,
    /// 0 for byte-addressable media
    block_size: u64,
    counters: IoCounters,
}

impl MemoryModel {
    /// Create a model with explicit geometry
    ///
    /// Erase-based media need a block made of whole pages, PCM must report a
    /// block size of 0.
    pub fn new(
        name: impl Into<String>,
        medium: Medium,
        page_size: u64,
        block_size: u64,
    ) -> Result<Self> {
        let name = name.into();

        if page_size == 0 {
            return Err(SimError::InvalidGeometry(format!(
                "{}: page size must be positive",
                name
            )));
        }

        if medium.is_erase_free() {
            if block_size != 0 {
                return Err(SimError::InvalidGeometry(format!(
                    "{}: byte-addressable media have no erase block, got {} bytes",
                    name, block_size
                )));
            }
            if page_size % PCM_CELL_SIZE != 0 {
                return Err(SimError::InvalidGeometry(format!(
                    "{}: page size {} is not a multiple of the {}-byte cell",
                    name, page_size, PCM_CELL_SIZE
                )));
            }
        } else if block_size < page_size || block_size % page_size != 0 {
            return Err(SimError::InvalidGeometry(format!(
                "{}: block size {} is not a positive multiple of page size {}",
                name, block_size, page_size
            )));
        }

        Ok(Self::preset(name, medium, page_size, block_size))
    }

    /// Samsung-class SSD with calibrated default timings
    pub fn ssd() -> Self {
        Self::preset(
            "SSD".to_string(),
            Medium::Ssd(SsdTimings::default()),
            SsdTimings::PAGE_SIZE,
            SsdTimings::BLOCK_SIZE,
        )
    }

    /// NAND flash chip of the given cell technology
    pub fn nand(cell: NandCell) -> Self {
        Self::preset(
            format!("NAND-{}", cell.label()),
            Medium::Nand(cell),
            cell.page_size(),
            cell.block_size(),
        )
    }

    /// Phase change memory with 64-byte pages
    pub fn pcm() -> Self {
        Self::preset(
            "PCM".to_string(),
            Medium::Pcm(PcmTimings::default()),
            PCM_PAGE_SIZE,
            0,
        )
    }

    /// Internal: presets carry known-good geometry
    fn preset(name: String, medium: Medium, page_size: u64, block_size: u64) -> Self {
        Self {
            name,
            medium,
            page_size,
            block_size,
            counters: IoCounters::default(),
        }
    }

    // =========================================================================
    // Cost functions
    // =========================================================================

    /// Bytes covered by one timed unit
    pub fn granularity(&self) -> u64 {
        match self.medium {
            Medium::Pcm(_) => PCM_CELL_SIZE,
            _ => self.page_size,
        }
    }

    /// Number of timed units needed to move `bytes`
    pub fn units(&self, bytes: u64) -> u64 {
        bytes.div_ceil(self.granularity())
    }

    pub fn read_time(&self, bytes: u64, pattern: AccessPattern) -> f64 {
        self.units(bytes) as f64 * self.medium.unit_read(pattern)
    }

    pub fn write_time(&self, bytes: u64, pattern: AccessPattern) -> f64 {
        self.units(bytes) as f64 * self.medium.unit_write(pattern)
    }

    pub fn overwrite_time(&self, bytes: u64) -> f64 {
        self.units(bytes) as f64 * self.medium.unit_overwrite()
    }

    pub fn erase_time(&self, blocks: u64) -> f64 {
        blocks as f64 * self.medium.block_erase()
    }

    /// Erase time of `pages` pages, billed as a fraction of a whole block
    pub fn erase_pages_time(&self, pages: u64) -> f64 {
        if self.block_size == 0 {
            return 0.0;
        }
        let blocks = (pages * self.page_size) as f64 / self.block_size as f64;
        self.medium.block_erase() * blocks
    }

    /// Read `bytes` and record the cost
    pub fn read(&mut self, bytes: u64, pattern: AccessPattern) -> f64 {
        let time = self.read_time(bytes, pattern);
        self.counters.read.record(time, bytes);
        time
    }

    /// Write `bytes` and record the cost
    pub fn write(&mut self, bytes: u64, pattern: AccessPattern) -> f64 {
        let time = self.write_time(bytes, pattern);
        self.counters.write.record(time, bytes);
        time
    }

    /// Overwrite `bytes` in place and record the cost
    pub fn overwrite(&mut self, bytes: u64) -> f64 {
        let time = self.overwrite_time(bytes);
        self.counters.overwrite.record(time, bytes);
        time
    }

    /// Erase `blocks` whole blocks and record the cost
    pub fn erase(&mut self, blocks: u64) -> f64 {
        let time = self.erase_time(blocks);
        self.counters.erase.record(time, blocks * self.block_size);
        time
    }

    /// Erase the blocks behind `pages` dirty pages and record the cost
    pub fn erase_pages(&mut self, pages: u64) -> f64 {
        let time = self.erase_pages_time(pages);
        self.counters.erase.record(time, pages * self.page_size);
        time
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn medium(&self) -> &Medium {
        &self.medium
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn counters(&self) -> &IoCounters {
        &self.counters
    }

    pub fn reset_counters(&mut self) {
        self.counters.reset();
    }
}
