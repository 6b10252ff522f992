//! Low Level Controller
//!
//! Page and block bookkeeping on top of a memory model.
//!
//! ## Translation modes
//! - `Ftl`: logical overwrites are remapped to fresh pages; the old pages
//!   become dirty and are erased lazily once they add up to a block.
//! - `Raw`: no remapping; overwriting a page rewrites its whole block
//!   (read the untouched pages, erase, program the block again).
//! - `ByteAddressable`: in-place updates, no erase at all (PCM).
//!
//! ## Erase amortization
//! ```text
//! dirty_pages += pages
//! if dirty_pages >= pages_in_block:
//!     charge         erase_time * dirty_pages / pages_in_block   (fractional)
//!     dirty_pages  = dirty_pages % pages_in_block
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

use super::{AccessPattern, IoCounters, MemoryModel};

/// How logical pages are mapped onto physical pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Translation {
    Ftl,
    Raw,
    ByteAddressable,
}

/// Page-granular controller owning one memory model
#[derive(Debug, Clone)]
pub struct LowLevelController {
    model: MemoryModel,
    translation: Translation,
    /// Invalidated pages waiting for their block to be erased
    dirty_pages: u64,
    /// Physical operations, including the ones generated internally
    counters: IoCounters,
    /// Bytes physically programmed or erased since the last reset
    wear_out: u64,
}

impl LowLevelController {
    /// Wrap a model; byte-addressable translation requires an erase-free
    /// model and the other modes require an erase block.
    pub fn new(model: MemoryModel, translation: Translation) -> Result<Self> {
        let erase_free = model.medium().is_erase_free();
        let byte_addressable = translation == Translation::ByteAddressable;

        if erase_free != byte_addressable {
            return Err(SimError::InvalidGeometry(format!(
                "{}: translation {:?} does not match the medium",
                model.name(),
                translation
            )));
        }

        Ok(Self::preset(model, translation))
    }

    /// Internal: presets pair models and translations that are known to fit
    pub(crate) fn preset(model: MemoryModel, translation: Translation) -> Self {
        Self {
            model,
            translation,
            dirty_pages: 0,
            counters: IoCounters::default(),
            wear_out: 0,
        }
    }

    // =========================================================================
    // Page Operations
    // =========================================================================

    /// Read `pages` pages
    pub fn read_pages(&mut self, pages: u64, pattern: AccessPattern) -> f64 {
        if pages == 0 {
            return 0.0;
        }

        let time = self.model.read(self.bytes(pages), pattern);
        self.counters.read.record(time, pages);
        time
    }

    /// Program `pages` free pages
    pub fn write_pages(&mut self, pages: u64, pattern: AccessPattern) -> f64 {
        if pages == 0 {
            return 0.0;
        }

        let bytes = self.bytes(pages);
        let time = self.model.write(bytes, pattern);
        self.counters.write.record(time, pages);
        self.wear_out += self.model.units(bytes) * self.model.granularity();
        time
    }

    /// Update `pages` pages that already hold data
    pub fn overwrite_pages(&mut self, pages: u64, pattern: AccessPattern) -> f64 {
        if pages == 0 {
            return 0.0;
        }

        let time = self.apply_overwrite(pages, pattern);
        self.counters.overwrite.record(time, pages);
        time
    }

    fn apply_overwrite(&mut self, pages: u64, pattern: AccessPattern) -> f64 {
        match self.translation {
            Translation::Ftl => {
                // Remap to fresh pages, the old copies turn dirty
                let time = self.write_pages(pages, pattern);
                self.dirty_pages += pages;
                time + self.collect_garbage()
            }
            Translation::Raw => {
                let pages_in_block = self.pages_in_block();
                let blocks = pages.div_ceil(pages_in_block);
                let block_pages = blocks * pages_in_block;

                // The caller supplies the updated pages, the rest of each
                // block has to be saved before the erase.
                let mut time = self.read_pages(block_pages - pages, AccessPattern::Sequential);
                time += self.erase_blocks(blocks);
                time += self.write_pages(block_pages, AccessPattern::Sequential);
                time
            }
            Translation::ByteAddressable => {
                let bytes = self.bytes(pages);
                let time = self.model.overwrite(bytes);
                self.wear_out += self.model.units(bytes) * self.model.granularity();
                time
            }
        }
    }

    /// Invalidate `pages` pages that are no longer referenced
    pub fn free_pages(&mut self, pages: u64) -> f64 {
        match self.translation {
            Translation::Ftl | Translation::Raw => {
                self.dirty_pages += pages;
                self.collect_garbage()
            }
            Translation::ByteAddressable => 0.0,
        }
    }

    /// Erase `blocks` whole blocks
    pub fn erase_blocks(&mut self, blocks: u64) -> f64 {
        if blocks == 0 || self.block_size() == 0 {
            return 0.0;
        }

        let time = self.model.erase(blocks);
        self.counters.erase.record(time, blocks * self.pages_in_block());
        self.wear_out += blocks * self.block_size();
        time
    }

    /// Bill the erase of the dirty backlog once it fills a block
    ///
    /// The whole backlog is billed pro rata, so a burst over a block
    /// boundary pays `erase_time * dirty / pages_in_block`. Only the
    /// remainder modulo a block carries over.
    fn collect_garbage(&mut self) -> f64 {
        let pages_in_block = self.pages_in_block();
        if pages_in_block == 0 || self.dirty_pages < pages_in_block {
            return 0.0;
        }

        let pages = self.dirty_pages;
        self.dirty_pages %= pages_in_block;

        tracing::trace!(
            device = self.model.name(),
            pages,
            remaining_dirty = self.dirty_pages,
            "erasing dirty pages"
        );

        let time = self.model.erase_pages(pages);
        self.counters.erase.record(time, pages);
        self.wear_out += pages * self.page_size();
        time
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    fn bytes(&self, pages: u64) -> u64 {
        pages * self.model.page_size()
    }

    pub fn page_size(&self) -> u64 {
        self.model.page_size()
    }

    pub fn block_size(&self) -> u64 {
        self.model.block_size()
    }

    /// Pages per erase block, 0 for byte-addressable media
    pub fn pages_in_block(&self) -> u64 {
        self.model.block_size() / self.model.page_size()
    }

    pub fn translation(&self) -> Translation {
        self.translation
    }

    pub fn dirty_pages(&self) -> u64 {
        self.dirty_pages
    }

    pub fn wear_out(&self) -> u64 {
        self.wear_out
    }

    pub fn counters(&self) -> &IoCounters {
        &self.counters
    }

    pub fn model(&self) -> &MemoryModel {
        &self.model
    }

    /// Zero counters, wear-out and the dirty page backlog
    pub fn reset_counters(&mut self) {
        self.counters.reset();
        self.model.reset_counters();
        self.dirty_pages = 0;
        self.wear_out = 0;
    }
}
