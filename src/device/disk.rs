//! Disk
//!
//! The handle an index talks to. A disk owns exactly one controller and
//! keeps its own counters for the calls the index made, separate from the
//! controller's counters (an FTL overwrite shows up here as one overwrite
//! and in the controller as the overwrite, the remap write it caused and,
//! eventually, an erase).

use crate::config::{DeviceConfig, DeviceKind};
use crate::error::Result;

use super::{AccessPattern, IoCounters, LowLevelController, MemoryModel, NandCell, Translation};

/// Simulated storage device
///
/// `Clone` is a deep copy: the clone gets its own controller and model, so
/// two indexes never share device state.
#[derive(Debug, Clone)]
pub struct Disk {
    name: String,
    controller: LowLevelController,
    /// Operations requested through this handle
    counters: IoCounters,
}

impl Disk {
    /// Wrap an already configured controller
    pub fn new(name: impl Into<String>, controller: LowLevelController) -> Self {
        Self {
            name: name.into(),
            controller,
            counters: IoCounters::default(),
        }
    }

    /// FTL-managed SSD
    pub fn ssd() -> Self {
        Self::new("SSD", LowLevelController::preset(MemoryModel::ssd(), Translation::Ftl))
    }

    /// NAND flash behind a flash translation layer
    pub fn ftl_flash(cell: NandCell) -> Self {
        Self::new(
            format!("FTL-{}", cell.label()),
            LowLevelController::preset(MemoryModel::nand(cell), Translation::Ftl),
        )
    }

    /// Raw NAND flash, overwrites rewrite whole blocks
    pub fn raw_flash(cell: NandCell) -> Self {
        Self::new(
            format!("RAW-{}", cell.label()),
            LowLevelController::preset(MemoryModel::nand(cell), Translation::Raw),
        )
    }

    /// Byte-addressable phase change memory
    pub fn pcm() -> Self {
        Self::new(
            "PCM",
            LowLevelController::preset(MemoryModel::pcm(), Translation::ByteAddressable),
        )
    }

    /// Build a disk from a config, validating any geometry override
    pub fn from_config(config: &DeviceConfig) -> Result<Self> {
        let (preset, translation) = match config.kind {
            DeviceKind::Ssd => (MemoryModel::ssd(), Translation::Ftl),
            DeviceKind::FtlFlash(cell) => (MemoryModel::nand(cell), Translation::Ftl),
            DeviceKind::RawFlash(cell) => (MemoryModel::nand(cell), Translation::Raw),
            DeviceKind::Pcm => (MemoryModel::pcm(), Translation::ByteAddressable),
        };

        let name = config
            .name
            .clone()
            .unwrap_or_else(|| config.kind.default_name());
        let page_size = config.page_size.unwrap_or(preset.page_size());
        let block_size = config.block_size.unwrap_or(preset.block_size());

        let model = MemoryModel::new(name.clone(), *preset.medium(), page_size, block_size)?;
        let controller = LowLevelController::new(model, translation)?;

        Ok(Self::new(name, controller))
    }

    /// Independent copy with the same parameters and zeroed counters
    pub fn fresh_clone(&self) -> Self {
        let mut disk = self.clone();
        disk.reset_counters();
        disk
    }

    // =========================================================================
    // Page Operations
    // =========================================================================

    pub fn read_pages(&mut self, pages: u64, pattern: AccessPattern) -> f64 {
        if pages == 0 {
            return 0.0;
        }
        let time = self.controller.read_pages(pages, pattern);
        self.counters.read.record(time, pages);
        time
    }

    pub fn write_pages(&mut self, pages: u64, pattern: AccessPattern) -> f64 {
        if pages == 0 {
            return 0.0;
        }
        let time = self.controller.write_pages(pages, pattern);
        self.counters.write.record(time, pages);
        time
    }

    pub fn overwrite_pages(&mut self, pages: u64, pattern: AccessPattern) -> f64 {
        if pages == 0 {
            return 0.0;
        }
        let time = self.controller.overwrite_pages(pages, pattern);
        self.counters.overwrite.record(time, pages);
        time
    }

    pub fn free_pages(&mut self, pages: u64) -> f64 {
        if pages == 0 {
            return 0.0;
        }
        let time = self.controller.free_pages(pages);
        self.counters.free.record(time, pages);
        time
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page_size(&self) -> u64 {
        self.controller.page_size()
    }

    pub fn block_size(&self) -> u64 {
        self.controller.block_size()
    }

    pub fn pages_in_block(&self) -> u64 {
        self.controller.pages_in_block()
    }

    /// Wear-out of the underlying controller (bytes)
    pub fn wear_out(&self) -> u64 {
        self.controller.wear_out()
    }

    /// Counters of the operations requested through this disk
    pub fn counters(&self) -> &IoCounters {
        &self.counters
    }

    pub fn low_level_controller(&self) -> &LowLevelController {
        &self.controller
    }

    /// Reset disk, controller and model counters
    pub fn reset_counters(&mut self) {
        self.counters.reset();
        self.controller.reset_counters();
    }
}
