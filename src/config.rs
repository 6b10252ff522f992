//! Configuration for indexsim
//!
//! Device and index parameters with calibrated defaults. Validation happens
//! in the constructors that consume a config (`Disk::from_config`,
//! `BpTree::new`, `LsmTree::new`, ...).

use serde::{Deserialize, Serialize};

use crate::device::NandCell;

// =============================================================================
// Device Configuration
// =============================================================================

/// Which device preset a disk is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    /// FTL-managed SSD
    Ssd,
    /// NAND flash chip behind a flash translation layer
    FtlFlash(NandCell),
    /// NAND flash chip without remapping
    RawFlash(NandCell),
    /// Byte-addressable phase change memory
    Pcm,
}

impl DeviceKind {
    pub fn default_name(&self) -> String {
        match self {
            DeviceKind::Ssd => "SSD".to_string(),
            DeviceKind::FtlFlash(cell) => format!("FTL-{}", cell.label()),
            DeviceKind::RawFlash(cell) => format!("RAW-{}", cell.label()),
            DeviceKind::Pcm => "PCM".to_string(),
        }
    }
}

/// Device configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device preset (timings and default geometry)
    pub kind: DeviceKind,

    /// Display name, defaults to the preset name
    pub name: Option<String>,

    /// Page size override (bytes)
    pub page_size: Option<u64>,

    /// Erase block size override (bytes, 0 for byte-addressable media)
    pub block_size: Option<u64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            kind: DeviceKind::Ssd,
            name: None,
            page_size: None,
            block_size: None,
        }
    }
}

impl DeviceConfig {
    /// Create a new config builder
    pub fn builder() -> DeviceConfigBuilder {
        DeviceConfigBuilder::default()
    }
}

/// Builder for DeviceConfig
#[derive(Default)]
pub struct DeviceConfigBuilder {
    config: DeviceConfig,
}

impl DeviceConfigBuilder {
    /// Set the device preset
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.config.kind = kind;
        self
    }

    /// Set the display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Override the page size (in bytes)
    pub fn page_size(mut self, bytes: u64) -> Self {
        self.config.page_size = Some(bytes);
        self
    }

    /// Override the erase block size (in bytes)
    pub fn block_size(mut self, bytes: u64) -> Self {
        self.config.block_size = Some(bytes);
        self
    }

    pub fn build(self) -> DeviceConfig {
        self.config
    }
}

// =============================================================================
// Index Configuration
// =============================================================================

/// B+Tree parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpTreeConfig {
    /// Node size in bytes
    pub node_size: u64,

    /// Enable the bottom-up bulkload path
    pub bulkload: bool,
}

impl Default for BpTreeConfig {
    fn default() -> Self {
        Self {
            node_size: 8192,
            bulkload: false,
        }
    }
}

impl BpTreeConfig {
    /// Set the node size (in bytes)
    pub fn node_size(mut self, bytes: u64) -> Self {
        self.node_size = bytes;
        self
    }

    /// Enable or disable bulk mode
    pub fn bulkload(mut self, enabled: bool) -> Self {
        self.bulkload = enabled;
        self
    }
}

/// How a leveled tree prices a bulkload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkloadPolicy {
    /// Bulkload is a sequence of single inserts
    FeatureOff,

    /// Read only the levels whose current content is rewritten
    AccordingToCurrentCapacity,

    /// Read every level down to the deepest rewritten one, as if they were full
    AccordingToMaxCapacity,
}

/// Default head tree: ten 8 KiB pages
pub const DEFAULT_HEAD_TREE_SIZE: u64 = 10 * 8192;

/// Default growth factor between consecutive levels
pub const DEFAULT_LEVEL_RATIO: u64 = 10;

/// LSM-Tree parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LsmConfig {
    /// Size of the in-memory head level in bytes; also the node size
    pub head_tree_size: u64,

    /// Capacity multiplier between level i and level i+1
    pub level_ratio: u64,

    pub bulkload_policy: BulkloadPolicy,
}

impl Default for LsmConfig {
    fn default() -> Self {
        Self {
            head_tree_size: DEFAULT_HEAD_TREE_SIZE,
            level_ratio: DEFAULT_LEVEL_RATIO,
            bulkload_policy: BulkloadPolicy::AccordingToCurrentCapacity,
        }
    }
}

impl LsmConfig {
    /// Set the head tree size (in bytes)
    pub fn head_tree_size(mut self, bytes: u64) -> Self {
        self.head_tree_size = bytes;
        self
    }

    pub fn level_ratio(mut self, ratio: u64) -> Self {
        self.level_ratio = ratio;
        self
    }

    pub fn bulkload_policy(mut self, policy: BulkloadPolicy) -> Self {
        self.bulkload_policy = policy;
        self
    }
}

/// FALSM-Tree parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FalsmConfig {
    /// Size of the in-memory head level in bytes; also the node size
    pub head_tree_size: u64,

    /// Capacity multiplier between level i and level i+1
    pub level_ratio: u64,

    /// Overflow nodes tolerated per nominal node of a level
    pub capacity_ratio: f64,

    pub bulkload_policy: BulkloadPolicy,
}

impl Default for FalsmConfig {
    fn default() -> Self {
        Self {
            head_tree_size: DEFAULT_HEAD_TREE_SIZE,
            level_ratio: DEFAULT_LEVEL_RATIO,
            capacity_ratio: 0.5,
            bulkload_policy: BulkloadPolicy::AccordingToCurrentCapacity,
        }
    }
}

impl FalsmConfig {
    /// Set the head tree size (in bytes)
    pub fn head_tree_size(mut self, bytes: u64) -> Self {
        self.head_tree_size = bytes;
        self
    }

    pub fn level_ratio(mut self, ratio: u64) -> Self {
        self.level_ratio = ratio;
        self
    }

    pub fn capacity_ratio(mut self, ratio: f64) -> Self {
        self.capacity_ratio = ratio;
        self
    }

    pub fn bulkload_policy(mut self, policy: BulkloadPolicy) -> Self {
        self.bulkload_policy = policy;
        self
    }
}

/// FA-Tree parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaConfig {
    /// Size of the single head node in bytes; also the node size
    pub head_tree_size: u64,

    /// Node multiplier between level i and level i+1
    pub level_ratio: u64,
}

impl Default for FaConfig {
    fn default() -> Self {
        Self {
            head_tree_size: DEFAULT_HEAD_TREE_SIZE,
            level_ratio: DEFAULT_LEVEL_RATIO,
        }
    }
}

impl FaConfig {
    /// Set the head node size (in bytes)
    pub fn head_tree_size(mut self, bytes: u64) -> Self {
        self.head_tree_size = bytes;
        self
    }

    pub fn level_ratio(mut self, ratio: u64) -> Self {
        self.level_ratio = ratio;
        self
    }
}
