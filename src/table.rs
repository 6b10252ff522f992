//! Table descriptors
//!
//! The only thing an index needs from a schema is how big a key and a
//! record are. Presets follow the TPC-C row shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key and payload sizes of the rows an index stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbTable {
    name: String,
    key_size: u64,
    data_size: u64,
}

impl DbTable {
    pub fn new(name: impl Into<String>, key_size: u64, data_size: u64) -> Self {
        Self {
            name: name.into(),
            key_size,
            data_size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_size(&self) -> u64 {
        self.key_size
    }

    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    /// Key plus payload
    pub fn record_size(&self) -> u64 {
        self.key_size + self.data_size
    }

    // =========================================================================
    // TPC-C Presets
    // =========================================================================

    pub fn warehouse() -> Self {
        Self::new("Warehouse", 8, 81)
    }

    pub fn district() -> Self {
        Self::new("District", 8, 87)
    }

    pub fn customer() -> Self {
        Self::new("Customer", 8, 647)
    }

    pub fn history() -> Self {
        Self::new("History", 8, 38)
    }

    pub fn new_order() -> Self {
        Self::new("NewOrder", 8, 4)
    }

    pub fn order() -> Self {
        Self::new("Order", 8, 16)
    }

    pub fn order_line() -> Self {
        Self::new("OrderLine", 8, 46)
    }

    pub fn item() -> Self {
        Self::new("Item", 8, 74)
    }

    pub fn stock() -> Self {
        Self::new("Stock", 8, 298)
    }

    /// All TPC-C tables
    pub fn tpcc() -> Vec<Self> {
        vec![
            Self::warehouse(),
            Self::district(),
            Self::customer(),
            Self::history(),
            Self::new_order(),
            Self::order(),
            Self::order_line(),
            Self::item(),
            Self::stock(),
        ]
    }
}

impl fmt::Display for DbTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(key={}, data={})",
            self.name, self.key_size, self.data_size
        )
    }
}
