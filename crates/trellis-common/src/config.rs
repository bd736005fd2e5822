//! Index configuration.

use crate::error::{Result, TrellisError};
use crate::types::{IndexAttributes, KeyType};
use serde::{Deserialize, Serialize};

/// Default branching factor for interior nodes.
pub const DEFAULT_MAX_ITEMS: u16 = 5;

/// Default number of nodes appended when the node free list runs dry.
pub const DEFAULT_BULK_NODES: i64 = 32;

/// Default number of leaves appended when the leaf free list runs dry.
pub const DEFAULT_BULK_LEAVES: i64 = 64;

/// Configuration for a single index within an index file.
///
/// Passed to `init_index` when an index slot is first set up. The key type
/// and size are immutable for the lifetime of the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Type of keys stored in this index.
    pub key_type: KeyType,
    /// Size of each key in bytes.
    pub key_size: u16,
    /// Attribute flags (UNIQUE, ALLOW_DELETE).
    pub attributes: IndexAttributes,
    /// Maximum routing entries per interior node (branching factor).
    pub max_items: u16,
    /// Number of nodes appended per free-list replenishment.
    pub bulk_nodes: i64,
    /// Number of leaves appended per free-list replenishment.
    pub bulk_leaves: i64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            key_type: KeyType::Text,
            key_size: 32,
            attributes: IndexAttributes::with_delete(),
            max_items: DEFAULT_MAX_ITEMS,
            bulk_nodes: DEFAULT_BULK_NODES,
            bulk_leaves: DEFAULT_BULK_LEAVES,
        }
    }
}

impl IndexConfig {
    /// Creates a configuration with defaults for the given key type.
    ///
    /// Fixed-width key types get their mandatory size; variable-width types
    /// keep the default and should set `key_size` explicitly.
    pub fn new(key_type: KeyType) -> Self {
        let mut config = Self {
            key_type,
            ..Self::default()
        };
        if let Some(size) = key_type.fixed_size() {
            config.key_size = size;
        }
        config
    }

    /// Sets the key size in bytes.
    pub fn key_size(mut self, size: u16) -> Self {
        self.key_size = size;
        self
    }

    /// Sets the attribute flags.
    pub fn attributes(mut self, attributes: IndexAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets the branching factor.
    pub fn max_items(mut self, max_items: u16) -> Self {
        self.max_items = max_items;
        self
    }

    /// Sets the free-list replenishment counts.
    pub fn bulk_allocation(mut self, nodes: i64, leaves: i64) -> Self {
        self.bulk_nodes = nodes;
        self.bulk_leaves = leaves;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.key_size == 0 {
            return Err(TrellisError::InvalidConfig(
                "key size must be non-zero".to_string(),
            ));
        }
        if self.max_items < 3 {
            return Err(TrellisError::InvalidConfig(format!(
                "branching factor must be at least 3, got {}",
                self.max_items
            )));
        }
        if self.bulk_nodes < 0 || self.bulk_leaves < 0 {
            return Err(TrellisError::InvalidConfig(
                "bulk allocation counts must be non-negative".to_string(),
            ));
        }
        if let Some(size) = self.key_type.fixed_size() {
            if self.key_size != size {
                return Err(TrellisError::InvalidConfig(format!(
                    "{:?} keys are {} bytes, got key size {}",
                    self.key_type, size, self.key_size
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = IndexConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.key_type, KeyType::Text);
        assert_eq!(config.max_items, DEFAULT_MAX_ITEMS);
    }

    #[test]
    fn test_new_picks_fixed_size() {
        let config = IndexConfig::new(KeyType::LongInt);
        assert_eq!(config.key_size, 4);
        assert!(config.validate().is_ok());

        let config = IndexConfig::new(KeyType::Character);
        assert_eq!(config.key_size, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let config = IndexConfig::new(KeyType::Text)
            .key_size(50)
            .attributes(IndexAttributes::unique_with_delete())
            .max_items(7)
            .bulk_allocation(100, 200);
        assert_eq!(config.key_size, 50);
        assert!(config.attributes.is_unique());
        assert_eq!(config.max_items, 7);
        assert_eq!(config.bulk_nodes, 100);
        assert_eq!(config.bulk_leaves, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_key_size_rejected() {
        let config = IndexConfig::new(KeyType::Block).key_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_small_branching_factor_rejected() {
        let config = IndexConfig::default().max_items(2);
        assert!(config.validate().is_err());
        let config = IndexConfig::default().max_items(3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_bulk_counts_rejected() {
        let config = IndexConfig::default().bulk_allocation(-1, 10);
        assert!(config.validate().is_err());
        let config = IndexConfig::default().bulk_allocation(0, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_size_mismatch_rejected() {
        let config = IndexConfig::new(KeyType::Integer).key_size(4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = IndexConfig::new(KeyType::LongInt)
            .attributes(IndexAttributes::unique_with_delete())
            .max_items(9);
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: IndexConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.key_type, KeyType::LongInt);
        assert_eq!(deserialized.key_size, 4);
        assert_eq!(deserialized.max_items, 9);
        assert!(deserialized.attributes.is_unique());
    }
}
