//! Trellis common types, errors, and utilities.
//!
//! This crate provides shared definitions used across all Trellis components.

pub mod checksum;
pub mod config;
pub mod error;
pub mod types;

pub use checksum::{block_checksum, seal_block, verify_block};
pub use config::IndexConfig;
pub use error::{ErrorKind, Result, TrellisError};
pub use types::{IndexAttributes, KeyType, NO_POSITION};
