//! Storage engine for Trellis.
//!
//! This crate provides:
//! - Block-level file I/O with checksum verification
//! - Multi-index B+Tree index files with per-index cursors
//! - Heap files for variable-length record storage
//!
//! An index file holds one or more independent ordered indexes, each mapping
//! fixed-width keys to 64-bit data positions. The data positions are opaque
//! to the index; typically they address records in a companion heap file.

mod block;
mod btree;
mod heap;

pub use block::BlockFile;
pub use btree::{
    Cursor, CursorFlags, FileHeader, IndexDescriptor, IndexEntry, LeafBlock, MultiIndex,
    NodeBlock, SharedIndex,
};
pub use btree::key::{
    compare_keys, encode_character, encode_integer, encode_logical, encode_long_int, encode_text,
    fill_eof_key,
};
pub use heap::{HeapFile, HeapHeader, HoleRecord, HolesTable};
