//! Multi-index B+Tree index files.
//!
//! A single index file holds one or more independent ordered indexes. Each
//! index maps fixed-width keys of a declared type to 64-bit data positions.
//! Interior nodes route by the maximum key of each child subtree; leaves form
//! a doubly-linked chain in key order, terminated by a permanent sentinel
//! leaf holding the type-specific maximum key.
//!
//! File layout:
//! ```text
//! [FileHeader][IndexDescriptor 0][IndexDescriptor 1]...[nodes and leaves]
//! ```
//!
//! Nodes and leaves are allocated on demand from per-index free lists and
//! appended at end of file in bulk when a free list runs dry.

mod cursor;
pub mod key;
mod layout;
mod multi;
mod shared;

pub use cursor::{Cursor, CursorFlags};
pub use layout::{FileHeader, IndexDescriptor, LeafBlock, NodeBlock};
pub use multi::{IndexEntry, MultiIndex};
pub use shared::SharedIndex;
