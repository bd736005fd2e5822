//! The multi-index B+Tree engine.
//!
//! `MultiIndex` owns one index file and serializes every operation through
//! exclusive access: all mutators take `&mut self`. A file holds N
//! independent trees; the active-index selector picks which one subsequent
//! operations and the cursor apply to.
//!
//! Interior nodes route by last-key: the routing key of an entry is the
//! maximum key in the child's subtree. Descents binary-search each node for
//! the first entry whose routing key is >= the search key; the EOF sentinel
//! leaf guarantees such an entry always exists. Inserts splice a fresh leaf
//! into the doubly-linked leaf chain and push a routing entry down the
//! recorded path, redistributing into the right sibling or splitting on
//! overflow. Deletes remove whole runs of equal keys, borrow from or merge
//! into the right sibling on underflow, and collapse degenerate roots during
//! the next descent.

use crate::block::BlockFile;
use crate::btree::cursor::Cursor;
use crate::btree::key::{compare_keys, fill_eof_key};
use crate::btree::layout::{FileHeader, IndexDescriptor, LeafBlock, NodeBlock};
use bytes::Bytes;
use std::cmp::Ordering;
use std::path::Path;
use trellis_common::{ErrorKind, IndexConfig, KeyType, Result, TrellisError, NO_POSITION};

/// One step of a root-to-leaf descent: the node visited and the entry whose
/// child pointer was followed.
struct PathFrame {
    node_pos: i64,
    entry: usize,
}

/// Result of a full descent for a key.
struct Descent {
    /// Visited nodes, root first; the last frame is the bottom interior node.
    stack: Vec<PathFrame>,
    /// The leaf addressed by the bottom frame's entry.
    leaf_pos: i64,
    /// True if the bottom routing key matched the search key exactly.
    exact: bool,
}

/// Outcome of inserting a routing entry into one interior node.
enum InsertOutcome {
    /// Inserted without changing the node's maximum.
    Done,
    /// The node's maximum key changed; the parent routing entry needs it.
    MaxChanged(Vec<u8>),
    /// The node split; the parent needs its new maximum and a routing entry
    /// for the fresh right sibling.
    Split {
        left_max: Vec<u8>,
        right_max: Vec<u8>,
        right_pos: i64,
    },
}

/// Outcome of removing a routing entry from one interior node.
enum RemoveOutcome {
    /// Removed without changing the node's maximum.
    Done,
    /// The node's maximum key changed; the parent routing entry needs it.
    MaxChanged(Vec<u8>),
    /// The node became empty or was merged away; the parent entry for it
    /// must be removed in turn.
    NodeFreed,
}

/// A key and its data position, as returned by cursor navigation.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// The key bytes, exactly the index's declared key size.
    pub key: Bytes,
    /// The 64-bit data position the key maps to.
    pub data_pos: i64,
}

/// A file of independent B+Tree indexes over fixed-width keys.
///
/// Operations apply to the active index, selected with `set_active_index`
/// (index numbers are 1-based). Each index carries its own cursor.
///
/// I/O failures and corruption latch on the handle: subsequent operations
/// fail fast with `Faulted` until `clear_error` is called. Not-found and
/// UNIQUE-duplicate outcomes are ordinary return values, never errors.
#[derive(Debug)]
pub struct MultiIndex {
    io: BlockFile,
    header: FileHeader,
    descriptors: Vec<IndexDescriptor>,
    cursors: Vec<Cursor>,
    active: usize,
    latched: Option<ErrorKind>,
    closed: bool,
}

impl MultiIndex {
    /// Creates a new index file with `num_indexes` uninitialized index slots.
    pub fn create(path: impl AsRef<Path>, num_indexes: u16) -> Result<Self> {
        if num_indexes == 0 {
            return Err(TrellisError::InvalidParameter {
                name: "num_indexes".to_string(),
                value: "0".to_string(),
            });
        }

        let mut io = BlockFile::create(path)?;
        let header = FileHeader { num_indexes };
        let mut buf = header.to_bytes();
        io.write_block(0, &mut buf)?;

        let descriptors = vec![IndexDescriptor::empty(); num_indexes as usize];
        for (i, desc) in descriptors.iter().enumerate() {
            let mut buf = desc.to_bytes();
            io.write_block(IndexDescriptor::offset_of(i), &mut buf)?;
        }

        Ok(Self {
            io,
            header,
            descriptors,
            cursors: vec![Cursor::unset(); num_indexes as usize],
            active: 0,
            latched: None,
            closed: false,
        })
    }

    /// Opens an existing index file, verifying header and descriptor
    /// checksums.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut io = BlockFile::open(path)?;

        let mut buf = [0u8; FileHeader::SIZE];
        io.read_block(0, &mut buf)?;
        let header = FileHeader::from_bytes(&buf);

        let count = header.num_indexes as usize;
        let mut descriptors = Vec::with_capacity(count);
        for i in 0..count {
            let mut buf = [0u8; IndexDescriptor::SIZE];
            io.read_block(IndexDescriptor::offset_of(i), &mut buf)?;
            descriptors.push(IndexDescriptor::from_bytes(&buf));
        }

        Ok(Self {
            io,
            header,
            descriptors,
            cursors: vec![Cursor::unset(); count],
            active: 0,
            latched: None,
            closed: false,
        })
    }

    //=========================================================================
    // Index selection and introspection
    //=========================================================================

    /// Initializes index slot `index_no` (1-based) for first use.
    ///
    /// Writes the EOF sentinel leaf and a root node covering it, and
    /// pre-allocates the configured number of free nodes and leaves.
    pub fn init_index(&mut self, index_no: u16, config: &IndexConfig) -> Result<()> {
        self.ensure_live()?;
        config.validate()?;
        let slot = self.slot_of(index_no)?;

        let saved = self.active;
        self.active = slot;
        let result = self.init_active(config);
        self.active = saved;
        self.latch(result)
    }

    /// Selects the index (1-based) that subsequent operations apply to.
    pub fn set_active_index(&mut self, index_no: u16) -> Result<()> {
        self.ensure_live()?;
        self.active = self.slot_of(index_no)?;
        Ok(())
    }

    /// The active index number (1-based).
    pub fn active_index(&self) -> u16 {
        self.active as u16 + 1
    }

    /// Number of index slots in the file.
    pub fn num_indexes(&self) -> u16 {
        self.header.num_indexes
    }

    /// Key type of the active index, if initialized.
    pub fn key_type(&self) -> Option<KeyType> {
        self.desc().key_type()
    }

    /// Key size of the active index in bytes.
    pub fn key_size(&self) -> u16 {
        self.desc().key_size
    }

    /// True if the active index rejects duplicate keys.
    pub fn is_unique(&self) -> bool {
        self.desc().attributes.is_unique()
    }

    /// True if the active index rebalances nodes on delete.
    pub fn allows_delete(&self) -> bool {
        self.desc().attributes.allows_delete()
    }

    /// Current tree height of the active index.
    pub fn num_levels(&self) -> u16 {
        self.desc().num_levels
    }

    /// The latched error kind, if the handle is faulted.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.latched
    }

    /// Clears a latched error so operations can be attempted again.
    ///
    /// The cursor should be repositioned before further navigation; its
    /// state is unreliable after a fault.
    pub fn clear_error(&mut self) {
        self.latched = None;
    }

    //=========================================================================
    // Key operations
    //=========================================================================

    /// Inserts `(key, data_pos)` into the active index.
    ///
    /// Returns false only when the index is UNIQUE and the key already
    /// exists; the tree is left untouched in that case. On success the
    /// cursor is positioned on the new entry.
    pub fn append(&mut self, key: &[u8], data_pos: i64) -> Result<bool> {
        let kt = self.ensure_ready()?;
        self.check_key(key)?;
        let result = self.append_inner(kt, key, data_pos);
        self.latch(result)
    }

    /// Looks up `key` and returns its data position.
    ///
    /// The cursor is positioned on the matching leaf, or on the smallest
    /// leaf greater than `key` when absent.
    pub fn find(&mut self, key: &[u8]) -> Result<Option<i64>> {
        let kt = self.ensure_ready()?;
        self.check_key(key)?;
        let result = self.find_inner(kt, key);
        self.latch(result)
    }

    /// Removes every entry whose key equals `key`.
    ///
    /// Returns false if no entry matched.
    pub fn delete_key(&mut self, key: &[u8]) -> Result<bool> {
        let kt = self.ensure_ready()?;
        self.check_key(key)?;
        let result = self.delete_key_inner(kt, key);
        self.latch(result)
    }

    /// Removes the single entry at the cursor and returns its data position.
    ///
    /// Returns None when the cursor is unset or sits on the EOF sentinel.
    pub fn delete_current(&mut self) -> Result<Option<i64>> {
        let kt = self.ensure_ready()?;
        let result = self.delete_current_inner(kt);
        self.latch(result)
    }

    //=========================================================================
    // Navigation
    //=========================================================================

    /// Positions the cursor on the first entry. None on an empty index.
    pub fn get_first(&mut self) -> Result<Option<IndexEntry>> {
        self.ensure_ready()?;
        let first = self.desc().first_leaf;
        let result = if first != self.desc().last_leaf {
            self.bring_leaf(first)
        } else {
            Ok(None)
        };
        self.latch(result)
    }

    /// Advances the cursor. None when already at the end.
    pub fn get_next(&mut self) -> Result<Option<IndexEntry>> {
        self.ensure_ready()?;
        let cursor = self.cursor();
        let result = if !cursor.flags.is_eof() && cursor.next_leaf != NO_POSITION {
            let pos = cursor.next_leaf;
            self.bring_leaf(pos)
        } else {
            Ok(None)
        };
        self.latch(result)
    }

    /// Steps the cursor backward. None when already at the beginning.
    pub fn get_prev(&mut self) -> Result<Option<IndexEntry>> {
        self.ensure_ready()?;
        let cursor = self.cursor();
        let result = if !cursor.flags.is_bof() && cursor.prev_leaf != NO_POSITION {
            let pos = cursor.prev_leaf;
            self.bring_leaf(pos)
        } else {
            Ok(None)
        };
        self.latch(result)
    }

    /// Re-reads the entry at the cursor without moving it.
    pub fn get_current(&mut self) -> Result<Option<IndexEntry>> {
        self.ensure_ready()?;
        let current = self.cursor().current_leaf;
        let result = if current == NO_POSITION || current == self.desc().last_leaf {
            Ok(None)
        } else {
            self.bring_leaf(current)
        };
        self.latch(result)
    }

    /// True when no more keys exist forward of the cursor.
    pub fn is_eof(&self) -> bool {
        self.latched.is_some() || self.cursor().flags.is_eof()
    }

    /// True when no more keys exist backward of the cursor.
    pub fn is_bof(&self) -> bool {
        self.latched.is_some() || self.cursor().flags.is_bof()
    }

    //=========================================================================
    // Persistence
    //=========================================================================

    /// Writes the file header and every descriptor, then syncs to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_live()?;
        let result = self.flush_inner();
        self.latch(result)
    }

    /// Flushes and consumes the handle.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.flush_inner()
    }

    fn flush_inner(&mut self) -> Result<()> {
        let mut buf = self.header.to_bytes();
        self.io.write_block(0, &mut buf)?;
        for i in 0..self.descriptors.len() {
            self.write_descriptor(i)?;
        }
        self.io.flush()
    }

    fn write_descriptor(&mut self, slot: usize) -> Result<()> {
        let mut buf = self.descriptors[slot].to_bytes();
        self.io.write_block(IndexDescriptor::offset_of(slot), &mut buf)
    }

    //=========================================================================
    // Guards and accessors
    //=========================================================================

    fn ensure_live(&self) -> Result<()> {
        if let Some(kind) = self.latched {
            return Err(TrellisError::Faulted(kind));
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<KeyType> {
        self.ensure_live()?;
        let desc = self.desc();
        if !desc.is_initialized() {
            return Err(TrellisError::NotInitialized(self.active as u16 + 1));
        }
        desc.key_type().ok_or_else(|| {
            TrellisError::TreeCorrupted(format!("invalid key type tag {}", desc.key_type_tag))
        })
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        let expected = self.desc().key_size;
        if key.len() != expected as usize {
            return Err(TrellisError::KeyLength {
                expected,
                got: key.len(),
            });
        }
        Ok(())
    }

    fn latch<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_latching() {
                self.latched = Some(err.kind());
            }
        }
        result
    }

    fn slot_of(&self, index_no: u16) -> Result<usize> {
        if index_no == 0 || index_no > self.header.num_indexes {
            return Err(TrellisError::InvalidParameter {
                name: "index_no".to_string(),
                value: index_no.to_string(),
            });
        }
        Ok(index_no as usize - 1)
    }

    fn desc(&self) -> &IndexDescriptor {
        &self.descriptors[self.active]
    }

    fn cursor(&self) -> &Cursor {
        &self.cursors[self.active]
    }

    fn new_node(&self) -> NodeBlock {
        NodeBlock::new(self.desc().max_items, self.desc().key_size)
    }

    fn new_leaf(&self) -> LeafBlock {
        LeafBlock::new(self.desc().key_size)
    }

    fn read_node(&mut self, pos: i64, node: &mut NodeBlock) -> Result<()> {
        self.io.read_block(pos, node.as_mut_slice())
    }

    fn write_node(&mut self, pos: i64, node: &mut NodeBlock) -> Result<()> {
        self.io.write_block(pos, node.as_mut_slice())
    }

    fn read_leaf(&mut self, pos: i64, leaf: &mut LeafBlock) -> Result<()> {
        self.io.read_block(pos, leaf.as_mut_slice())
    }

    fn write_leaf(&mut self, pos: i64, leaf: &mut LeafBlock) -> Result<()> {
        self.io.write_block(pos, leaf.as_mut_slice())
    }

    //=========================================================================
    // Free-list allocation
    //=========================================================================

    /// Appends `count` zeroed node blocks at end of file, linked as the new
    /// head of the node free list.
    fn create_nodes(&mut self, count: i64) -> Result<()> {
        if count <= 0 {
            return Ok(());
        }
        let node_size = self.desc().node_size() as i64;
        let mut file_end = self.io.len();
        let first = file_end;
        let mut node = self.new_node();
        for _ in 1..count {
            file_end += node_size;
            node.set_next(file_end);
            self.io.append_block(node.as_mut_slice())?;
        }
        node.set_next(self.desc().free_node);
        self.io.append_block(node.as_mut_slice())?;
        self.descriptors[self.active].free_node = first;
        Ok(())
    }

    /// Appends `count` zeroed leaf blocks at end of file, linked as the new
    /// head of the leaf free list.
    fn create_leaves(&mut self, count: i64) -> Result<()> {
        if count <= 0 {
            return Ok(());
        }
        let leaf_size = self.desc().leaf_size() as i64;
        let mut file_end = self.io.len();
        let first = file_end;
        let mut leaf = self.new_leaf();
        for _ in 1..count {
            file_end += leaf_size;
            leaf.set_next(file_end);
            self.io.append_block(leaf.as_mut_slice())?;
        }
        leaf.set_next(self.desc().free_leaf);
        self.io.append_block(leaf.as_mut_slice())?;
        self.descriptors[self.active].free_leaf = first;
        Ok(())
    }

    /// Pops a node position off the free list, replenishing it first when
    /// exhausted.
    fn allocate_node(&mut self) -> Result<i64> {
        let mut pos = self.desc().free_node;
        if pos == NO_POSITION {
            let count = self.desc().bulk_nodes.max(1);
            self.create_nodes(count)?;
            pos = self.desc().free_node;
        }
        let mut node = self.new_node();
        self.read_node(pos, &mut node)?;
        self.descriptors[self.active].free_node = node.next();
        Ok(pos)
    }

    /// Pops a leaf position off the free list, replenishing it first when
    /// exhausted.
    fn allocate_leaf(&mut self) -> Result<i64> {
        let mut pos = self.desc().free_leaf;
        if pos == NO_POSITION {
            let count = self.desc().bulk_leaves.max(1);
            self.create_leaves(count)?;
            pos = self.desc().free_leaf;
        }
        let mut leaf = self.new_leaf();
        self.read_leaf(pos, &mut leaf)?;
        self.descriptors[self.active].free_leaf = leaf.next();
        Ok(pos)
    }

    /// Zeroes the node block at `pos` and pushes it onto the free list.
    fn free_node_block(&mut self, pos: i64) -> Result<()> {
        let mut node = self.new_node();
        node.set_next(self.desc().free_node);
        self.write_node(pos, &mut node)?;
        self.descriptors[self.active].free_node = pos;
        Ok(())
    }

    /// Zeroes the leaf block at `pos` and pushes it onto the free list.
    fn free_leaf_block(&mut self, pos: i64) -> Result<()> {
        let mut leaf = self.new_leaf();
        leaf.set_next(self.desc().free_leaf);
        self.write_leaf(pos, &mut leaf)?;
        self.descriptors[self.active].free_leaf = pos;
        Ok(())
    }

    //=========================================================================
    // Initialization
    //=========================================================================

    fn init_active(&mut self, config: &IndexConfig) -> Result<()> {
        {
            let desc = &mut self.descriptors[self.active];
            desc.attributes = config.attributes;
            desc.key_type_tag = config.key_type.tag();
            desc.key_size = config.key_size;
            desc.max_items = config.max_items;
            desc.bulk_nodes = config.bulk_nodes;
            desc.bulk_leaves = config.bulk_leaves;
            desc.free_node = NO_POSITION;
            desc.free_leaf = NO_POSITION;
            desc.num_levels = 0;
            desc.root_node = NO_POSITION;
            desc.first_leaf = NO_POSITION;
            desc.last_leaf = NO_POSITION;
        }
        self.create_nodes(config.bulk_nodes)?;
        self.create_leaves(config.bulk_leaves)?;

        // The permanent EOF sentinel leaf, greatest in the chain.
        let mut leaf = self.new_leaf();
        fill_eof_key(config.key_type, leaf.key_mut());
        leaf.set_data_pos(NO_POSITION);
        let leaf_pos = self.allocate_leaf()?;
        self.write_leaf(leaf_pos, &mut leaf)?;
        self.descriptors[self.active].first_leaf = leaf_pos;
        self.descriptors[self.active].last_leaf = leaf_pos;

        // Root node with a single entry covering the sentinel.
        let mut root = self.new_node();
        root.insert_entry(0, leaf.key(), leaf_pos);
        let root_pos = self.allocate_node()?;
        self.write_node(root_pos, &mut root)?;
        self.descriptors[self.active].root_node = root_pos;
        self.descriptors[self.active].num_levels = 1;

        self.cursors[self.active].reset();
        self.write_descriptor(self.active)
    }

    //=========================================================================
    // Descent
    //=========================================================================

    /// Binary search for the first entry whose routing key is >= `key`.
    ///
    /// Returns the entry index (possibly `num_used`, meaning no entry
    /// covers the key) and whether the match is exact.
    fn search_node(kt: KeyType, node: &NodeBlock, key: &[u8]) -> (usize, bool) {
        let n = node.num_used();
        let mut lo = 0usize;
        let mut hi = n;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if compare_keys(kt, key, node.key(mid)) == Ordering::Greater {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo < n {
            let exact = compare_keys(kt, key, node.key(lo)) == Ordering::Equal;
            (lo, exact)
        } else {
            (n, false)
        }
    }

    /// Full root-to-leaf descent recording the path for later backtracking.
    ///
    /// Degenerate roots (a single entry above the bottom level) are
    /// collapsed on the way down: the root is freed and its child promoted.
    fn find_path(&mut self, kt: KeyType, key: &[u8]) -> Result<Descent> {
        let mut stack = Vec::with_capacity(self.desc().num_levels as usize);
        let mut node_pos = self.desc().root_node;
        let mut remaining = self.desc().num_levels;
        let mut node = self.new_node();
        let mut below_root = false;

        loop {
            self.read_node(node_pos, &mut node)?;
            let n = node.num_used();
            if n == 0 {
                return Err(TrellisError::TreeCorrupted(
                    "empty interior node on descent".to_string(),
                ));
            }

            if below_root || n > 1 {
                below_root = true;
                let (idx, exact) = Self::search_node(kt, &node, key);
                if idx >= n {
                    return Err(TrellisError::TreeCorrupted(
                        "no routing key covers the search key".to_string(),
                    ));
                }
                remaining -= 1;
                stack.push(PathFrame { node_pos, entry: idx });
                if remaining == 0 {
                    return Ok(Descent {
                        stack,
                        leaf_pos: node.child(idx),
                        exact,
                    });
                }
                node_pos = node.child(idx);
            } else if self.desc().num_levels > 1 {
                // Degenerate root: promote its single child and shrink.
                let child = node.child(0);
                self.free_node_block(node_pos)?;
                self.descriptors[self.active].root_node = child;
                self.descriptors[self.active].num_levels -= 1;
                remaining -= 1;
                node_pos = child;
            } else {
                stack.push(PathFrame { node_pos, entry: 0 });
                return Ok(Descent {
                    stack,
                    leaf_pos: node.child(0),
                    exact: false,
                });
            }
        }
    }

    /// Read-only descent to the leaf addressed by `key`.
    ///
    /// Returns the leaf position and whether the bottom routing key matched
    /// exactly.
    fn find_leaf(&mut self, kt: KeyType, key: &[u8]) -> Result<(i64, bool)> {
        let mut levels = self.desc().num_levels;
        let mut node_pos = self.desc().root_node;
        let mut node = self.new_node();

        loop {
            self.read_node(node_pos, &mut node)?;
            let (idx, exact) = Self::search_node(kt, &node, key);
            if idx >= node.num_used() {
                return Err(TrellisError::TreeCorrupted(
                    "no routing key covers the search key".to_string(),
                ));
            }
            if levels == 1 {
                return Ok((node.child(idx), exact));
            }
            node_pos = node.child(idx);
            levels -= 1;
        }
    }

    //=========================================================================
    // Cursor plumbing
    //=========================================================================

    fn set_cursor_from_leaf(&mut self, pos: i64, leaf: &LeafBlock) {
        let first = self.desc().first_leaf;
        let last = self.desc().last_leaf;
        let cursor = &mut self.cursors[self.active];
        cursor.current_leaf = pos;
        cursor.next_leaf = leaf.next();
        cursor.prev_leaf = leaf.prev();
        cursor.data_pos = leaf.data_pos();
        let at_bof = cursor.prev_leaf == NO_POSITION || pos == first;
        let at_eof = cursor.next_leaf == NO_POSITION || cursor.next_leaf == last;
        cursor.flags.set_bof(at_bof);
        cursor.flags.set_eof(at_eof);
    }

    /// Reads the leaf at `pos`, repositions the cursor on it, and returns
    /// its entry.
    fn bring_leaf(&mut self, pos: i64) -> Result<Option<IndexEntry>> {
        if pos == NO_POSITION {
            return Ok(None);
        }
        let mut leaf = self.new_leaf();
        self.read_leaf(pos, &mut leaf)?;
        self.set_cursor_from_leaf(pos, &leaf);
        Ok(Some(IndexEntry {
            key: Bytes::copy_from_slice(leaf.key()),
            data_pos: leaf.data_pos(),
        }))
    }

    //=========================================================================
    // Lookup
    //=========================================================================

    fn find_inner(&mut self, kt: KeyType, key: &[u8]) -> Result<Option<i64>> {
        let (leaf_pos, exact) = self.find_leaf(kt, key)?;
        if exact {
            let entry = self.bring_leaf(leaf_pos)?;
            Ok(entry.map(|e| e.data_pos))
        } else {
            if leaf_pos != NO_POSITION {
                self.bring_leaf(leaf_pos)?;
            }
            Ok(None)
        }
    }

    /// Repoints the bottom-level routing entry for `key` at a new leaf.
    ///
    /// Returns the previously addressed leaf, or None if no entry matched.
    fn modify_leaf(&mut self, kt: KeyType, key: &[u8], new_leaf_pos: i64) -> Result<Option<i64>> {
        let mut levels = self.desc().num_levels;
        let mut node_pos = self.desc().root_node;
        let mut node = self.new_node();

        loop {
            self.read_node(node_pos, &mut node)?;
            let (idx, exact) = Self::search_node(kt, &node, key);
            if idx >= node.num_used() {
                return Err(TrellisError::TreeCorrupted(
                    "no routing key covers the search key".to_string(),
                ));
            }
            if levels == 1 {
                if exact {
                    let old = node.child(idx);
                    node.set_child(idx, new_leaf_pos);
                    self.write_node(node_pos, &mut node)?;
                    return Ok(Some(old));
                }
                return Ok(None);
            }
            node_pos = node.child(idx);
            levels -= 1;
        }
    }

    //=========================================================================
    // Insert
    //=========================================================================

    fn append_inner(&mut self, kt: KeyType, key: &[u8], data_pos: i64) -> Result<bool> {
        let Descent {
            mut stack,
            leaf_pos: succ_pos,
            exact,
        } = self.find_path(kt, key)?;
        let Some(frame) = stack.pop() else {
            return Err(TrellisError::TreeCorrupted("empty descent path".to_string()));
        };

        // UNIQUE duplicate: reject before touching anything.
        if exact && self.desc().attributes.is_unique() {
            return Ok(false);
        }

        // Splice a fresh leaf into the chain, in front of its successor.
        let new_pos = self.allocate_leaf()?;
        let mut new_leaf = self.new_leaf();
        let mut tmp = self.new_leaf();
        self.read_leaf(succ_pos, &mut tmp)?;
        let prev_pos = tmp.prev();
        new_leaf.set_next(succ_pos);
        new_leaf.set_prev(prev_pos);
        tmp.set_prev(new_pos);
        self.write_leaf(succ_pos, &mut tmp)?;
        if prev_pos != NO_POSITION {
            self.read_leaf(prev_pos, &mut tmp)?;
            tmp.set_next(new_pos);
            self.write_leaf(prev_pos, &mut tmp)?;
        } else {
            self.descriptors[self.active].first_leaf = new_pos;
        }
        new_leaf.set_key(key);
        new_leaf.set_data_pos(data_pos);
        self.write_leaf(new_pos, &mut new_leaf)?;
        self.set_cursor_from_leaf(new_pos, &new_leaf);

        if exact {
            // Duplicate in a non-unique index: the routing entry now
            // addresses the newest leaf of the run.
            let mut node = self.new_node();
            self.read_node(frame.node_pos, &mut node)?;
            node.set_child(frame.entry, new_pos);
            self.write_node(frame.node_pos, &mut node)?;
            return Ok(true);
        }

        // New distinct key: push a routing entry up the recorded path.
        let mut new_key = key.to_vec();
        let mut new_child = new_pos;
        let mut changed: Option<(usize, Vec<u8>)> = None;
        let mut node_pos = frame.node_pos;
        loop {
            match self.insert_routing(kt, node_pos, &new_key, new_child, changed.take())? {
                InsertOutcome::Done => return Ok(true),
                InsertOutcome::MaxChanged(new_max) => {
                    self.propagate_max(&mut stack, &new_max)?;
                    return Ok(true);
                }
                InsertOutcome::Split {
                    left_max,
                    right_max,
                    right_pos,
                } => {
                    if let Some(parent) = stack.pop() {
                        changed = Some((parent.entry, left_max));
                        new_key = right_max;
                        new_child = right_pos;
                        node_pos = parent.node_pos;
                    } else {
                        // The split reached the root: grow the tree.
                        let mut root = self.new_node();
                        root.insert_entry(0, &left_max, node_pos);
                        root.insert_entry(1, &right_max, right_pos);
                        let root_pos = self.allocate_node()?;
                        self.write_node(root_pos, &mut root)?;
                        self.descriptors[self.active].root_node = root_pos;
                        self.descriptors[self.active].num_levels += 1;
                        return Ok(true);
                    }
                }
            }
        }
    }

    /// Inserts a routing entry into the node at `node_pos`.
    ///
    /// `changed` carries a pending routing-key correction from a split one
    /// level down, applied before the search so the node is consistent.
    fn insert_routing(
        &mut self,
        kt: KeyType,
        node_pos: i64,
        key: &[u8],
        child: i64,
        changed: Option<(usize, Vec<u8>)>,
    ) -> Result<InsertOutcome> {
        let max_items = self.desc().max_items as usize;
        let rebalance = self.desc().attributes.allows_delete();
        let mut node = self.new_node();
        self.read_node(node_pos, &mut node)?;
        if let Some((idx, value)) = changed {
            node.set_key(idx, &value);
        }

        let n = node.num_used();
        let (idx, exact) = Self::search_node(kt, &node, key);
        if exact {
            node.set_child(idx, child);
            self.write_node(node_pos, &mut node)?;
            return Ok(InsertOutcome::Done);
        }

        if n < max_items {
            node.insert_entry(idx, key, child);
            self.write_node(node_pos, &mut node)?;
            return Ok(if idx < n {
                InsertOutcome::Done
            } else {
                // Appended past the old maximum; the parent must learn it.
                InsertOutcome::MaxChanged(key.to_vec())
            });
        }

        // Node is full. Shift into the right sibling when it has room.
        let next_pos = node.next();
        if next_pos != NO_POSITION {
            let mut next = self.new_node();
            self.read_node(next_pos, &mut next)?;
            if next.num_used() < max_items {
                if idx < n {
                    let last = n - 1;
                    next.insert_entry(0, node.key(last), node.child(last));
                    node.remove_entry(last);
                    node.insert_entry(idx, key, child);
                } else {
                    next.insert_entry(0, key, child);
                }
                if rebalance {
                    let mut to_move =
                        (node.num_used() as isize - next.num_used() as isize) / 2;
                    while to_move > 0 {
                        let last = node.num_used() - 1;
                        next.insert_entry(0, node.key(last), node.child(last));
                        node.remove_entry(last);
                        to_move -= 1;
                    }
                }
                let left_max = node.max_key().to_vec();
                self.write_node(node_pos, &mut node)?;
                self.write_node(next_pos, &mut next)?;
                return Ok(InsertOutcome::MaxChanged(left_max));
            }
        }

        // Split off a fresh right sibling.
        let mut right = self.new_node();
        if idx < n {
            let last = n - 1;
            right.insert_entry(0, node.key(last), node.child(last));
            node.remove_entry(last);
            node.insert_entry(idx, key, child);
        } else {
            right.insert_entry(0, key, child);
        }
        if rebalance {
            let mut to_move = (node.num_used() - 1) / 2;
            while to_move > 0 {
                let last = node.num_used() - 1;
                right.insert_entry(0, node.key(last), node.child(last));
                node.remove_entry(last);
                to_move -= 1;
            }
        }
        right.set_next(next_pos);
        right.set_prev(node_pos);
        let right_pos = self.allocate_node()?;
        self.write_node(right_pos, &mut right)?;
        node.set_next(right_pos);
        if next_pos != NO_POSITION {
            let mut next = self.new_node();
            self.read_node(next_pos, &mut next)?;
            next.set_prev(right_pos);
            self.write_node(next_pos, &mut next)?;
        }
        self.write_node(node_pos, &mut node)?;

        Ok(InsertOutcome::Split {
            left_max: node.max_key().to_vec(),
            right_max: right.max_key().to_vec(),
            right_pos,
        })
    }

    /// Rewrites routing keys up the path while the changed entry was the
    /// last of its node.
    fn propagate_max(&mut self, stack: &mut Vec<PathFrame>, new_max: &[u8]) -> Result<()> {
        let mut node = self.new_node();
        while let Some(frame) = stack.pop() {
            self.read_node(frame.node_pos, &mut node)?;
            node.set_key(frame.entry, new_max);
            self.write_node(frame.node_pos, &mut node)?;
            if frame.entry + 1 != node.num_used() {
                break;
            }
        }
        Ok(())
    }

    //=========================================================================
    // Delete
    //=========================================================================

    /// Removes the routing entry for `key` from the interior layers.
    ///
    /// Returns the position of the leaf the entry addressed (the leftmost
    /// leaf of its run of equal keys), or None if no entry matched.
    fn delete_key_from_nodes(&mut self, kt: KeyType, key: &[u8]) -> Result<Option<i64>> {
        let Descent {
            mut stack,
            leaf_pos,
            exact,
        } = self.find_path(kt, key)?;
        let Some(frame) = stack.pop() else {
            return Ok(None);
        };
        if !exact {
            return Ok(None);
        }

        let mut node_pos = frame.node_pos;
        let mut entry = frame.entry;
        loop {
            match self.remove_routing(node_pos, entry)? {
                RemoveOutcome::Done => return Ok(Some(leaf_pos)),
                RemoveOutcome::MaxChanged(new_max) => {
                    self.propagate_max(&mut stack, &new_max)?;
                    return Ok(Some(leaf_pos));
                }
                RemoveOutcome::NodeFreed => {
                    let Some(frame) = stack.pop() else {
                        return Ok(Some(leaf_pos));
                    };
                    node_pos = frame.node_pos;
                    entry = frame.entry;
                }
            }
        }
    }

    /// Removes entry `entry` from the node at `node_pos`, handling
    /// underflow.
    ///
    /// Empty nodes are always unlinked and freed. With ALLOW_DELETE set, a
    /// node that falls below half-full borrows from the right sibling when
    /// it can spare entries, and otherwise merges into its front.
    fn remove_routing(&mut self, node_pos: i64, entry: usize) -> Result<RemoveOutcome> {
        let max_items = self.desc().max_items as usize;
        let rebalance = self.desc().attributes.allows_delete();
        let mut node = self.new_node();
        self.read_node(node_pos, &mut node)?;

        let before = node.num_used();
        if entry >= before {
            return Ok(RemoveOutcome::Done);
        }
        node.remove_entry(entry);
        let mut last_changed = entry == before - 1;
        let n = before - 1;

        if n == 0 {
            // Unlink the empty node from its level and free it.
            let next_pos = node.next();
            let prev_pos = node.prev();
            if next_pos != NO_POSITION {
                let mut next = self.new_node();
                self.read_node(next_pos, &mut next)?;
                next.set_prev(prev_pos);
                self.write_node(next_pos, &mut next)?;
            }
            if prev_pos != NO_POSITION {
                let mut prev = self.new_node();
                self.read_node(prev_pos, &mut prev)?;
                prev.set_next(next_pos);
                self.write_node(prev_pos, &mut prev)?;
            }
            self.free_node_block(node_pos)?;
            return Ok(RemoveOutcome::NodeFreed);
        }

        let next_pos = node.next();
        let min_fill = (max_items + 1) / 2;
        if rebalance && n < min_fill && next_pos != NO_POSITION {
            let mut next = self.new_node();
            self.read_node(next_pos, &mut next)?;
            let nn = next.num_used();
            if nn > n + 1 {
                // Borrow from the right sibling until the counts even out.
                let mut to_move = (nn - n) / 2;
                while to_move > 0 {
                    let num = node.num_used();
                    node.insert_entry(num, next.key(0), next.child(0));
                    next.remove_entry(0);
                    to_move -= 1;
                }
                last_changed = true;
                self.write_node(next_pos, &mut next)?;
                self.write_node(node_pos, &mut node)?;
            } else {
                // Merge the remainder into the right sibling's front.
                for i in 0..n {
                    next.insert_entry(i, node.key(i), node.child(i));
                }
                let prev_pos = node.prev();
                if prev_pos != NO_POSITION {
                    let mut prev = self.new_node();
                    self.read_node(prev_pos, &mut prev)?;
                    prev.set_next(next_pos);
                    self.write_node(prev_pos, &mut prev)?;
                }
                next.set_prev(prev_pos);
                self.write_node(next_pos, &mut next)?;
                self.free_node_block(node_pos)?;
                return Ok(RemoveOutcome::NodeFreed);
            }
        } else {
            self.write_node(node_pos, &mut node)?;
        }

        if last_changed {
            Ok(RemoveOutcome::MaxChanged(node.max_key().to_vec()))
        } else {
            Ok(RemoveOutcome::Done)
        }
    }

    fn delete_key_inner(&mut self, kt: KeyType, key: &[u8]) -> Result<bool> {
        let Some(run_start) = self.delete_key_from_nodes(kt, key)? else {
            return Ok(false);
        };

        // Free the whole run of equal keys, walking the chain forward. The
        // EOF sentinel bounds the walk.
        let mut walker = self.new_leaf();
        self.read_leaf(run_start, &mut walker)?;
        let before_pos = walker.prev();
        let mut survivor_pos = run_start;
        loop {
            self.free_leaf_block(survivor_pos)?;
            survivor_pos = walker.next();
            if survivor_pos == NO_POSITION {
                return Err(TrellisError::TreeCorrupted(
                    "leaf chain ended inside a delete run".to_string(),
                ));
            }
            self.read_leaf(survivor_pos, &mut walker)?;
            if compare_keys(kt, walker.key(), key) != Ordering::Equal {
                break;
            }
        }

        // Relink the chain across the removed run.
        walker.set_prev(before_pos);
        self.write_leaf(survivor_pos, &mut walker)?;
        let mut before = self.new_leaf();
        if before_pos != NO_POSITION {
            self.read_leaf(before_pos, &mut before)?;
            before.set_next(survivor_pos);
            self.write_leaf(before_pos, &mut before)?;
        } else {
            self.descriptors[self.active].first_leaf = survivor_pos;
        }

        // Park the cursor on a neighbor of the removed run.
        if survivor_pos != self.desc().last_leaf {
            self.set_cursor_from_leaf(survivor_pos, &walker);
        } else if before_pos != NO_POSITION {
            self.set_cursor_from_leaf(before_pos, &before);
        } else {
            self.cursors[self.active].reset();
        }
        Ok(true)
    }

    fn delete_current_inner(&mut self, kt: KeyType) -> Result<Option<i64>> {
        let current = self.cursor().current_leaf;
        if current == NO_POSITION || current == self.desc().last_leaf {
            return Ok(None);
        }

        let mut deleted = self.new_leaf();
        self.read_leaf(current, &mut deleted)?;
        let data_pos = deleted.data_pos();

        let prev_pos = self.cursor().prev_leaf;
        let next_pos = self.cursor().next_leaf;

        let mut prev = self.new_leaf();
        let mut prev_equal = false;
        if prev_pos != NO_POSITION {
            self.read_leaf(prev_pos, &mut prev)?;
            prev.set_next(next_pos);
            self.write_leaf(prev_pos, &mut prev)?;
            prev_equal = compare_keys(kt, prev.key(), deleted.key()) == Ordering::Equal;
        } else {
            self.descriptors[self.active].first_leaf = next_pos;
        }

        let mut next = self.new_leaf();
        let mut next_equal = false;
        if next_pos != NO_POSITION {
            self.read_leaf(next_pos, &mut next)?;
            next.set_prev(prev_pos);
            self.write_leaf(next_pos, &mut next)?;
            next_equal = compare_keys(kt, next.key(), deleted.key()) == Ordering::Equal;
        }

        self.free_leaf_block(current)?;

        // The interior layers only change when the deleted leaf was the one
        // its routing entry addressed.
        if !prev_equal {
            let key = deleted.key().to_vec();
            if next_equal {
                // A duplicate remains to the right; repoint the entry at it.
                self.modify_leaf(kt, &key, next_pos)?;
            } else {
                // The key is gone entirely; drop its routing entry.
                self.delete_key_from_nodes(kt, &key)?;
            }
        }

        if next_pos != NO_POSITION && next_pos != self.desc().last_leaf {
            self.set_cursor_from_leaf(next_pos, &next);
        } else if prev_pos != NO_POSITION {
            self.set_cursor_from_leaf(prev_pos, &prev);
        } else {
            self.cursors[self.active].reset();
        }
        Ok(Some(data_pos))
    }
}

impl Drop for MultiIndex {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.flush_inner();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::key::{encode_long_int, encode_text};
    use tempfile::tempdir;
    use trellis_common::IndexAttributes;

    fn text_config() -> IndexConfig {
        IndexConfig::new(KeyType::Text)
            .key_size(16)
            .max_items(5)
            .bulk_allocation(8, 16)
    }

    fn create_text_index(dir: &tempfile::TempDir) -> MultiIndex {
        let mut idx = MultiIndex::create(dir.path().join("test.ndx"), 1).unwrap();
        idx.init_index(1, &text_config()).unwrap();
        idx
    }

    #[test]
    fn test_create_validates_num_indexes() {
        let dir = tempdir().unwrap();
        let err = MultiIndex::create(dir.path().join("bad.ndx"), 0).unwrap_err();
        assert!(matches!(err, TrellisError::InvalidParameter { .. }));
    }

    #[test]
    fn test_uninitialized_index_rejected() {
        let dir = tempdir().unwrap();
        let mut idx = MultiIndex::create(dir.path().join("test.ndx"), 1).unwrap();
        let err = idx.find(&encode_text("x", 16)).unwrap_err();
        assert!(matches!(err, TrellisError::NotInitialized(1)));
    }

    #[test]
    fn test_init_index_validates_config() {
        let dir = tempdir().unwrap();
        let mut idx = MultiIndex::create(dir.path().join("test.ndx"), 1).unwrap();
        let bad = IndexConfig::new(KeyType::Text).key_size(0);
        assert!(idx.init_index(1, &bad).is_err());
        let bad = IndexConfig::new(KeyType::Text).max_items(2);
        assert!(idx.init_index(1, &bad).is_err());
    }

    #[test]
    fn test_empty_index_navigation() {
        let dir = tempdir().unwrap();
        let mut idx = create_text_index(&dir);
        assert!(idx.get_first().unwrap().is_none());
        assert_eq!(idx.find(&encode_text("nope", 16)).unwrap(), None);
        assert_eq!(idx.num_levels(), 1);
    }

    #[test]
    fn test_append_and_find() {
        let dir = tempdir().unwrap();
        let mut idx = create_text_index(&dir);

        assert!(idx.append(&encode_text("bravo", 16), 2).unwrap());
        assert!(idx.append(&encode_text("alpha", 16), 1).unwrap());
        assert!(idx.append(&encode_text("charlie", 16), 3).unwrap());

        assert_eq!(idx.find(&encode_text("alpha", 16)).unwrap(), Some(1));
        assert_eq!(idx.find(&encode_text("bravo", 16)).unwrap(), Some(2));
        assert_eq!(idx.find(&encode_text("charlie", 16)).unwrap(), Some(3));
        assert_eq!(idx.find(&encode_text("delta", 16)).unwrap(), None);
    }

    #[test]
    fn test_find_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut idx = create_text_index(&dir);
        idx.append(&encode_text("key", 16), 9).unwrap();

        let first = idx.find(&encode_text("key", 16)).unwrap();
        let cursor_leaf = idx.cursor().current_leaf;
        let second = idx.find(&encode_text("key", 16)).unwrap();
        assert_eq!(first, second);
        assert_eq!(idx.cursor().current_leaf, cursor_leaf);
    }

    #[test]
    fn test_key_length_checked() {
        let dir = tempdir().unwrap();
        let mut idx = create_text_index(&dir);
        let err = idx.append(b"short", 1).unwrap_err();
        assert!(matches!(
            err,
            TrellisError::KeyLength {
                expected: 16,
                got: 5
            }
        ));
        // The handle stays usable.
        assert!(idx.append(&encode_text("ok", 16), 1).unwrap());
    }

    #[test]
    fn test_tree_grows_and_orders() {
        let dir = tempdir().unwrap();
        let mut idx = create_text_index(&dir);

        for i in (0..60).rev() {
            let key = encode_text(&format!("{i:03}"), 16);
            assert!(idx.append(&key, i as i64).unwrap());
        }
        assert!(idx.num_levels() >= 2);

        let mut seen = Vec::new();
        let mut entry = idx.get_first().unwrap();
        while let Some(e) = entry {
            seen.push(e.data_pos);
            entry = idx.get_next().unwrap();
        }
        assert_eq!(seen, (0..60).collect::<Vec<i64>>());
    }

    #[test]
    fn test_unique_rejects_duplicate_without_mutation() {
        let dir = tempdir().unwrap();
        let mut idx = MultiIndex::create(dir.path().join("test.ndx"), 1).unwrap();
        let config = IndexConfig::new(KeyType::LongInt)
            .attributes(IndexAttributes::unique_with_delete())
            .max_items(5)
            .bulk_allocation(8, 16);
        idx.init_index(1, &config).unwrap();

        assert!(idx.append(&encode_long_int(42), 100).unwrap());
        assert!(!idx.append(&encode_long_int(42), 200).unwrap());
        assert_eq!(idx.find(&encode_long_int(42)).unwrap(), Some(100));

        assert!(idx.delete_key(&encode_long_int(42)).unwrap());
        assert!(idx.append(&encode_long_int(42), 300).unwrap());
        assert_eq!(idx.find(&encode_long_int(42)).unwrap(), Some(300));
    }

    #[test]
    fn test_delete_key_removes_run() {
        let dir = tempdir().unwrap();
        let mut idx = create_text_index(&dir);

        idx.append(&encode_text("dup", 16), 1).unwrap();
        idx.append(&encode_text("dup", 16), 2).unwrap();
        idx.append(&encode_text("dup", 16), 3).unwrap();
        idx.append(&encode_text("other", 16), 4).unwrap();

        assert!(idx.delete_key(&encode_text("dup", 16)).unwrap());
        assert_eq!(idx.find(&encode_text("dup", 16)).unwrap(), None);
        assert_eq!(idx.find(&encode_text("other", 16)).unwrap(), Some(4));
        assert!(!idx.delete_key(&encode_text("dup", 16)).unwrap());
    }

    #[test]
    fn test_freed_leaves_are_reused() {
        let dir = tempdir().unwrap();
        let mut idx = create_text_index(&dir);

        idx.append(&encode_text("a", 16), 1).unwrap();
        let len_after_insert = idx.io.len();
        idx.delete_key(&encode_text("a", 16)).unwrap();
        idx.append(&encode_text("b", 16), 2).unwrap();
        // The freed leaf satisfies the new allocation; no file growth.
        assert_eq!(idx.io.len(), len_after_insert);
    }

    #[test]
    fn test_delete_current_walks_duplicates() {
        let dir = tempdir().unwrap();
        let mut idx = create_text_index(&dir);

        idx.append(&encode_text("dup", 16), 1).unwrap();
        idx.append(&encode_text("dup", 16), 2).unwrap();
        idx.append(&encode_text("solo", 16), 3).unwrap();

        // Cursor starts on the first (newest) duplicate.
        idx.get_first().unwrap();
        let removed = idx.delete_current().unwrap();
        assert!(removed.is_some());
        let removed = idx.delete_current().unwrap();
        assert!(removed.is_some());

        assert_eq!(idx.find(&encode_text("dup", 16)).unwrap(), None);
        assert_eq!(idx.find(&encode_text("solo", 16)).unwrap(), Some(3));
    }

    #[test]
    fn test_delete_current_on_empty_index() {
        let dir = tempdir().unwrap();
        let mut idx = create_text_index(&dir);
        assert_eq!(idx.delete_current().unwrap(), None);
    }

    #[test]
    fn test_error_latches_and_clears() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.ndx");
        let root_pos;
        {
            let mut idx = MultiIndex::create(&path, 1).unwrap();
            idx.init_index(1, &text_config()).unwrap();
            idx.append(&encode_text("key", 16), 1).unwrap();
            root_pos = idx.desc().root_node;
            idx.close().unwrap();
        }

        // Flip a payload byte inside the root node block.
        {
            use std::io::{Seek, SeekFrom, Write};
            let mut f = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
            f.seek(SeekFrom::Start(root_pos as u64 + 5)).unwrap();
            f.write_all(&[0xA5]).unwrap();
        }

        let mut idx = MultiIndex::open(&path).unwrap();
        let err = idx.find(&encode_text("key", 16)).unwrap_err();
        assert!(matches!(err, TrellisError::BlockCorrupted { .. }));
        assert_eq!(idx.last_error(), Some(ErrorKind::BadData));

        // Subsequent operations short-circuit until the latch is cleared.
        let err = idx.get_first().unwrap_err();
        assert!(matches!(err, TrellisError::Faulted(ErrorKind::BadData)));
        idx.clear_error();
        assert_eq!(idx.last_error(), None);
    }

    #[test]
    fn test_multi_index_slots_are_independent() {
        let dir = tempdir().unwrap();
        let mut idx = MultiIndex::create(dir.path().join("test.ndx"), 2).unwrap();
        idx.init_index(1, &text_config()).unwrap();
        idx.init_index(
            2,
            &IndexConfig::new(KeyType::LongInt).max_items(5).bulk_allocation(8, 16),
        )
        .unwrap();

        idx.set_active_index(1).unwrap();
        idx.append(&encode_text("name", 16), 10).unwrap();
        idx.set_active_index(2).unwrap();
        idx.append(&encode_long_int(7), 20).unwrap();

        idx.set_active_index(1).unwrap();
        assert_eq!(idx.find(&encode_text("name", 16)).unwrap(), Some(10));
        assert_eq!(idx.find(&encode_text("seven", 16)).unwrap(), None);

        idx.set_active_index(2).unwrap();
        assert_eq!(idx.find(&encode_long_int(7)).unwrap(), Some(20));
    }

    #[test]
    fn test_set_active_index_bounds() {
        let dir = tempdir().unwrap();
        let mut idx = MultiIndex::create(dir.path().join("test.ndx"), 2).unwrap();
        assert!(idx.set_active_index(0).is_err());
        assert!(idx.set_active_index(3).is_err());
        assert!(idx.set_active_index(2).is_ok());
        assert_eq!(idx.active_index(), 2);
    }
}
