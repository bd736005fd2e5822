//! Shared handle over a multi-index file.
//!
//! `MultiIndex` is a single-owner handle: every operation takes `&mut self`.
//! `SharedIndex` wraps it in a mutex so multiple threads can share one open
//! file. Each public operation holds the lock for its full duration,
//! including the cursor update, so operations are linearizable and cursor
//! state is never observed mid-mutation. Lookups and mutations serialize
//! through the same lock; there is no reader/writer split.

use crate::btree::multi::{IndexEntry, MultiIndex};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use trellis_common::{ErrorKind, IndexConfig, Result};

/// A cloneable, thread-safe handle to a multi-index file.
#[derive(Clone)]
pub struct SharedIndex {
    inner: Arc<Mutex<MultiIndex>>,
}

impl SharedIndex {
    /// Creates a new index file and wraps it for shared access.
    pub fn create(path: impl AsRef<Path>, num_indexes: u16) -> Result<Self> {
        Ok(Self::from_owned(MultiIndex::create(path, num_indexes)?))
    }

    /// Opens an existing index file and wraps it for shared access.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_owned(MultiIndex::open(path)?))
    }

    /// Wraps an already-open handle.
    pub fn from_owned(index: MultiIndex) -> Self {
        Self {
            inner: Arc::new(Mutex::new(index)),
        }
    }

    /// Runs a compound sequence of operations under a single lock
    /// acquisition.
    ///
    /// Use this when a later operation depends on the cursor state left by
    /// an earlier one and no other thread may intervene, e.g. `find`
    /// followed by `delete_current`.
    pub fn with<R>(&self, f: impl FnOnce(&mut MultiIndex) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// See [`MultiIndex::init_index`].
    pub fn init_index(&self, index_no: u16, config: &IndexConfig) -> Result<()> {
        self.inner.lock().init_index(index_no, config)
    }

    /// See [`MultiIndex::set_active_index`].
    pub fn set_active_index(&self, index_no: u16) -> Result<()> {
        self.inner.lock().set_active_index(index_no)
    }

    /// See [`MultiIndex::active_index`].
    pub fn active_index(&self) -> u16 {
        self.inner.lock().active_index()
    }

    /// See [`MultiIndex::num_indexes`].
    pub fn num_indexes(&self) -> u16 {
        self.inner.lock().num_indexes()
    }

    /// See [`MultiIndex::append`].
    pub fn append(&self, key: &[u8], data_pos: i64) -> Result<bool> {
        self.inner.lock().append(key, data_pos)
    }

    /// See [`MultiIndex::find`].
    pub fn find(&self, key: &[u8]) -> Result<Option<i64>> {
        self.inner.lock().find(key)
    }

    /// See [`MultiIndex::delete_key`].
    pub fn delete_key(&self, key: &[u8]) -> Result<bool> {
        self.inner.lock().delete_key(key)
    }

    /// See [`MultiIndex::delete_current`].
    pub fn delete_current(&self) -> Result<Option<i64>> {
        self.inner.lock().delete_current()
    }

    /// See [`MultiIndex::get_first`].
    pub fn get_first(&self) -> Result<Option<IndexEntry>> {
        self.inner.lock().get_first()
    }

    /// See [`MultiIndex::get_next`].
    pub fn get_next(&self) -> Result<Option<IndexEntry>> {
        self.inner.lock().get_next()
    }

    /// See [`MultiIndex::get_prev`].
    pub fn get_prev(&self) -> Result<Option<IndexEntry>> {
        self.inner.lock().get_prev()
    }

    /// See [`MultiIndex::get_current`].
    pub fn get_current(&self) -> Result<Option<IndexEntry>> {
        self.inner.lock().get_current()
    }

    /// See [`MultiIndex::is_eof`].
    pub fn is_eof(&self) -> bool {
        self.inner.lock().is_eof()
    }

    /// See [`MultiIndex::is_bof`].
    pub fn is_bof(&self) -> bool {
        self.inner.lock().is_bof()
    }

    /// See [`MultiIndex::last_error`].
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.inner.lock().last_error()
    }

    /// See [`MultiIndex::clear_error`].
    pub fn clear_error(&self) {
        self.inner.lock().clear_error()
    }

    /// See [`MultiIndex::flush`].
    pub fn flush(&self) -> Result<()> {
        self.inner.lock().flush()
    }
}
