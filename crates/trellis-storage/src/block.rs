//! Block-level file I/O with checksum verification.
//!
//! All persistent structures are fixed-size blocks whose first byte is an
//! 8-bit XOR checksum of the whole block. `BlockFile` is the single boundary
//! through which blocks reach disk: writes seal the checksum, reads verify it
//! and fail with a corruption error on mismatch. Raw (unchecksummed) access
//! is provided separately for record payloads.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use trellis_common::checksum::{seal_block, verify_block};
use trellis_common::{Result, TrellisError};

/// A file accessed as whole blocks at byte offsets.
#[derive(Debug)]
pub struct BlockFile {
    /// The underlying file handle.
    file: File,
    /// Path to the file.
    path: PathBuf,
    /// Cached file length in bytes.
    len: i64,
}

impl BlockFile {
    /// Creates a new file, truncating any existing one.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self { file, path, len: 0 })
    }

    /// Opens an existing file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let len = file.metadata()?.len() as i64;
        Ok(Self { file, path, len })
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current file length in bytes.
    pub fn len(&self) -> i64 {
        self.len
    }

    /// Returns true if the file is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn seek_to(&mut self, pos: i64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(pos as u64))
            .map_err(|source| TrellisError::Seek { offset: pos, source })?;
        Ok(())
    }

    /// Reads raw bytes at `pos` without checksum verification.
    pub fn read_raw(&mut self, pos: i64, buf: &mut [u8]) -> Result<()> {
        self.seek_to(pos)?;
        self.file.read_exact(buf).map_err(|source| TrellisError::Read {
            offset: pos,
            len: buf.len(),
            source,
        })?;
        Ok(())
    }

    /// Writes raw bytes at `pos` without sealing a checksum.
    pub fn write_raw(&mut self, pos: i64, buf: &[u8]) -> Result<()> {
        self.seek_to(pos)?;
        self.file.write_all(buf).map_err(|source| TrellisError::Write {
            offset: pos,
            len: buf.len(),
            source,
        })?;
        let end = pos + buf.len() as i64;
        if end > self.len {
            self.len = end;
        }
        Ok(())
    }

    /// Reads a block at `pos` and verifies its checksum.
    pub fn read_block(&mut self, pos: i64, buf: &mut [u8]) -> Result<()> {
        self.read_raw(pos, buf)?;
        if !verify_block(buf) {
            return Err(TrellisError::BlockCorrupted { offset: pos });
        }
        Ok(())
    }

    /// Seals the block's checksum and writes it at `pos`.
    pub fn write_block(&mut self, pos: i64, buf: &mut [u8]) -> Result<()> {
        seal_block(buf);
        self.write_raw(pos, buf)
    }

    /// Seals the block's checksum and appends it at end of file.
    ///
    /// Returns the offset the block was written at.
    pub fn append_block(&mut self, buf: &mut [u8]) -> Result<i64> {
        let pos = self.len;
        self.write_block(pos, buf)?;
        Ok(pos)
    }

    /// Flushes all buffered writes to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
