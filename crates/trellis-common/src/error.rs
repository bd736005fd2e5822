//! Error types for Trellis.

use thiserror::Error;

/// Result type alias using TrellisError.
pub type Result<T> = std::result::Result<T, TrellisError>;

/// Coarse error classification latched on an index handle.
///
/// After an `Io` or `BadData` failure the handle refuses further operations
/// until the error is explicitly cleared; the latched kind tells the caller
/// what went wrong without keeping the full error around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A file operation failed (read, write, seek, open, create, close).
    Io,
    /// Data corruption detected (checksum mismatch or broken tree structure).
    BadData,
    /// The handle is unusable (faulted or invalid).
    BadHandle,
    /// Invalid configuration or parameters.
    Init,
}

/// Errors that can occur in Trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("read of {len} bytes at offset {offset} failed: {source}")]
    Read {
        offset: i64,
        len: usize,
        source: std::io::Error,
    },

    #[error("write of {len} bytes at offset {offset} failed: {source}")]
    Write {
        offset: i64,
        len: usize,
        source: std::io::Error,
    },

    #[error("seek to offset {offset} failed: {source}")]
    Seek {
        offset: i64,
        source: std::io::Error,
    },

    // Integrity errors
    #[error("block corrupted at offset {offset}: checksum mismatch")]
    BlockCorrupted { offset: i64 },

    #[error("index structure corrupted: {0}")]
    TreeCorrupted(String),

    // Handle errors
    #[error("handle disabled by an earlier {0:?} error; call clear_error to resume")]
    Faulted(ErrorKind),

    #[error("index {0} has not been initialized")]
    NotInitialized(u16),

    // Configuration errors
    #[error("invalid index configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },

    #[error("key length {got} does not match index key size {expected}")]
    KeyLength { expected: u16, got: usize },
}

impl TrellisError {
    /// Classifies this error into the latchable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrellisError::Io(_)
            | TrellisError::Read { .. }
            | TrellisError::Write { .. }
            | TrellisError::Seek { .. } => ErrorKind::Io,
            TrellisError::BlockCorrupted { .. } | TrellisError::TreeCorrupted(_) => {
                ErrorKind::BadData
            }
            TrellisError::Faulted(_) | TrellisError::NotInitialized(_) => ErrorKind::BadHandle,
            TrellisError::InvalidConfig(_)
            | TrellisError::InvalidParameter { .. }
            | TrellisError::KeyLength { .. } => ErrorKind::Init,
        }
    }

    /// Returns true if this error should latch the handle.
    ///
    /// Only I/O failures and corruption are fatal to the handle; everything
    /// else surfaces through the return value and leaves it usable.
    pub fn is_latching(&self) -> bool {
        matches!(self.kind(), ErrorKind::Io | ErrorKind::BadData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind as IoErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(IoErrorKind::NotFound, "file not found");
        let err: TrellisError = io_err.into();
        assert!(matches!(err, TrellisError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_read_error_display() {
        let err = TrellisError::Read {
            offset: 128,
            len: 67,
            source: IoError::new(IoErrorKind::UnexpectedEof, "eof"),
        };
        assert_eq!(err.to_string(), "read of 67 bytes at offset 128 failed: eof");
        assert!(err.is_latching());
    }

    #[test]
    fn test_block_corrupted_display() {
        let err = TrellisError::BlockCorrupted { offset: 4096 };
        assert_eq!(
            err.to_string(),
            "block corrupted at offset 4096: checksum mismatch"
        );
        assert_eq!(err.kind(), ErrorKind::BadData);
        assert!(err.is_latching());
    }

    #[test]
    fn test_config_errors_not_latching() {
        let err = TrellisError::InvalidConfig("key size must be non-zero".to_string());
        assert_eq!(err.kind(), ErrorKind::Init);
        assert!(!err.is_latching());

        let err = TrellisError::KeyLength {
            expected: 50,
            got: 4,
        };
        assert_eq!(
            err.to_string(),
            "key length 4 does not match index key size 50"
        );
        assert!(!err.is_latching());
    }

    #[test]
    fn test_faulted_display() {
        let err = TrellisError::Faulted(ErrorKind::BadData);
        assert!(err.to_string().contains("BadData"));
        assert_eq!(err.kind(), ErrorKind::BadHandle);
        assert!(!err.is_latching());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrellisError>();
    }
}
