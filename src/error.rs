//! Error types for SEG2 and SEG-Y/SU decoding and encoding.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SegError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{record} truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("read of {len} bytes at offset {offset} runs past end of data ({available} bytes)")]
    PastEnd { offset: u64, len: u64, available: u64 },

    #[error("invalid {field} length {len} (must be 1 or 2)")]
    InvalidTerminatorLength { field: &'static str, len: u8 },

    #[error("trace index {index} out of range ({count} traces)")]
    NoSuchTrace { index: usize, count: usize },

    #[error("encode error: {0}")]
    Encode(String),
}

impl SegError {
    /// True for stream failures (open/read/write errors, truncated mandatory records).
    pub fn is_io(&self) -> bool {
        matches!(self, SegError::Io(_))
    }

    /// True for structurally invalid records.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            SegError::Truncated { .. }
                | SegError::PastEnd { .. }
                | SegError::InvalidTerminatorLength { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SegError>;
