//! Shared types: [`ByteOrder`] and the SEG2 [`DataFormat`] code.

use std::fmt;

/// Byte order for multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Big => write!(f, "big-endian"),
            Self::Little => write!(f, "little-endian"),
        }
    }
}

/// Sample format code from a SEG2 trace block header.
///
/// The reader always decodes samples as 32-bit floats; the code is kept
/// so callers can detect files that declare something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// 16-bit fixed point (code 1).
    Int16,
    /// 32-bit fixed point (code 2).
    Int32,
    /// 20-bit floating point, SEG-D style (code 3).
    Float20,
    /// 32-bit IEEE float (code 4).
    Float32,
    /// 64-bit IEEE double (code 5).
    Float64,
    /// Any other code.
    Unknown(u8),
}

impl DataFormat {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Int16,
            2 => Self::Int32,
            3 => Self::Float20,
            4 => Self::Float32,
            5 => Self::Float64,
            other => Self::Unknown(other),
        }
    }

    pub fn to_code(self) -> u8 {
        match self {
            Self::Int16 => 1,
            Self::Int32 => 2,
            Self::Float20 => 3,
            Self::Float32 => 4,
            Self::Float64 => 5,
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int16 => write!(f, "INT16"),
            Self::Int32 => write!(f, "INT32"),
            Self::Float20 => write!(f, "FLOAT20"),
            Self::Float32 => write!(f, "FLOAT32"),
            Self::Float64 => write!(f, "FLOAT64"),
            Self::Unknown(code) => write!(f, "unknown ({code})"),
        }
    }
}
