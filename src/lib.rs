//! Pure Rust SEG2 decoder and SEG-Y/SU trace reader/writer.
//!
//! Decodes SEG2 files (variable-length string headers per trace), reads and
//! writes headerless SU trace streams (240-byte big-endian trace headers),
//! and converts SEG2 traces into SU traces.
//!
//! # Converting a SEG2 trace
//!
//! ```
//! use segconv::{Seg2Trace, seg2_to_segy};
//!
//! let trace = Seg2Trace::new(vec![0.0, 1.0, 0.5])
//!     .with_header("SAMPLE_INTERVAL", &["0.0005"])
//!     .with_header("SOURCE_LOCATION", &["100"])
//!     .with_header("RECEIVER_LOCATION", &["40"]);
//!
//! let su = seg2_to_segy(&trace);
//! assert_eq!(su.header.ns, 3);
//! assert_eq!(su.header.dt, 500);
//! assert_eq!(su.header.offset, 60);
//! ```
//!
//! # Reading a SEG2 stream
//!
//! ```
//! use std::io::Cursor;
//! use segconv::{Seg2Trace, StringHeaders, read_seg2, write_seg2};
//!
//! let traces = vec![
//!     Seg2Trace::new(vec![1.0, 2.0]).with_header("CHANNEL_NUMBER", &["1"]),
//!     Seg2Trace::new(vec![3.0, 4.0]).with_header("CHANNEL_NUMBER", &["2"]),
//! ];
//! let mut bytes = Vec::new();
//! write_seg2(&mut bytes, &StringHeaders::new(), &traces).unwrap();
//!
//! let decoded = read_seg2(Cursor::new(bytes)).unwrap();
//! assert_eq!(decoded.len(), 2);
//! assert_eq!(decoded[1].first_value("CHANNEL_NUMBER"), Some("2"));
//! ```
//!
//! # Writing and reading SU
//!
//! ```
//! use std::io::Cursor;
//! use segconv::{SegyTrace, TraceHeader, read_su, write_su};
//!
//! let trace = SegyTrace {
//!     header: TraceHeader { ns: 2, dt: 1000, ..TraceHeader::default() },
//!     data: vec![0.0, 0.0],
//! };
//! let mut bytes = Vec::new();
//! let n = write_su(&mut bytes, &[trace]).unwrap();
//! assert_eq!(n, 248);
//!
//! let traces = read_su(Cursor::new(bytes)).unwrap();
//! assert_eq!(traces[0].header.dt, 1000);
//! ```

pub mod bridge;
pub mod codec;
pub mod commands;
pub mod error;
pub mod seg2;
pub mod segy;
pub mod types;

pub use error::{Result, SegError};
pub use types::{ByteOrder, DataFormat};

pub use bridge::{ConversionSummary, convert_seg2_to_su, seg2_to_segy, seg2_to_segy_bytes};
pub use seg2::{
    FileHeader, SUGGESTED_HEADERS, Seg2Reader, Seg2Trace, StringHeaders, TraceBlockHeader,
    read_seg2, read_seg2_file, write_seg2,
};
pub use segy::{SegyTrace, SuReader, TraceHeader, read_su, read_su_file, write_su, write_su_file};
