//! Map SEG2 traces onto SEG-Y/SU traces.
//!
//! Header fields are filled best-effort from the SEG2 string headers: a
//! missing key or an unparsable value leaves that field at its default and
//! never fails the conversion.

use std::io::{Read, Seek, Write};

use tracing::{debug, info, warn};

use crate::Result;
use crate::seg2::{Seg2Reader, Seg2Trace};
use crate::segy::{self, SegyTrace, TraceHeader};

/// Sample interval used when `SAMPLE_INTERVAL` is absent or unusable.
pub const DEFAULT_DT_MICROS: u16 = 1000;

/// Convert one SEG2 trace into an SU trace.
pub fn seg2_to_segy(trace: &Seg2Trace) -> SegyTrace {
    let mut data = trace.samples.clone();
    let ns = match u16::try_from(data.len()) {
        Ok(ns) => ns,
        Err(_) => {
            warn!(
                samples = data.len(),
                "trace longer than {} samples, clipping",
                u16::MAX
            );
            data.truncate(u16::MAX as usize);
            u16::MAX
        }
    };

    let mut header = TraceHeader {
        ns,
        dt: DEFAULT_DT_MICROS,
        ..TraceHeader::default()
    };

    if let Some(seconds) = parse_value::<f64>(trace, "SAMPLE_INTERVAL") {
        match seconds_to_micros(seconds) {
            Some(dt) => header.dt = dt,
            None => warn!(seconds, "sample interval out of range, keeping default"),
        }
    }
    if let Some(fldr) = parse_value::<i32>(trace, "SHOT_SEQUENCE_NUMBER") {
        header.fldr = fldr;
    }
    if let Some(gx) = parse_value::<f64>(trace, "RECEIVER_LOCATION") {
        header.gx = gx as i32;
    }
    if let Some(sx) = parse_value::<f64>(trace, "SOURCE_LOCATION") {
        header.sx = sx as i32;
    }
    if let Some(channel) = parse_value::<i32>(trace, "CHANNEL_NUMBER") {
        header.tracr = channel;
        header.tracf = channel;
    }
    header.offset = header.sx.wrapping_sub(header.gx);

    SegyTrace { header, data }
}

/// Convert one SEG2 trace straight to SU bytes (big-endian header and samples).
pub fn seg2_to_segy_bytes(trace: &Seg2Trace) -> Vec<u8> {
    seg2_to_segy(trace).to_bytes()
}

/// Totals from [`convert_seg2_to_su`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub traces: usize,
    pub bytes_written: usize,
}

/// Decode a SEG2 stream and write every trace to `writer` as SU.
///
/// The whole SEG2 file is decoded before anything is written, so a decode
/// error leaves `writer` untouched.
pub fn convert_seg2_to_su<R: Read + Seek, W: Write>(
    reader: R,
    writer: &mut W,
) -> Result<ConversionSummary> {
    let mut seg2 = Seg2Reader::open(reader)?;
    let traces = seg2.read_all()?;

    for (i, trace) in traces.iter().enumerate() {
        let missing = trace.missing_suggested_headers();
        if !missing.is_empty() {
            debug!(trace = i, ?missing, "suggested SEG2 headers absent");
        }
    }

    let converted: Vec<SegyTrace> = traces.iter().map(seg2_to_segy).collect();
    let bytes_written = segy::write_su(writer, &converted)?;

    info!(traces = converted.len(), bytes = bytes_written, "converted SEG2 to SU");
    Ok(ConversionSummary {
        traces: converted.len(),
        bytes_written,
    })
}

/// Parse the first token of `key`; `None` if absent or unparsable.
fn parse_value<T: std::str::FromStr>(trace: &Seg2Trace, key: &str) -> Option<T> {
    let token = trace.first_value(key)?;
    match token.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, token, "unparsable SEG2 header value, keeping default");
            None
        }
    }
}

fn seconds_to_micros(seconds: f64) -> Option<u16> {
    let micros = (seconds * 1_000_000.0).round();
    if micros.is_finite() && (0.0..=u16::MAX as f64).contains(&micros) {
        Some(micros as u16)
    } else {
        None
    }
}
