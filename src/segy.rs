//! Read and write SEG-Y/SU traces.
//!
//! An SU file is a plain concatenation of traces, each a 240-byte big-endian
//! [`TraceHeader`] followed by `ns` 32-bit float samples. There is no reel
//! or binary file header.
//!
//! Byte order of the sample data differs between the two directions: the
//! reader decodes samples as little-endian, the writer encodes them as
//! big-endian. Headers are big-endian both ways.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::{Result, SegError};
use crate::codec::{self, FieldReader, FieldWriter, FixedRecord};
use crate::types::ByteOrder;

/// Byte order of the 240-byte trace header.
pub const HEADER_BYTE_ORDER: ByteOrder = ByteOrder::Big;
/// Byte order of sample data when reading.
pub const READ_DATA_BYTE_ORDER: ByteOrder = ByteOrder::Little;
/// Byte order of sample data when writing.
pub const WRITE_DATA_BYTE_ORDER: ByteOrder = ByteOrder::Big;

/// SEG-Y/SU 240-byte trace header, fields in on-disk order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceHeader {
    /// Trace sequence number within line.
    pub tracl: i32,
    /// Trace sequence number within reel.
    pub tracr: i32,
    /// Field record number.
    pub fldr: i32,
    /// Trace number within field record.
    pub tracf: i32,
    pub ep: i32,
    pub cdp: i32,
    pub cdpt: i32,
    /// Trace identification code.
    pub trid: i16,
    pub nvs: i16,
    pub nhs: i16,
    pub duse: i16,
    /// Source to receiver distance.
    pub offset: i32,
    pub gelev: i32,
    pub selev: i32,
    pub sdepth: i32,
    pub gdel: i32,
    pub sdel: i32,
    pub swdep: i32,
    pub gwdep: i32,
    pub scalel: i16,
    pub scalco: i16,
    pub sx: i32,
    pub sy: i32,
    pub gx: i32,
    pub gy: i32,
    pub counit: i16,
    pub wevel: i16,
    pub swevel: i16,
    pub sut: i16,
    pub gut: i16,
    pub sstat: i16,
    pub gstat: i16,
    pub tstat: i16,
    pub laga: i16,
    pub lagb: i16,
    pub delrt: i16,
    pub muts: i16,
    pub mute: i16,
    /// Number of samples in this trace.
    pub ns: u16,
    /// Sample interval in microseconds.
    pub dt: u16,
    pub gain: i16,
    pub igc: i16,
    pub igi: i16,
    pub corr: i16,
    pub sfs: i16,
    pub sfe: i16,
    pub slen: i16,
    pub styp: i16,
    pub stas: i16,
    pub stae: i16,
    pub tatyp: i16,
    pub afilf: i16,
    pub afils: i16,
    pub nofilf: i16,
    pub nofils: i16,
    pub lcf: i16,
    pub hcf: i16,
    pub lcs: i16,
    pub hcs: i16,
    pub year: i16,
    pub day: i16,
    pub hour: i16,
    pub minute: i16,
    pub sec: i16,
    pub timbas: i16,
    pub trwf: i16,
    pub grnors: i16,
    pub grnofr: i16,
    pub grnlof: i16,
    pub gaps: i16,
    pub otrav: i16,
    pub d1: f32,
    pub f1: f32,
    pub d2: f32,
    pub f2: f32,
    pub ungpow: f32,
    pub unscale: f32,
    pub ntr: i32,
    pub mark: i16,
    pub shortpad: i16,
    /// Unassigned.
    pub unass: [i16; 14],
}

impl FixedRecord for TraceHeader {
    const SIZE: usize = 240;
    const NAME: &'static str = "SU trace header";

    fn decode_fields(f: &mut FieldReader<'_>) -> Self {
        Self {
            tracl: f.i32(),
            tracr: f.i32(),
            fldr: f.i32(),
            tracf: f.i32(),
            ep: f.i32(),
            cdp: f.i32(),
            cdpt: f.i32(),
            trid: f.i16(),
            nvs: f.i16(),
            nhs: f.i16(),
            duse: f.i16(),
            offset: f.i32(),
            gelev: f.i32(),
            selev: f.i32(),
            sdepth: f.i32(),
            gdel: f.i32(),
            sdel: f.i32(),
            swdep: f.i32(),
            gwdep: f.i32(),
            scalel: f.i16(),
            scalco: f.i16(),
            sx: f.i32(),
            sy: f.i32(),
            gx: f.i32(),
            gy: f.i32(),
            counit: f.i16(),
            wevel: f.i16(),
            swevel: f.i16(),
            sut: f.i16(),
            gut: f.i16(),
            sstat: f.i16(),
            gstat: f.i16(),
            tstat: f.i16(),
            laga: f.i16(),
            lagb: f.i16(),
            delrt: f.i16(),
            muts: f.i16(),
            mute: f.i16(),
            ns: f.u16(),
            dt: f.u16(),
            gain: f.i16(),
            igc: f.i16(),
            igi: f.i16(),
            corr: f.i16(),
            sfs: f.i16(),
            sfe: f.i16(),
            slen: f.i16(),
            styp: f.i16(),
            stas: f.i16(),
            stae: f.i16(),
            tatyp: f.i16(),
            afilf: f.i16(),
            afils: f.i16(),
            nofilf: f.i16(),
            nofils: f.i16(),
            lcf: f.i16(),
            hcf: f.i16(),
            lcs: f.i16(),
            hcs: f.i16(),
            year: f.i16(),
            day: f.i16(),
            hour: f.i16(),
            minute: f.i16(),
            sec: f.i16(),
            timbas: f.i16(),
            trwf: f.i16(),
            grnors: f.i16(),
            grnofr: f.i16(),
            grnlof: f.i16(),
            gaps: f.i16(),
            otrav: f.i16(),
            d1: f.f32(),
            f1: f.f32(),
            d2: f.f32(),
            f2: f.f32(),
            ungpow: f.f32(),
            unscale: f.f32(),
            ntr: f.i32(),
            mark: f.i16(),
            shortpad: f.i16(),
            unass: std::array::from_fn(|_| f.i16()),
        }
    }

    fn encode_fields(&self, f: &mut FieldWriter) {
        for v in [self.tracl, self.tracr, self.fldr, self.tracf, self.ep, self.cdp, self.cdpt] {
            f.i32(v);
        }
        for v in [self.trid, self.nvs, self.nhs, self.duse] {
            f.i16(v);
        }
        for v in [
            self.offset,
            self.gelev,
            self.selev,
            self.sdepth,
            self.gdel,
            self.sdel,
            self.swdep,
            self.gwdep,
        ] {
            f.i32(v);
        }
        f.i16(self.scalel);
        f.i16(self.scalco);
        for v in [self.sx, self.sy, self.gx, self.gy] {
            f.i32(v);
        }
        for v in [
            self.counit, self.wevel, self.swevel, self.sut, self.gut, self.sstat, self.gstat,
            self.tstat, self.laga, self.lagb, self.delrt, self.muts, self.mute,
        ] {
            f.i16(v);
        }
        f.u16(self.ns);
        f.u16(self.dt);
        for v in [
            self.gain, self.igc, self.igi, self.corr, self.sfs, self.sfe, self.slen, self.styp,
            self.stas, self.stae, self.tatyp, self.afilf, self.afils, self.nofilf, self.nofils,
            self.lcf, self.hcf, self.lcs, self.hcs, self.year, self.day, self.hour, self.minute,
            self.sec, self.timbas, self.trwf, self.grnors, self.grnofr, self.grnlof, self.gaps,
            self.otrav,
        ] {
            f.i16(v);
        }
        for v in [self.d1, self.f1, self.d2, self.f2, self.ungpow, self.unscale] {
            f.f32(v);
        }
        f.i32(self.ntr);
        f.i16(self.mark);
        f.i16(self.shortpad);
        for &v in &self.unass {
            f.i16(v);
        }
    }
}

/// A SEG-Y/SU trace: header plus `header.ns` samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegyTrace {
    pub header: TraceHeader,
    pub data: Vec<f32>,
}

impl SegyTrace {
    /// Encode as the writer does: big-endian header, big-endian samples.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = codec::encode_record(&self.header, HEADER_BYTE_ORDER);
        let mut data = FieldWriter::with_capacity(WRITE_DATA_BYTE_ORDER, self.data.len() * 4);
        codec::encode_f32_array(&mut data, &self.data);
        out.extend_from_slice(&data.into_inner());
        out
    }
}

impl fmt::Display for SegyTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        write!(
            f,
            "fldr {} | tracf {} | ns {} | dt {} us | sx {} | gx {} | offset {}",
            h.fldr, h.tracf, h.ns, h.dt, h.sx, h.gx, h.offset
        )
    }
}

/// Iterator over the traces of an SU stream.
///
/// Stops cleanly when the stream ends exactly on a trace boundary. A
/// decode error is yielded once, after which iteration stops.
pub struct SuReader<R> {
    reader: R,
    index: usize,
    done: bool,
}

impl<R: Read> SuReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            index: 0,
            done: false,
        }
    }

    fn read_trace(&mut self) -> Result<Option<SegyTrace>> {
        let Some(header) =
            codec::read_next_record::<TraceHeader, _>(&mut self.reader, HEADER_BYTE_ORDER)?
        else {
            return Ok(None);
        };
        let data =
            codec::read_f32_array(&mut self.reader, READ_DATA_BYTE_ORDER, header.ns as usize)?;
        Ok(Some(SegyTrace { header, data }))
    }
}

impl<R: Read> Iterator for SuReader<R> {
    type Item = Result<SegyTrace>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_trace() {
            Ok(Some(trace)) => {
                self.index += 1;
                Some(Ok(trace))
            }
            Ok(None) => {
                debug!(traces = self.index, "end of SU stream");
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode every trace of an SU stream.
pub fn read_su<R: Read>(reader: R) -> Result<Vec<SegyTrace>> {
    SuReader::new(reader).collect()
}

/// Decode every trace of the SU file at `path`.
pub fn read_su_file(path: impl AsRef<Path>) -> Result<Vec<SegyTrace>> {
    let file = File::open(path.as_ref())?;
    read_su(BufReader::new(file))
}

/// Write traces in input order and return the number of bytes written.
///
/// A trace whose sample count differs from `header.ns` is rejected before
/// any of its bytes are written.
pub fn write_su<W: Write>(writer: &mut W, traces: &[SegyTrace]) -> Result<usize> {
    let mut written = 0;
    for (i, trace) in traces.iter().enumerate() {
        if trace.data.len() != trace.header.ns as usize {
            return Err(SegError::Encode(format!(
                "trace {i}: {} samples but ns {}",
                trace.data.len(),
                trace.header.ns
            )));
        }
        written += codec::write_record(writer, HEADER_BYTE_ORDER, &trace.header)?;
        written += codec::write_f32_array(writer, WRITE_DATA_BYTE_ORDER, &trace.data)?;
    }
    debug!(traces = traces.len(), bytes = written, "wrote SU stream");
    Ok(written)
}

/// Create (or truncate) the file at `path` and write `traces` to it.
pub fn write_su_file(path: impl AsRef<Path>, traces: &[SegyTrace]) -> Result<usize> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    let written = write_su(&mut writer, traces)?;
    writer.flush()?;
    Ok(written)
}
