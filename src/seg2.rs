//! Decode and encode SEG2 files.
//!
//! A SEG2 file starts with a 32-byte little-endian [`FileHeader`], followed
//! by a block of `NumTrcs` absolute trace pointers and the file descriptor
//! strings. Each pointer locates a trace descriptor: a 32-byte
//! [`TraceBlockHeader`], a list of length-prefixed `"KEY value ..."` strings
//! terminated by a zero prefix, and the sample data at `pointer + BlkSiz`.
//!
//! Use [`read_seg2`] to decode a whole file, or [`Seg2Reader`] to read
//! traces by index.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::codec::{self, FieldReader, FieldWriter, FixedRecord};
use crate::types::{ByteOrder, DataFormat};
use crate::{Result, SegError};

/// File descriptor block identifier (`FDID`).
pub const SEG2_MAGIC: u16 = 0x3A55;

/// Trace descriptor block identifier (`TrcID`).
pub const TRACE_BLOCK_ID: u16 = 0x4422;

/// String header names every SEG2 writer is expected to provide.
///
/// Consulted only for reporting; the parser accepts any key.
pub const SUGGESTED_HEADERS: [&str; 5] = [
    "RECEIVER_LOCATION",
    "SAMPLE_INTERVAL",
    "SOURCE_LOCATION",
    "SHOT_SEQUENCE_NUMBER",
    "DELAY",
];

/// String headers of a trace or file: key to whitespace-split value tokens.
pub type StringHeaders = BTreeMap<String, Vec<String>>;

/// The 32-byte SEG2 file descriptor header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub fdid: u16,
    pub rev_num: u16,
    /// Size of the trace pointer block in bytes.
    pub trc_ptr_len: u16,
    pub num_trcs: u16,
    pub str_term_len: u8,
    pub str_term: [u8; 2],
    pub line_term_len: u8,
    pub line_term: [u8; 2],
    pub reserved: [u8; 18],
}

impl FileHeader {
    /// Header for a file with `num_trcs` traces, NUL string terminator and
    /// LF line terminator.
    pub fn new(num_trcs: u16) -> Self {
        Self {
            fdid: SEG2_MAGIC,
            rev_num: 1,
            trc_ptr_len: num_trcs.saturating_mul(4),
            num_trcs,
            str_term_len: 1,
            str_term: [0, 0],
            line_term_len: 1,
            line_term: [b'\n', 0],
            reserved: [0; 18],
        }
    }

    /// First byte of the string terminator; the only one stripped from entries.
    pub fn string_terminator(&self) -> u8 {
        self.str_term[0]
    }

    fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.str_term_len) {
            return Err(SegError::InvalidTerminatorLength {
                field: "string terminator",
                len: self.str_term_len,
            });
        }
        if !(1..=2).contains(&self.line_term_len) {
            return Err(SegError::InvalidTerminatorLength {
                field: "line terminator",
                len: self.line_term_len,
            });
        }
        Ok(())
    }
}

impl FixedRecord for FileHeader {
    const SIZE: usize = 32;
    const NAME: &'static str = "SEG2 file header";

    fn decode_fields(fields: &mut FieldReader<'_>) -> Self {
        Self {
            fdid: fields.u16(),
            rev_num: fields.u16(),
            trc_ptr_len: fields.u16(),
            num_trcs: fields.u16(),
            str_term_len: fields.u8(),
            str_term: fields.bytes(),
            line_term_len: fields.u8(),
            line_term: fields.bytes(),
            reserved: fields.bytes(),
        }
    }

    fn encode_fields(&self, fields: &mut FieldWriter) {
        fields.u16(self.fdid);
        fields.u16(self.rev_num);
        fields.u16(self.trc_ptr_len);
        fields.u16(self.num_trcs);
        fields.u8(self.str_term_len);
        fields.bytes(&self.str_term);
        fields.u8(self.line_term_len);
        fields.bytes(&self.line_term);
        fields.bytes(&self.reserved);
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SEG2 rev {} | FDID {:#06X} | {} traces | pointer block {} bytes",
            self.rev_num, self.fdid, self.num_trcs, self.trc_ptr_len
        )
    }
}

/// The 32-byte header at the start of every trace descriptor block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceBlockHeader {
    pub trc_id: u16,
    /// Size of this header plus the string headers, in bytes. Samples start
    /// at `pointer + blk_siz`.
    pub blk_siz: u16,
    pub data_blk_siz: u32,
    pub n_samps: u32,
    pub data_format: u8,
    pub reserved: [u8; 19],
}

impl TraceBlockHeader {
    pub fn data_format(&self) -> DataFormat {
        DataFormat::from_code(self.data_format)
    }
}

impl Default for TraceBlockHeader {
    fn default() -> Self {
        Self {
            trc_id: TRACE_BLOCK_ID,
            blk_siz: 0,
            data_blk_siz: 0,
            n_samps: 0,
            data_format: DataFormat::Float32.to_code(),
            reserved: [0; 19],
        }
    }
}

impl FixedRecord for TraceBlockHeader {
    const SIZE: usize = 32;
    const NAME: &'static str = "SEG2 trace block header";

    fn decode_fields(fields: &mut FieldReader<'_>) -> Self {
        Self {
            trc_id: fields.u16(),
            blk_siz: fields.u16(),
            data_blk_siz: fields.u32(),
            n_samps: fields.u32(),
            data_format: fields.u8(),
            reserved: fields.bytes(),
        }
    }

    fn encode_fields(&self, fields: &mut FieldWriter) {
        fields.u16(self.trc_id);
        fields.u16(self.blk_siz);
        fields.u32(self.data_blk_siz);
        fields.u32(self.n_samps);
        fields.u8(self.data_format);
        fields.bytes(&self.reserved);
    }
}

/// A decoded SEG2 trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Seg2Trace {
    pub block_header: TraceBlockHeader,
    pub headers: StringHeaders,
    pub samples: Vec<f32>,
}

impl Seg2Trace {
    /// Create a trace holding `samples` and no string headers.
    pub fn new(samples: Vec<f32>) -> Self {
        let n = samples.len() as u32;
        Self {
            block_header: TraceBlockHeader {
                n_samps: n,
                data_blk_siz: n.saturating_mul(4),
                ..TraceBlockHeader::default()
            },
            headers: StringHeaders::new(),
            samples,
        }
    }

    /// Set a string header, replacing any previous value for `key`.
    pub fn with_header(mut self, key: &str, values: &[&str]) -> Self {
        self.headers
            .insert(key.into(), values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn header(&self, key: &str) -> Option<&[String]> {
        self.headers.get(key).map(Vec::as_slice)
    }

    /// First value token of `key`, if the key is present and has one.
    pub fn first_value(&self, key: &str) -> Option<&str> {
        self.headers
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Names from [`SUGGESTED_HEADERS`] this trace does not carry.
    pub fn missing_suggested_headers(&self) -> Vec<&'static str> {
        SUGGESTED_HEADERS
            .iter()
            .copied()
            .filter(|key| !self.headers.contains_key(*key))
            .collect()
    }
}

impl fmt::Display for Seg2Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trace {:#06X} | {} samples ({}) | {} string headers",
            self.block_header.trc_id,
            self.samples.len(),
            self.block_header.data_format(),
            self.headers.len()
        )
    }
}

/// Split one string-header payload into key and value tokens.
///
/// One trailing `terminator` byte is removed, then the text is split on
/// single spaces. Returns `None` when the key is empty.
pub fn parse_string_entry(payload: &[u8], terminator: u8) -> Option<(String, Vec<String>)> {
    let payload = payload.strip_suffix(&[terminator]).unwrap_or(payload);
    let text = String::from_utf8_lossy(payload);
    let mut tokens = text.split(' ');
    let key = tokens.next().filter(|k| !k.is_empty())?;
    Some((key.to_string(), tokens.map(str::to_string).collect()))
}

/// Random-access SEG2 reader over a seekable stream.
pub struct Seg2Reader<R> {
    reader: R,
    header: FileHeader,
    pointers: Vec<u32>,
    len: u64,
}

impl<R: Read + Seek> Seg2Reader<R> {
    /// Decode the file header and trace pointer block.
    pub fn open(mut reader: R) -> Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header: FileHeader = codec::read_record(&mut reader, ByteOrder::Little)?;
        header.validate()?;
        if header.fdid != SEG2_MAGIC {
            warn!(fdid = header.fdid, "unexpected SEG2 file descriptor id");
        }

        let count = header.num_trcs as usize;
        check_span(FileHeader::SIZE as u64, count as u64 * 4, len)?;
        let mut block = vec![0u8; count * 4];
        reader.read_exact(&mut block)?;
        let mut fields = FieldReader::new(&block, ByteOrder::Little);
        let pointers: Vec<u32> = (0..count).map(|_| fields.u32()).collect();

        debug!(
            traces = count,
            revision = header.rev_num,
            bytes = len,
            "opened SEG2 stream"
        );

        Ok(Self {
            reader,
            header,
            pointers,
            len,
        })
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.header
    }

    /// Absolute trace offsets, in file order.
    pub fn pointers(&self) -> &[u32] {
        &self.pointers
    }

    pub fn trace_count(&self) -> usize {
        self.pointers.len()
    }

    /// Decode the file descriptor strings following the trace pointer block.
    pub fn file_strings(&mut self) -> Result<StringHeaders> {
        let start = FileHeader::SIZE as u64 + self.header.trc_ptr_len as u64;
        self.reader.seek(SeekFrom::Start(start))?;
        read_string_list(&mut self.reader, self.header.string_terminator(), self.len)
    }

    /// Decode the trace at `index` in pointer-block order.
    pub fn read_trace(&mut self, index: usize) -> Result<Seg2Trace> {
        let Some(&ptr) = self.pointers.get(index) else {
            return Err(SegError::NoSuchTrace {
                index,
                count: self.pointers.len(),
            });
        };
        let ptr = ptr as u64;

        check_span(ptr, TraceBlockHeader::SIZE as u64, self.len)?;
        self.reader.seek(SeekFrom::Start(ptr))?;
        let block_header: TraceBlockHeader =
            codec::read_record(&mut self.reader, ByteOrder::Little)?;

        let headers =
            read_string_list(&mut self.reader, self.header.string_terminator(), self.len)?;

        // Samples sit at pointer + BlkSiz no matter where the strings ended.
        let data_start = ptr + block_header.blk_siz as u64;
        let count = block_header.n_samps as usize;
        check_span(data_start, count as u64 * 4, self.len)?;
        self.reader.seek(SeekFrom::Start(data_start))?;
        let samples = codec::read_f32_array(&mut self.reader, ByteOrder::Little, count)?;

        debug!(
            index,
            pointer = ptr,
            blk_siz = block_header.blk_siz,
            samples = count,
            headers = headers.len(),
            "decoded SEG2 trace"
        );

        Ok(Seg2Trace {
            block_header,
            headers,
            samples,
        })
    }

    /// Decode every trace in pointer-block order.
    pub fn read_all(&mut self) -> Result<Vec<Seg2Trace>> {
        (0..self.trace_count()).map(|i| self.read_trace(i)).collect()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Decode all traces of a SEG2 stream.
pub fn read_seg2<R: Read + Seek>(reader: R) -> Result<Vec<Seg2Trace>> {
    Seg2Reader::open(reader)?.read_all()
}

/// Decode all traces of the SEG2 file at `path`.
pub fn read_seg2_file(path: impl AsRef<Path>) -> Result<Vec<Seg2Trace>> {
    let file = File::open(path.as_ref())?;
    read_seg2(BufReader::new(file))
}

fn check_span(offset: u64, len: u64, available: u64) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= available => Ok(()),
        _ => Err(SegError::PastEnd {
            offset,
            len,
            available,
        }),
    }
}

/// Read length-prefixed string entries up to and including the zero prefix.
fn read_string_list<R: Read + Seek>(
    reader: &mut R,
    terminator: u8,
    available: u64,
) -> Result<StringHeaders> {
    let mut headers = StringHeaders::new();
    loop {
        let pos = reader.stream_position()?;
        // A list that runs into end-of-stream has no terminating zero prefix.
        check_span(pos, 2, available)?;
        let mut prefix = [0u8; 2];
        reader.read_exact(&mut prefix)?;
        let entry_len = u16::from_le_bytes(prefix);
        if entry_len == 0 {
            break;
        }
        if entry_len <= 2 {
            warn!(offset = pos, entry_len, "skipping empty string header entry");
            continue;
        }

        let payload_len = (entry_len - 2) as u64;
        check_span(pos + 2, payload_len, available)?;
        let mut payload = vec![0u8; payload_len as usize];
        reader.read_exact(&mut payload)?;

        match parse_string_entry(&payload, terminator) {
            Some((key, values)) => {
                trace!(key = %key, ?values, "string header");
                headers.insert(key, values);
            }
            None => warn!(offset = pos, "skipping string header entry with empty key"),
        }
    }
    Ok(headers)
}

/// Encode traces as a SEG2 file and return the number of bytes written.
///
/// Every trace is written as 32-bit little-endian floats; the incoming
/// block headers are recomputed from the trace contents.
pub fn write_seg2<W: Write>(
    writer: &mut W,
    file_strings: &StringHeaders,
    traces: &[Seg2Trace],
) -> Result<usize> {
    let num_trcs = u16::try_from(traces.len())
        .ok()
        .filter(|n| n.checked_mul(4).is_some())
        .ok_or_else(|| SegError::Encode(format!("too many traces: {}", traces.len())))?;
    let header = FileHeader::new(num_trcs);
    let terminator = header.string_terminator();

    let file_strings = encode_string_list(file_strings, terminator)?;
    let mut offset = FileHeader::SIZE + traces.len() * 4 + file_strings.len();

    let mut pointers = FieldWriter::new(ByteOrder::Little);
    let mut blocks = FieldWriter::new(ByteOrder::Little);
    for (i, trace) in traces.iter().enumerate() {
        let mut strings = encode_string_list(&trace.headers, terminator)?;
        let unpadded = TraceBlockHeader::SIZE + strings.len();
        strings.resize(strings.len() + (4 - unpadded % 4) % 4, 0);

        let blk_siz = u16::try_from(TraceBlockHeader::SIZE + strings.len()).map_err(|_| {
            SegError::Encode(format!("trace {i}: string headers exceed block size limit"))
        })?;
        let n_samps = u32::try_from(trace.samples.len())
            .map_err(|_| SegError::Encode(format!("trace {i}: too many samples")))?;
        let pointer = u32::try_from(offset)
            .map_err(|_| SegError::Encode(format!("trace {i}: offset {offset} exceeds u32")))?;

        let block_header = TraceBlockHeader {
            blk_siz,
            n_samps,
            data_blk_siz: n_samps.saturating_mul(4),
            ..TraceBlockHeader::default()
        };
        block_header.encode_fields(&mut blocks);
        blocks.bytes(&strings);
        codec::encode_f32_array(&mut blocks, &trace.samples);

        pointers.u32(pointer);
        offset += blk_siz as usize + trace.samples.len() * 4;
    }

    let mut written = codec::write_record(writer, ByteOrder::Little, &header)?;
    let pointers = pointers.into_inner();
    writer.write_all(&pointers)?;
    writer.write_all(&file_strings)?;
    let blocks = blocks.into_inner();
    writer.write_all(&blocks)?;
    written += pointers.len() + file_strings.len() + blocks.len();

    debug!(traces = traces.len(), bytes = written, "wrote SEG2 stream");
    Ok(written)
}

fn encode_string_list(headers: &StringHeaders, terminator: u8) -> Result<Vec<u8>> {
    let mut out = FieldWriter::new(ByteOrder::Little);
    for (key, values) in headers {
        let mut text = key.clone();
        for v in values {
            text.push(' ');
            text.push_str(v);
        }
        let entry_len = u16::try_from(text.len() + 3)
            .map_err(|_| SegError::Encode(format!("string header {key} too long")))?;
        out.u16(entry_len);
        out.bytes(text.as_bytes());
        out.u8(terminator);
    }
    out.u16(0);
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn entry(text: &str) -> Vec<u8> {
        let mut e = ((text.len() + 3) as u16).to_le_bytes().to_vec();
        e.extend_from_slice(text.as_bytes());
        e.push(0);
        e
    }

    struct RawTrace {
        entries: Vec<Vec<u8>>,
        samples: Vec<f32>,
        /// Filler between the string list and the samples.
        pad: usize,
    }

    fn raw_trace(entries: Vec<Vec<u8>>, samples: Vec<f32>) -> RawTrace {
        RawTrace {
            entries,
            samples,
            pad: 0,
        }
    }

    fn raw_file(traces: &[RawTrace]) -> Vec<u8> {
        let n = traces.len();
        let mut out = Vec::new();
        out.extend_from_slice(&SEG2_MAGIC.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&((n * 4) as u16).to_le_bytes());
        out.extend_from_slice(&(n as u16).to_le_bytes());
        out.extend_from_slice(&[1, 0, 0, 1, b'\n', 0]);
        out.extend_from_slice(&[0u8; 18]);

        let ptr_pos = out.len();
        out.resize(ptr_pos + n * 4, 0);

        for (i, t) in traces.iter().enumerate() {
            let ptr = out.len() as u32;
            out[ptr_pos + i * 4..ptr_pos + i * 4 + 4].copy_from_slice(&ptr.to_le_bytes());

            let mut strings = t.entries.concat();
            strings.extend_from_slice(&[0, 0]);
            let blk = 32 + strings.len() + t.pad;

            out.extend_from_slice(&TRACE_BLOCK_ID.to_le_bytes());
            out.extend_from_slice(&(blk as u16).to_le_bytes());
            out.extend_from_slice(&((t.samples.len() * 4) as u32).to_le_bytes());
            out.extend_from_slice(&(t.samples.len() as u32).to_le_bytes());
            out.push(4);
            out.extend_from_slice(&[0u8; 19]);
            out.extend_from_slice(&strings);
            out.extend(std::iter::repeat_n(0xAA, t.pad));
            for s in &t.samples {
                out.extend_from_slice(&s.to_le_bytes());
            }
        }
        out
    }

    #[test]
    fn test_header_layout_sizes() {
        assert_eq!(
            codec::encode_record(&FileHeader::new(3), ByteOrder::Little).len(),
            32
        );
        assert_eq!(
            codec::encode_record(&TraceBlockHeader::default(), ByteOrder::Little).len(),
            32
        );
    }

    #[test]
    fn test_zero_trace_file() {
        let data = raw_file(&[]);
        let traces = read_seg2(Cursor::new(data)).unwrap();
        assert!(traces.is_empty());
    }

    #[test]
    fn test_trace_count_and_sample_counts() {
        let data = raw_file(&[
            raw_trace(vec![entry("CHANNEL_NUMBER 1")], vec![1.0, 2.0, 3.0]),
            raw_trace(vec![entry("CHANNEL_NUMBER 2")], vec![4.0; 10]),
        ]);
        let mut reader = Seg2Reader::open(Cursor::new(data)).unwrap();
        assert_eq!(reader.file_header().num_trcs, 2);

        let traces = reader.read_all().unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].samples, vec![1.0, 2.0, 3.0]);
        assert_eq!(traces[0].block_header.n_samps, 3);
        assert_eq!(traces[1].samples.len(), 10);
        assert_eq!(traces[1].block_header.n_samps, 10);
        assert_eq!(traces[1].first_value("CHANNEL_NUMBER"), Some("2"));
    }

    #[test]
    fn test_output_order_follows_pointer_block() {
        let mut data = raw_file(&[
            raw_trace(vec![entry("CHANNEL_NUMBER 1")], vec![1.0]),
            raw_trace(vec![entry("CHANNEL_NUMBER 2")], vec![2.0]),
        ]);
        // Swap the two pointers
        let (a, b) = (32, 36);
        let first: [u8; 4] = data[a..a + 4].try_into().unwrap();
        let second: [u8; 4] = data[b..b + 4].try_into().unwrap();
        data[a..a + 4].copy_from_slice(&second);
        data[b..b + 4].copy_from_slice(&first);

        let traces = read_seg2(Cursor::new(data)).unwrap();
        assert_eq!(traces[0].first_value("CHANNEL_NUMBER"), Some("2"));
        assert_eq!(traces[1].first_value("CHANNEL_NUMBER"), Some("1"));
    }

    #[test]
    fn test_sample_interval_string_header() {
        let data = raw_file(&[raw_trace(vec![entry("SAMPLE_INTERVAL 0.001")], vec![0.0])]);
        let traces = read_seg2(Cursor::new(data)).unwrap();
        assert_eq!(
            traces[0].header("SAMPLE_INTERVAL"),
            Some(&["0.001".to_string()][..])
        );
    }

    #[test]
    fn test_multi_token_and_keyless_values() {
        let data = raw_file(&[raw_trace(
            vec![entry("ACQUISITION_DATE 12 MAR 2019"), entry("NOTE")],
            vec![],
        )]);
        let traces = read_seg2(Cursor::new(data)).unwrap();
        assert_eq!(
            traces[0].header("ACQUISITION_DATE").unwrap(),
            &["12", "MAR", "2019"]
        );
        assert_eq!(traces[0].header("NOTE").unwrap(), &[] as &[String]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let data = raw_file(&[raw_trace(
            vec![
                1u16.to_le_bytes().to_vec(),
                2u16.to_le_bytes().to_vec(),
                entry(" leading space"),
                entry("DELAY 0.0"),
            ],
            vec![5.0, 6.0],
        )]);
        let traces = read_seg2(Cursor::new(data)).unwrap();
        assert_eq!(traces[0].headers.len(), 1);
        assert_eq!(traces[0].first_value("DELAY"), Some("0.0"));
        assert_eq!(traces[0].samples, vec![5.0, 6.0]);
    }

    #[test]
    fn test_samples_start_at_block_size() {
        let mut t = raw_trace(vec![entry("DELAY 0")], vec![7.5, -1.25]);
        t.pad = 20;
        let data = raw_file(&[t]);
        let traces = read_seg2(Cursor::new(data)).unwrap();
        assert_eq!(traces[0].samples, vec![7.5, -1.25]);
    }

    #[test]
    fn test_strip_single_trailing_terminator() {
        let (key, values) = parse_string_entry(b"KEY a\0\0", 0).unwrap();
        assert_eq!(key, "KEY");
        assert_eq!(values, vec!["a\0".to_string()]);

        let (_, values) = parse_string_entry(b"KEY  b", 0).unwrap();
        assert_eq!(values, vec!["".to_string(), "b".to_string()]);

        assert!(parse_string_entry(b"\0", 0).is_none());
    }

    #[test]
    fn test_invalid_terminator_length() {
        let mut data = raw_file(&[]);
        data[8] = 3;
        match Seg2Reader::open(Cursor::new(data)) {
            Err(SegError::InvalidTerminatorLength { len, .. }) => assert_eq!(len, 3),
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_invalid_line_terminator_length() {
        let mut data = raw_file(&[]);
        data[11] = 3;
        match Seg2Reader::open(Cursor::new(data)) {
            Err(SegError::InvalidTerminatorLength { field, len }) => {
                assert_eq!(field, "line terminator");
                assert_eq!(len, 3);
            }
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_unknown_magic_still_decodes() {
        let mut data = raw_file(&[raw_trace(vec![entry("DELAY 0")], vec![1.0])]);
        data[0..2].copy_from_slice(&0x1234u16.to_le_bytes());
        let traces = read_seg2(Cursor::new(data)).unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].samples, vec![1.0]);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let data = raw_file(&[raw_trace(vec![entry("K a"), entry("K b")], vec![])]);
        let traces = read_seg2(Cursor::new(data)).unwrap();
        assert_eq!(traces[0].headers.len(), 1);
        assert_eq!(traces[0].header("K").unwrap(), &["b"]);
    }

    #[test]
    fn test_truncated_file_header_is_io_error() {
        let data = raw_file(&[]);
        let err = read_seg2(Cursor::new(&data[..20])).unwrap_err();
        assert!(err.is_io(), "{err}");
    }

    #[test]
    fn test_sample_count_past_end() {
        let mut data = raw_file(&[raw_trace(vec![], vec![1.0, 2.0])]);
        data.truncate(data.len() - 4);
        let err = read_seg2(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, SegError::PastEnd { len: 8, .. }), "{err}");
    }

    #[test]
    fn test_length_prefix_past_end() {
        let mut data = raw_file(&[]);
        data[6..8].copy_from_slice(&1u16.to_le_bytes());
        data[2..4].copy_from_slice(&4u16.to_le_bytes());
        data.extend_from_slice(&36u32.to_le_bytes());
        // Trace block header, then an entry claiming 200 bytes
        data.extend_from_slice(&TRACE_BLOCK_ID.to_le_bytes());
        data.extend_from_slice(&[0u8; 30]);
        data.extend_from_slice(&200u16.to_le_bytes());
        data.extend_from_slice(b"KEY");

        let err = read_seg2(Cursor::new(data)).unwrap_err();
        assert!(err.is_format(), "{err}");
    }

    #[test]
    fn test_unterminated_string_list() {
        let mut data = raw_file(&[raw_trace(vec![entry("DELAY 0")], vec![])]);
        // Drop the zero terminator
        data.truncate(data.len() - 2);
        let err = read_seg2(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, SegError::PastEnd { len: 2, .. }), "{err}");
    }

    #[test]
    fn test_read_trace_out_of_range() {
        let data = raw_file(&[raw_trace(vec![], vec![1.0])]);
        let mut reader = Seg2Reader::open(Cursor::new(data)).unwrap();
        assert_eq!(reader.pointers(), &[36]);
        assert!(reader.read_trace(0).is_ok());
        assert!(matches!(
            reader.read_trace(1),
            Err(SegError::NoSuchTrace { index: 1, count: 1 })
        ));

        // The stream is handed back intact
        let inner = reader.into_inner();
        assert_eq!(inner.get_ref().len(), 36 + 32 + 2 + 4);
    }

    #[test]
    fn test_write_then_read() {
        let traces = vec![
            Seg2Trace::new(vec![1.0, 2.0, 3.0])
                .with_header("SAMPLE_INTERVAL", &["0.00025"])
                .with_header("CHANNEL_NUMBER", &["1"]),
            Seg2Trace::new(vec![-4.0; 5]).with_header("SOURCE_LOCATION", &["10.5", "0", "0"]),
            Seg2Trace::new(vec![]),
        ];
        let mut file_strings = StringHeaders::new();
        file_strings.insert("ACQUISITION_DATE".into(), vec!["01/JAN/2020".into()]);

        let mut out = Vec::new();
        let n = write_seg2(&mut out, &file_strings, &traces).unwrap();
        assert_eq!(n, out.len());

        let mut reader = Seg2Reader::open(Cursor::new(out)).unwrap();
        assert_eq!(reader.file_strings().unwrap(), file_strings);
        let back = reader.read_all().unwrap();
        assert_eq!(back.len(), 3);
        for (a, b) in traces.iter().zip(&back) {
            assert_eq!(a.headers, b.headers);
            assert_eq!(a.samples, b.samples);
            assert_eq!(b.block_header.blk_siz % 4, 0);
            assert_eq!(b.block_header.data_format(), DataFormat::Float32);
        }
    }

    #[test]
    fn test_missing_suggested_headers() {
        let t = Seg2Trace::new(vec![])
            .with_header("SAMPLE_INTERVAL", &["0.001"])
            .with_header("DELAY", &["0"]);
        assert_eq!(
            t.missing_suggested_headers(),
            vec!["RECEIVER_LOCATION", "SOURCE_LOCATION", "SHOT_SEQUENCE_NUMBER"]
        );
    }
}
