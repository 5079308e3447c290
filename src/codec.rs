//! Byte-order aware encoding and decoding of fixed-layout records.
//!
//! Record layouts are declared field by field through [`FixedRecord`]: every
//! field has a fixed width and is read or written in declaration order with
//! the byte order chosen by the caller. Nothing depends on the in-memory
//! layout of Rust structs.

use std::io::{self, Read, Write};

use crate::types::ByteOrder;
use crate::{Result, SegError};

/// A record with a fixed on-disk size, decoded and encoded field by field.
pub trait FixedRecord: Sized {
    /// Size of the encoded record in bytes.
    const SIZE: usize;
    /// Human-readable name used in error messages.
    const NAME: &'static str;

    /// Decode the record from exactly [`Self::SIZE`] bytes.
    fn decode_fields(fields: &mut FieldReader<'_>) -> Self;

    /// Append exactly [`Self::SIZE`] bytes.
    fn encode_fields(&self, fields: &mut FieldWriter);
}

/// Cursor that pulls fixed-width fields out of a byte slice.
pub struct FieldReader<'a> {
    data: &'a [u8],
    offset: usize,
    order: ByteOrder,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            offset: 0,
            order,
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn bytes<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        out
    }

    pub fn u8(&mut self) -> u8 {
        let [b] = self.bytes::<1>();
        b
    }

    pub fn u16(&mut self) -> u16 {
        let bytes = self.bytes::<2>();
        match self.order {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        }
    }

    pub fn i16(&mut self) -> i16 {
        let bytes = self.bytes::<2>();
        match self.order {
            ByteOrder::Big => i16::from_be_bytes(bytes),
            ByteOrder::Little => i16::from_le_bytes(bytes),
        }
    }

    pub fn u32(&mut self) -> u32 {
        let bytes = self.bytes::<4>();
        match self.order {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        }
    }

    pub fn i32(&mut self) -> i32 {
        let bytes = self.bytes::<4>();
        match self.order {
            ByteOrder::Big => i32::from_be_bytes(bytes),
            ByteOrder::Little => i32::from_le_bytes(bytes),
        }
    }

    pub fn f32(&mut self) -> f32 {
        let bytes = self.bytes::<4>();
        match self.order {
            ByteOrder::Big => f32::from_be_bytes(bytes),
            ByteOrder::Little => f32::from_le_bytes(bytes),
        }
    }
}

/// Append-only buffer that writes fixed-width fields in one byte order.
pub struct FieldWriter {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl FieldWriter {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            buf: Vec::new(),
            order,
        }
    }

    pub fn with_capacity(order: ByteOrder, capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        match self.order {
            ByteOrder::Big => self.bytes(&v.to_be_bytes()),
            ByteOrder::Little => self.bytes(&v.to_le_bytes()),
        }
    }

    pub fn i16(&mut self, v: i16) {
        match self.order {
            ByteOrder::Big => self.bytes(&v.to_be_bytes()),
            ByteOrder::Little => self.bytes(&v.to_le_bytes()),
        }
    }

    pub fn u32(&mut self, v: u32) {
        match self.order {
            ByteOrder::Big => self.bytes(&v.to_be_bytes()),
            ByteOrder::Little => self.bytes(&v.to_le_bytes()),
        }
    }

    pub fn i32(&mut self, v: i32) {
        match self.order {
            ByteOrder::Big => self.bytes(&v.to_be_bytes()),
            ByteOrder::Little => self.bytes(&v.to_le_bytes()),
        }
    }

    pub fn f32(&mut self, v: f32) {
        match self.order {
            ByteOrder::Big => self.bytes(&v.to_be_bytes()),
            ByteOrder::Little => self.bytes(&v.to_le_bytes()),
        }
    }
}

/// Decode a record that must be present.
///
/// A short read surfaces as [`SegError::Io`] with `UnexpectedEof`.
pub fn read_record<T: FixedRecord, R: Read>(reader: &mut R, order: ByteOrder) -> Result<T> {
    let mut buf = vec![0u8; T::SIZE];
    reader.read_exact(&mut buf)?;
    Ok(decode_record(&buf, order))
}

/// Decode the next record of a sequence.
///
/// Returns `Ok(None)` when the stream ends before the first byte of the
/// record. A record that starts but ends early is [`SegError::Truncated`].
pub fn read_next_record<T: FixedRecord, R: Read>(
    reader: &mut R,
    order: ByteOrder,
) -> Result<Option<T>> {
    let mut buf = vec![0u8; T::SIZE];
    let n = read_fill(reader, &mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    if n < T::SIZE {
        return Err(SegError::Truncated {
            record: T::NAME,
            expected: T::SIZE,
            actual: n,
        });
    }
    Ok(Some(decode_record(&buf, order)))
}

/// Decode a record from a byte slice of at least `T::SIZE` bytes.
pub fn decode_record<T: FixedRecord>(data: &[u8], order: ByteOrder) -> T {
    let mut fields = FieldReader::new(&data[..T::SIZE], order);
    T::decode_fields(&mut fields)
}

/// Encode a record into a fresh buffer of exactly `T::SIZE` bytes.
pub fn encode_record<T: FixedRecord>(record: &T, order: ByteOrder) -> Vec<u8> {
    let mut fields = FieldWriter::with_capacity(order, T::SIZE);
    record.encode_fields(&mut fields);
    debug_assert_eq!(fields.len(), T::SIZE, "{} layout width", T::NAME);
    fields.into_inner()
}

/// Write a record and return the number of bytes written.
pub fn write_record<T: FixedRecord, W: Write>(
    writer: &mut W,
    order: ByteOrder,
    record: &T,
) -> Result<usize> {
    let buf = encode_record(record, order);
    writer.write_all(&buf)?;
    Ok(buf.len())
}

/// Read `count` 32-bit floats.
///
/// A stream that ends before `count` values is [`SegError::Truncated`].
pub fn read_f32_array<R: Read>(reader: &mut R, order: ByteOrder, count: usize) -> Result<Vec<f32>> {
    let needed = count * 4;
    let mut buf = vec![0u8; needed];
    let n = read_fill(reader, &mut buf)?;
    if n < needed {
        return Err(SegError::Truncated {
            record: "sample data",
            expected: needed,
            actual: n,
        });
    }
    let mut fields = FieldReader::new(&buf, order);
    Ok((0..count).map(|_| fields.f32()).collect())
}

/// Append `samples` as 32-bit floats to `fields`.
pub fn encode_f32_array(fields: &mut FieldWriter, samples: &[f32]) {
    for &v in samples {
        fields.f32(v);
    }
}

/// Write `samples` as 32-bit floats and return the number of bytes written.
pub fn write_f32_array<W: Write>(writer: &mut W, order: ByteOrder, samples: &[f32]) -> Result<usize> {
    let mut fields = FieldWriter::with_capacity(order, samples.len() * 4);
    encode_f32_array(&mut fields, samples);
    let buf = fields.into_inner();
    writer.write_all(&buf)?;
    Ok(buf.len())
}

/// Fill `buf` as far as the stream allows, returning the number of bytes read.
fn read_fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
