//! Batched MTB readers
//!
//! Readers decode exactly `nz` records. A data section shorter than the
//! header claims surfaces as an `UnexpectedEof` I/O error.

use crate::{Error, Result};
use mtb_core::format::constants::BUF_RECORDS;
use mtb_core::{
    check_compatible, decode_batch, Complex, MatrixElement, MtbHeader, Pattern, Triplet, ValueEncoding,
    Width,
};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Streaming reader over an MTB byte source
pub struct MtbReader<R: Read> {
    inner: R,
    header: MtbHeader,
    encoding: ValueEncoding,
    batch_records: usize,
    remaining: u64,
    buffer: Vec<u8>,
}

impl<R: Read> MtbReader<R> {
    /// Read and validate the header
    pub fn new(mut inner: R) -> Result<Self> {
        let mut header_bytes = [0u8; MtbHeader::SIZE];
        inner.read_exact(&mut header_bytes)?;
        let header = MtbHeader::from_bytes(&header_bytes)?;

        let matrix_type = header.matrix_type()?;
        if !matrix_type.is_sparse() {
            return Err(Error::unsupported(format!("{matrix_type} MTB files")));
        }
        let encoding = header.value_encoding()?;

        Ok(Self {
            inner,
            header,
            encoding,
            batch_records: BUF_RECORDS,
            remaining: header.nz,
            buffer: Vec::new(),
        })
    }

    /// Set the number of records decoded per bulk read
    pub fn with_batch_records(mut self, batch_records: usize) -> Self {
        self.batch_records = batch_records.max(1);
        self
    }

    pub fn header(&self) -> &MtbHeader {
        &self.header
    }

    pub fn encoding(&self) -> ValueEncoding {
        self.encoding
    }

    /// Records not yet read
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Decode the next batch, appending to `out`
    ///
    /// Returns the number of records decoded, zero once all `nz` are read.
    pub fn read_batch<T: MatrixElement>(&mut self, out: &mut Vec<Triplet<T>>) -> Result<usize> {
        check_compatible::<T>(self.encoding)?;

        let count = self.remaining.min(self.batch_records as u64) as usize;
        if count == 0 {
            return Ok(0);
        }

        // The buffer grows only with bytes actually read
        let expected = count * self.encoding.record_size();
        self.buffer.clear();
        self.inner
            .by_ref()
            .take(expected as u64)
            .read_to_end(&mut self.buffer)?;
        if self.buffer.len() < expected {
            return Err(Error::truncated(format!(
                "data section ends after {} of {expected} bytes in a batch of {count} records",
                self.buffer.len()
            )));
        }
        decode_batch(&self.buffer, self.encoding, out)?;

        self.remaining -= count as u64;
        Ok(count)
    }

    /// Decode every remaining record
    pub fn read_all<T: MatrixElement>(mut self) -> Result<Vec<Triplet<T>>> {
        let mut triplets = Vec::new();
        while self.read_batch(&mut triplets)? > 0 {}
        Ok(triplets)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Open an MTB file for batched reading
pub fn open_mtb(path: impl AsRef<Path>) -> Result<MtbReader<File>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let file_len = file.metadata()?.len();

    let reader = MtbReader::new(file)?;
    let required = reader
        .header
        .data_size()
        .and_then(|data| data.checked_add(MtbHeader::SIZE as u64))
        .ok_or_else(|| Error::truncated(format!("record count {} overflows", reader.header.nz)))?;
    if file_len < required {
        return Err(Error::truncated(format!(
            "{} declares {} records ({required} bytes) but the file holds {file_len} bytes",
            path.display(),
            reader.header.nz
        )));
    }
    Ok(reader)
}

/// Read only the header of an MTB file
pub fn read_header(path: impl AsRef<Path>) -> Result<MtbHeader> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bytes = [0u8; MtbHeader::SIZE];
    file.read_exact(&mut bytes)?;
    Ok(MtbHeader::from_bytes(&bytes)?)
}

/// Read a whole MTB file into memory as `T`
pub fn read_mtb<T: MatrixElement>(path: impl AsRef<Path>) -> Result<(MtbHeader, Vec<Triplet<T>>)> {
    let reader = open_mtb(path)?;
    let header = *reader.header();
    Ok((header, reader.read_all()?))
}

/// Triplets in the natural element type of a stored encoding
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "triplets", rename_all = "snake_case"))]
pub enum TripletBuffer {
    Pattern(Vec<Triplet<Pattern>>),
    I32(Vec<Triplet<i32>>),
    I64(Vec<Triplet<i64>>),
    F32(Vec<Triplet<f32>>),
    F64(Vec<Triplet<f64>>),
    ComplexF32(Vec<Triplet<Complex<f32>>>),
    ComplexF64(Vec<Triplet<Complex<f64>>>),
}

impl TripletBuffer {
    /// Read every remaining record from `reader` into the matching variant
    pub fn read_from<R: Read>(reader: MtbReader<R>) -> Result<Self> {
        Ok(match reader.encoding() {
            ValueEncoding::Pattern => TripletBuffer::Pattern(reader.read_all()?),
            ValueEncoding::Integer(Width::Four) => TripletBuffer::I32(reader.read_all()?),
            ValueEncoding::Integer(Width::Eight) => TripletBuffer::I64(reader.read_all()?),
            ValueEncoding::Real(Width::Four) => TripletBuffer::F32(reader.read_all()?),
            ValueEncoding::Real(Width::Eight) => TripletBuffer::F64(reader.read_all()?),
            ValueEncoding::Complex(Width::Four) => TripletBuffer::ComplexF32(reader.read_all()?),
            ValueEncoding::Complex(Width::Eight) => TripletBuffer::ComplexF64(reader.read_all()?),
        })
    }

    pub fn len(&self) -> usize {
        match self {
            TripletBuffer::Pattern(t) => t.len(),
            TripletBuffer::I32(t) => t.len(),
            TripletBuffer::I64(t) => t.len(),
            TripletBuffer::F32(t) => t.len(),
            TripletBuffer::F64(t) => t.len(),
            TripletBuffer::ComplexF32(t) => t.len(),
            TripletBuffer::ComplexF64(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions and formatted values, in stored order
    pub fn entries(&self) -> Box<dyn Iterator<Item = (i64, i64, String)> + '_> {
        fn display<T: ToString>(triplets: &[Triplet<T>]) -> Box<dyn Iterator<Item = (i64, i64, String)> + '_> {
            Box::new(triplets.iter().map(|t| (t.row, t.col, t.val.to_string())))
        }

        match self {
            TripletBuffer::Pattern(t) => display(t),
            TripletBuffer::I32(t) => display(t),
            TripletBuffer::I64(t) => display(t),
            TripletBuffer::F32(t) => display(t),
            TripletBuffer::F64(t) => display(t),
            TripletBuffer::ComplexF32(t) => display(t),
            TripletBuffer::ComplexF64(t) => display(t),
        }
    }
}

/// Read a whole MTB file without knowing its element type
pub fn read_mtb_dynamic(path: impl AsRef<Path>) -> Result<(MtbHeader, TripletBuffer)> {
    let reader = open_mtb(path)?;
    let header = *reader.header();
    Ok((header, TripletBuffer::read_from(reader)?))
}
