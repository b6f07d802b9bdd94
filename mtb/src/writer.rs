//! Batched MTB writer
//!
//! Records are encoded into a reusable byte buffer and flushed with one bulk
//! write per batch.

use crate::{Error, Result};
use mtb_core::format::constants::{BUF_RECORDS, HEADER_SIZE};
use mtb_core::{encode_record, MatrixElement, MatrixType, MtbHeader, Triplet, TripletSink, ValueEncoding};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

/// Writer for the header and data section of an MTB file
pub struct MtbWriter<W: Write> {
    inner: W,
    header: MtbHeader,
    encoding: ValueEncoding,
    buffer: Vec<u8>,
    batch_bytes: usize,
    records: u64,
}

impl<W: Write> MtbWriter<W> {
    /// Write `header` and prepare to append records
    ///
    /// The header's tags must describe a supported sparse encoding.
    pub fn new(mut inner: W, header: MtbHeader) -> Result<Self> {
        let matrix_type = header.matrix_type()?;
        if !matrix_type.is_sparse() {
            return Err(Error::unsupported(format!("cannot write {matrix_type} matrices")));
        }
        let encoding = header.value_encoding()?;

        inner.write_all(&header.to_bytes_array())?;

        Ok(Self {
            inner,
            header,
            encoding,
            buffer: Vec::new(),
            batch_bytes: BUF_RECORDS * encoding.record_size(),
            records: 0,
        })
    }

    /// Set the number of records encoded before each bulk write
    pub fn with_batch_records(mut self, batch_records: usize) -> Self {
        self.batch_bytes = batch_records.max(1).saturating_mul(self.encoding.record_size());
        self
    }

    pub fn header(&self) -> &MtbHeader {
        &self.header
    }

    pub fn encoding(&self) -> ValueEncoding {
        self.encoding
    }

    /// Records written so far, buffered ones included
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Append one record
    pub fn write<T: MatrixElement>(&mut self, triplet: &Triplet<T>) -> Result<()> {
        let start = self.buffer.len();
        self.buffer.resize(start + self.encoding.record_size(), 0);
        encode_record(triplet, self.encoding, &mut self.buffer[start..])?;
        self.records += 1;

        if self.buffer.len() >= self.batch_bytes {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Append a slice of records
    pub fn write_all<T: MatrixElement>(&mut self, triplets: &[Triplet<T>]) -> Result<()> {
        triplets.iter().try_for_each(|triplet| self.write(triplet))
    }

    /// Write out the buffered records
    pub fn flush_batch(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        log::debug!(
            "flushing {} records ({} bytes)",
            self.buffer.len() / self.encoding.record_size(),
            self.buffer.len()
        );
        self.inner.write_all(&self.buffer)?;
        self.buffer.clear();
        Ok(())
    }

    /// Flush everything and return the sink with the header as written
    ///
    /// Use [`finish_with_header`](Self::finish_with_header) when the record
    /// count is not known up front.
    pub fn finish(mut self) -> Result<(W, MtbHeader)> {
        self.flush_batch()?;
        self.inner.flush()?;
        if self.records != self.header.nz {
            log::warn!(
                "MTB header declares {} records but {} were written",
                self.header.nz,
                self.records
            );
        }
        Ok((self.inner, self.header))
    }
}

impl<W: Write + Seek> MtbWriter<W> {
    /// Flush everything and rewrite the header with the final record count
    pub fn finish_with_header(mut self) -> Result<(W, MtbHeader)> {
        self.flush_batch()?;

        let data_bytes = self.records * self.encoding.record_size() as u64;
        let written = i64::try_from(HEADER_SIZE as u64 + data_bytes)
            .map_err(|_| Error::unsupported("output larger than the seekable range"))?;

        self.header.nz = self.records;
        self.inner.seek(SeekFrom::Current(-written))?;
        self.inner.write_all(&self.header.to_bytes_array())?;
        self.inner.seek(SeekFrom::Current(written - HEADER_SIZE as i64))?;
        self.inner.flush()?;

        Ok((self.inner, self.header))
    }
}

impl<W: Write, T: MatrixElement> TripletSink<T> for MtbWriter<W> {
    type Error = Error;

    fn push(&mut self, triplet: Triplet<T>) -> Result<()> {
        self.write(&triplet)
    }
}

/// Write a complete MTB file from in-memory triplets
pub fn write_mtb<T: MatrixElement>(
    path: impl AsRef<Path>,
    matrix_type: MatrixType,
    encoding: ValueEncoding,
    nrows: u64,
    ncols: u64,
    triplets: &[Triplet<T>],
) -> Result<MtbHeader> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let header = MtbHeader::new(matrix_type, encoding, nrows, ncols, triplets.len() as u64);
    let mut writer = MtbWriter::new(file, header)?;
    writer.write_all(triplets)?;
    let (_, header) = writer.finish()?;
    Ok(header)
}
