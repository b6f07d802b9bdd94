//! Memory-mapped MTB files
//!
//! The file is mapped read-only and records are decoded lazily from the map.

use crate::{Error, Result};
use memmap2::{Mmap, MmapOptions};
use mtb_core::{check_compatible, decode_record, MatrixElement, MtbHeader, Triplet, ValueEncoding};
use rayon::prelude::*;
use std::fs::File;
use std::path::Path;

/// Read-only view of an MTB file backed by a memory map
pub struct MtbFile {
    mmap: Mmap,
    header: MtbHeader,
    encoding: ValueEncoding,
    len: usize,
}

impl MtbFile {
    /// Map an MTB file and validate its header against the file size
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: read-only mapping; the file must not be truncated while mapped
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        if mmap.len() < MtbHeader::SIZE {
            return Err(Error::truncated(format!(
                "{} bytes is too small for an MTB header",
                mmap.len()
            )));
        }

        let header = MtbHeader::from_bytes(&mmap[..MtbHeader::SIZE])?;
        let matrix_type = header.matrix_type()?;
        if !matrix_type.is_sparse() {
            return Err(Error::unsupported(format!("{matrix_type} MTB files")));
        }
        let encoding = header.value_encoding()?;

        let data_len = (mmap.len() - MtbHeader::SIZE) as u64;
        let required = header
            .data_size()
            .ok_or_else(|| Error::truncated(format!("record count {} overflows", header.nz)))?;
        if data_len < required {
            return Err(Error::truncated(format!(
                "header declares {} records ({required} bytes) but the data section holds {data_len} bytes",
                header.nz
            )));
        }

        Ok(Self {
            mmap,
            header,
            encoding,
            len: header.nz as usize,
        })
    }

    pub fn header(&self) -> &MtbHeader {
        &self.header
    }

    pub fn encoding(&self) -> ValueEncoding {
        self.encoding
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw bytes of the `nz` records
    pub fn data(&self) -> &[u8] {
        let start = MtbHeader::SIZE;
        &self.mmap[start..start + self.len * self.encoding.record_size()]
    }

    /// Decode the record at `index`
    pub fn get<T: MatrixElement>(&self, index: usize) -> Result<Option<Triplet<T>>> {
        if index >= self.len {
            return Ok(None);
        }
        let size = self.encoding.record_size();
        let record = &self.data()[index * size..(index + 1) * size];
        Ok(Some(decode_record(record, self.encoding)?))
    }

    /// Iterate over all records in stored order
    pub fn iter<T: MatrixElement>(&self) -> Result<impl Iterator<Item = Result<Triplet<T>>> + '_> {
        check_compatible::<T>(self.encoding)?;
        let encoding = self.encoding;
        Ok(self
            .data()
            .chunks_exact(encoding.record_size())
            .map(move |record| decode_record(record, encoding).map_err(Error::from)))
    }

    /// Decode every record, in parallel
    pub fn to_vec<T: MatrixElement>(&self) -> Result<Vec<Triplet<T>>> {
        check_compatible::<T>(self.encoding)?;
        let encoding = self.encoding;
        self.data()
            .par_chunks_exact(encoding.record_size())
            .map(|record| decode_record(record, encoding).map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_mtb;
    use crate::ErrorKind;
    use mtb_core::{Complex, MatrixType, Width};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_and_decode() {
        let file = NamedTempFile::new().unwrap();
        let triplets: Vec<_> = (0..100)
            .map(|i| Triplet::new(i, 99 - i, Complex::new(i as f64, -(i as f64))))
            .collect();
        write_mtb(
            file.path(),
            MatrixType::GeneralSparse,
            ValueEncoding::Complex(Width::Four),
            100,
            100,
            &triplets,
        )
        .unwrap();

        let mtb = MtbFile::open(file.path()).unwrap();
        assert_eq!(mtb.len(), 100);
        assert_eq!(mtb.encoding(), ValueEncoding::Complex(Width::Four));
        assert_eq!(mtb.get::<Complex<f64>>(7).unwrap(), Some(triplets[7]));
        assert_eq!(mtb.get::<Complex<f64>>(100).unwrap(), None);

        let sequential: Vec<Triplet<Complex<f64>>> = mtb.iter().unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(sequential, triplets);
        assert_eq!(mtb.to_vec::<Complex<f64>>().unwrap(), triplets);

        assert_eq!(mtb.iter::<f64>().err().unwrap().kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_short_data_section() {
        let file = NamedTempFile::new().unwrap();
        let triplets = vec![Triplet::new(0, 0, 1i64), Triplet::new(1, 1, 2)];
        write_mtb(
            file.path(),
            MatrixType::SymmetricSparse,
            ValueEncoding::Integer(Width::Eight),
            2,
            2,
            &triplets,
        )
        .unwrap();

        // Claim one more record than the file holds
        let mut header = read_header_bytes(file.path());
        header.nz = 3;
        let mut out = std::fs::OpenOptions::new().write(true).open(file.path()).unwrap();
        out.write_all(&header.to_bytes_array()).unwrap();
        drop(out);

        let err = MtbFile::open(file.path()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let err = MtbFile::open(file.path()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    fn read_header_bytes(path: &Path) -> MtbHeader {
        let bytes = std::fs::read(path).unwrap();
        MtbHeader::from_bytes(&bytes).unwrap()
    }
}
