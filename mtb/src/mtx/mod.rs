//! Matrix Market (MTX) coordinate text input
//!
//! [`parse_header`] reads the banner and size line, [`TripletStream`] parses
//! the data lines in blocks.

pub mod cursor;
pub mod header;
pub mod tokenizer;

pub use cursor::{ByteCursor, ScanError};
pub use header::{parse_header, MtxHeader};
pub use tokenizer::TripletStream;

use crate::config::{Mirroring, DEFAULT_BLOCK_SIZE};
use crate::{Error, Result};
use mtb_core::{MatrixElement, Triplet};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

/// Open an MTX file and position a stream at its data section
pub fn open_mtx<T: MatrixElement>(
    path: impl AsRef<Path>,
    block_size: usize,
    mirroring: Mirroring,
) -> Result<(MtxHeader, TripletStream<File, T>)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = BufReader::new(file);
    let header = parse_header(&mut reader)?;

    let mut file = reader.into_inner();
    file.seek(SeekFrom::Start(header.data_offset))?;

    let stream = TripletStream::new(file, &header, block_size, mirroring)?;
    Ok((header, stream))
}

/// Read a whole MTX file into memory
///
/// Symmetric matrices are expanded with [`Mirroring::OffDiagonal`].
pub fn read_mtx<T: MatrixElement>(path: impl AsRef<Path>) -> Result<(MtxHeader, Vec<Triplet<T>>)> {
    let (header, mut stream) = open_mtx::<T>(path, DEFAULT_BLOCK_SIZE, Mirroring::default())?;

    let worst_case = if stream.is_symmetric() {
        header.nz.saturating_mul(2)
    } else {
        header.nz
    };
    let mut triplets: Vec<Triplet<T>> = Vec::new();
    if triplets
        .try_reserve_exact(usize::try_from(worst_case).unwrap_or(usize::MAX))
        .is_err()
    {
        log::warn!("cannot reserve room for {worst_case} triplets up front");
    }

    while stream.next_block(&mut triplets)? {}

    if stream.entries() != header.nz {
        log::warn!(
            "MTX header declares {} entries but {} were parsed",
            header.nz,
            stream.entries()
        );
    }
    Ok((header, triplets))
}
