//! Block-wise tokenizer for MTX data lines
//!
//! The data section is read in fixed-size raw blocks. A full block is cut at
//! its last newline and the source is sought back over the partial line, so
//! every line is parsed from a single contiguous slice.

use super::cursor::{ByteCursor, ScanError};
use super::header::MtxHeader;
use crate::config::Mirroring;
use crate::{Error, Result};
use mtb_core::{
    check_compatible, Complex, Datatype, MatrixElement, Triplet, TripletSink, ValueEncoding, Width,
};
use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom};
use std::marker::PhantomData;

/// Streaming parser producing triplets from the data section of an MTX file
///
/// The source must be positioned at the first data line, i.e. at
/// [`MtxHeader::data_offset`].
pub struct TripletStream<R, T> {
    source: R,
    buffer: Vec<u8>,
    block_size: usize,
    parser: LineParser,
    /// Absolute offset of the next unread byte
    offset: u64,
    finished: bool,
    pending: Vec<Triplet<T>>,
    pending_pos: usize,
    _element: PhantomData<T>,
}

/// Per-line state shared by every block
#[derive(Debug, Clone, Copy)]
struct LineParser {
    datatype: Datatype,
    nrows: u64,
    ncols: u64,
    /// Set for symmetric matrices
    mirroring: Option<Mirroring>,
    entries: u64,
    triplets: u64,
}

impl<R: Read + Seek, T: MatrixElement> TripletStream<R, T> {
    /// Create a stream for the data section described by `header`
    ///
    /// Fails if the header is not a supported coordinate matrix or if its
    /// values cannot be represented by `T`.
    pub fn new(source: R, header: &MtxHeader, block_size: usize, mirroring: Mirroring) -> Result<Self> {
        let (matrix_type, datatype) = header.validate()?;
        check_compatible::<T>(ValueEncoding::for_datatype(datatype, Width::Eight, Width::Eight))?;

        let block_size = block_size.max(1);
        Ok(Self {
            source,
            buffer: Vec::with_capacity(block_size),
            block_size,
            parser: LineParser {
                datatype,
                nrows: header.nrows,
                ncols: header.ncols,
                mirroring: matrix_type.is_symmetric().then_some(mirroring),
                entries: 0,
                triplets: 0,
            },
            offset: header.data_offset,
            finished: false,
            pending: Vec::new(),
            pending_pos: 0,
            _element: PhantomData,
        })
    }

    /// Bytes of the input consumed so far, header included
    pub fn bytes_consumed(&self) -> u64 {
        self.offset
    }

    /// Logical entries parsed so far (data lines)
    pub fn entries(&self) -> u64 {
        self.parser.entries
    }

    /// Physical triplets produced so far, mirrors included
    pub fn triplets(&self) -> u64 {
        self.parser.triplets
    }

    pub fn is_symmetric(&self) -> bool {
        self.parser.mirroring.is_some()
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    /// Parse the next block, pushing its triplets into `sink`
    ///
    /// Returns `Ok(false)` once the data section is exhausted.
    pub fn next_block<S>(&mut self, sink: &mut S) -> Result<bool>
    where
        S: TripletSink<T>,
        Error: From<S::Error>,
    {
        if self.finished {
            return Ok(false);
        }

        let (len, eof) = self.fill_block()?;
        if len == 0 {
            self.finished = true;
            return Ok(false);
        }

        let complete = if eof {
            len
        } else {
            match self.buffer[..len].iter().rposition(|&b| b == b'\n') {
                Some(last) => last + 1,
                None => {
                    return Err(Error::format(
                        format!("line longer than the block size of {} bytes", self.block_size),
                        self.offset,
                    ))
                }
            }
        };

        if complete < len {
            let partial = (len - complete) as i64;
            self.source.seek(SeekFrom::Current(-partial))?;
        }

        let before = self.parser.triplets;
        self.parser
            .parse_region::<T, S>(&self.buffer[..complete], self.offset, sink)?;
        self.offset += complete as u64;
        self.finished = eof;

        log::debug!(
            "parsed block of {} bytes into {} triplets",
            complete,
            self.parser.triplets - before
        );
        Ok(true)
    }

    /// Fill the block buffer until it is full or the source is exhausted
    fn fill_block(&mut self) -> Result<(usize, bool)> {
        self.buffer.resize(self.block_size, 0);
        let mut filled = 0;

        while filled < self.block_size {
            match self.source.read(&mut self.buffer[filled..]) {
                Ok(0) => return Ok((filled, true)),
                Ok(n) => filled += n,
                Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }

        Ok((filled, false))
    }
}

impl LineParser {
    fn parse_region<T, S>(&mut self, bytes: &[u8], base: u64, sink: &mut S) -> Result<()>
    where
        T: MatrixElement,
        S: TripletSink<T>,
        Error: From<S::Error>,
    {
        let mut cursor = ByteCursor::new(bytes);

        loop {
            cursor.skip_blank();
            if cursor.is_at_end() {
                return Ok(());
            }
            if cursor.peek() == Some(b'%') {
                cursor.skip_line();
                continue;
            }

            let line = base + cursor.position() as u64;
            let row = read_index(&mut cursor, self.nrows, "row", line)?;
            let col = read_index(&mut cursor, self.ncols, "column", line)?;
            let val = self.read_value::<T>(&mut cursor, line)?;
            cursor.skip_line();

            let triplet = Triplet::new(row, col, val);
            self.entries += 1;
            sink.push(triplet)?;
            self.triplets += 1;

            if let Some(mirroring) = self.mirroring {
                if mirroring.mirrors(row, col) {
                    sink.push(triplet.transposed())?;
                    self.triplets += 1;
                }
            }
        }
    }

    fn read_value<T: MatrixElement>(&self, cursor: &mut ByteCursor<'_>, line: u64) -> Result<T> {
        match self.datatype {
            Datatype::Pattern => Ok(T::one()),
            Datatype::Integer => cursor
                .read_int()
                .map(T::from_integer)
                .map_err(|err| scan_error(err, "integer value", line)),
            Datatype::Real => cursor
                .read_float()
                .map(T::from_real)
                .map_err(|err| scan_error(err, "real value", line)),
            Datatype::Complex => {
                let re = cursor
                    .read_float()
                    .map_err(|err| scan_error(err, "real part", line))?;
                let im = cursor
                    .read_float()
                    .map_err(|err| scan_error(err, "imaginary part", line))?;
                T::from_complex(Complex::new(re, im))
                    .ok_or_else(|| Error::unsupported("complex values require a complex element type"))
            }
        }
    }
}

/// Read a one-based index and convert it to zero-based
fn read_index(cursor: &mut ByteCursor<'_>, limit: u64, what: &str, line: u64) -> Result<i64> {
    let index = cursor
        .read_uint()
        .map_err(|err| scan_error(err, &format!("{what} index"), line))?;

    if index == 0 {
        return Err(Error::format(format!("{what} index 0 (indices are one-based)"), line));
    }
    if index > limit {
        return Err(Error::format(
            format!("{what} index {index} exceeds dimension {limit}"),
            line,
        ));
    }
    i64::try_from(index - 1)
        .map_err(|_| Error::format(format!("{what} index {index} does not fit a stored index"), line))
}

fn scan_error(err: ScanError, what: &str, line: u64) -> Error {
    match err {
        ScanError::EndOfBuffer => Error::format(format!("unexpected end of data reading {what}"), line),
        ScanError::Invalid => Error::format(format!("invalid {what}"), line),
    }
}

impl<R: Read + Seek, T: MatrixElement> Iterator for TripletStream<R, T> {
    type Item = Result<Triplet<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(triplet) = self.pending.get(self.pending_pos) {
                self.pending_pos += 1;
                return Some(Ok(*triplet));
            }

            let mut pending = std::mem::take(&mut self.pending);
            pending.clear();
            self.pending_pos = 0;

            let more = self.next_block(&mut pending);
            self.pending = pending;

            match more {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtx::parse_header;
    use crate::ErrorKind;
    use std::io::Cursor;

    fn stream<T: MatrixElement>(
        text: &str,
        block_size: usize,
        mirroring: Mirroring,
    ) -> Result<TripletStream<Cursor<Vec<u8>>, T>> {
        let mut source = Cursor::new(text.as_bytes().to_vec());
        let header = parse_header(&mut source)?;
        source.seek(SeekFrom::Start(header.data_offset))?;
        TripletStream::new(source, &header, block_size, mirroring)
    }

    fn collect<T: MatrixElement>(text: &str, block_size: usize) -> Result<Vec<Triplet<T>>> {
        stream::<T>(text, block_size, Mirroring::OffDiagonal)?.collect()
    }

    const REAL: &str = "%%MatrixMarket matrix coordinate real general\n\
                        % comment\n\
                        3 3 4\n\
                        1 1 1.5\n\
                        2 3 -2e1\n\
                        \n\
                        % inline comment\n\
                        3 1 .25 trailing tokens\n\
                        3 3 4\n";

    #[test]
    fn test_real_general() {
        let triplets = collect::<f64>(REAL, 1 << 16).unwrap();
        assert_eq!(
            triplets,
            vec![
                Triplet::new(0, 0, 1.5),
                Triplet::new(1, 2, -20.0),
                Triplet::new(2, 0, 0.25),
                Triplet::new(2, 2, 4.0),
            ]
        );
    }

    #[test]
    fn test_tiny_blocks_match_large_block() {
        let expected = collect::<f64>(REAL, 1 << 16).unwrap();
        // The longest data line is 24 bytes; any smaller block is a format error
        for block_size in 24..64 {
            assert_eq!(collect::<f64>(REAL, block_size).unwrap(), expected, "block {block_size}");
        }
    }

    #[test]
    fn test_newline_at_block_boundary() {
        let text = "%%MatrixMarket matrix coordinate integer general\n2 2 2\n1 1 7\n2 2 9\n";
        // Each data line is 6 bytes, so a 6-byte block ends exactly on a newline
        let mut stream = stream::<i64>(text, 6, Mirroring::OffDiagonal).unwrap();
        let mut out = Vec::new();
        while stream.next_block(&mut out).unwrap() {}

        assert_eq!(out, vec![Triplet::new(0, 0, 7), Triplet::new(1, 1, 9)]);
        assert_eq!(stream.bytes_consumed(), text.len() as u64);
        assert_eq!(stream.entries(), 2);
    }

    #[test]
    fn test_final_line_without_newline() {
        let text = "%%MatrixMarket matrix coordinate integer general\n2 2 2\n1 2 -3\n2 1 4";
        for block_size in [7, 8, 1024] {
            let triplets = collect::<i64>(text, block_size).unwrap();
            assert_eq!(triplets, vec![Triplet::new(0, 1, -3), Triplet::new(1, 0, 4)]);
        }
    }

    #[test]
    fn test_line_longer_than_block() {
        let err = collect::<f64>(REAL, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_symmetric_mirroring() {
        let text = "%%MatrixMarket matrix coordinate real symmetric\n2 2 2\n1 1 5.0\n2 1 3.0\n";

        let off = collect::<f64>(text, 1024).unwrap();
        assert_eq!(
            off,
            vec![
                Triplet::new(0, 0, 5.0),
                Triplet::new(1, 0, 3.0),
                Triplet::new(0, 1, 3.0),
            ]
        );

        let mut all = stream::<f64>(text, 1024, Mirroring::All).unwrap();
        let triplets: Vec<_> = all.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(triplets.len(), 4);
        assert_eq!(all.entries(), 2);
        assert_eq!(all.triplets(), 4);
        assert!(all.is_symmetric());
    }

    #[test]
    fn test_pattern_and_complex() {
        let text = "%%MatrixMarket matrix coordinate pattern general\n2 2 2\n1 2\n2 2\n";
        let triplets = collect::<f64>(text, 1024).unwrap();
        assert_eq!(triplets, vec![Triplet::new(0, 1, 1.0), Triplet::new(1, 1, 1.0)]);

        let text = "%%MatrixMarket matrix coordinate complex general\n2 2 1\n2 1 1.5 -2\n";
        let triplets = collect::<Complex<f64>>(text, 1024).unwrap();
        assert_eq!(triplets, vec![Triplet::new(1, 0, Complex::new(1.5, -2.0))]);

        // complex data cannot be read into a real element type
        let err = stream::<f64>(text, 1024, Mirroring::OffDiagonal)
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_bad_indices() {
        let banner = "%%MatrixMarket matrix coordinate real general\n2 2 1\n";
        for line in ["0 1 1.0\n", "1 3 1.0\n", "x 1 1.0\n", "1 1 abc\n", "1 1\n", "1"] {
            let err = collect::<f64>(&format!("{banner}{line}"), 1024).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "line {line:?}");
        }
    }

    #[test]
    fn test_index_beyond_stored_range() {
        let text = "%%MatrixMarket matrix coordinate real general\n\
                    18446744073709551615 2 1\n\
                    9223372036854775809 1 1.0\n";
        let err = collect::<f64>(text, 1024).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        // the largest index that still fits
        let text = "%%MatrixMarket matrix coordinate real general\n\
                    18446744073709551615 2 1\n\
                    9223372036854775808 1 1.0\n";
        let triplets = collect::<f64>(text, 1024).unwrap();
        assert_eq!(triplets, vec![Triplet::new(i64::MAX, 0, 1.0)]);
    }

    #[test]
    fn test_error_offset_points_at_line() {
        let banner = "%%MatrixMarket matrix coordinate real general\n2 2 2\n";
        let text = format!("{banner}1 1 1.0\n9 1 1.0\n");
        match collect::<f64>(&text, 1024).unwrap_err() {
            Error::Format { offset, .. } => assert_eq!(offset as usize, banner.len() + 8),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
