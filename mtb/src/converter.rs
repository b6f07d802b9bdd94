//! MTX to MTB conversion
//!
//! Two paths share the tokenizer and the writer:
//!
//! - **streamed**: every parsed block is encoded and flushed before the next
//!   one is read, and the header is rewritten with the final record count;
//! - **sorted**: all triplets are collected, sorted by `(row, col)` with a
//!   stable parallel sort, then written behind an exact header.

use crate::config::ConvertConfig;
use crate::mtx::{parse_header, MtxHeader, TripletStream};
use crate::progress::{NoProgress, Progress};
use crate::writer::MtbWriter;
use crate::{Error, Result};
use mtb_core::{Complex, Datatype, MatrixElement, MatrixType, MtbHeader, Pattern, Triplet, ValueEncoding};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Outcome of a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConvertSummary {
    /// Header as written, `nz` equal to the number of records
    pub header: MtbHeader,
    /// Entry count declared by the MTX size line
    pub declared_nz: u64,
    /// Data lines parsed
    pub entries: u64,
    /// Records written, mirrors included
    pub records: u64,
    /// Bytes of MTX input consumed
    pub bytes_read: u64,
    pub sorted: bool,
}

/// Convert an MTX file to MTB with default settings
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>, sort: bool) -> Result<ConvertSummary> {
    let config = ConvertConfig::default().with_sort(sort);
    convert_with_config(input, output, &config, &mut NoProgress)
}

/// Convert an MTX file to MTB
pub fn convert_with_config<P: Progress + ?Sized>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConvertConfig,
    progress: &mut P,
) -> Result<ConvertSummary> {
    let (input, output) = (input.as_ref(), output.as_ref());

    let source = File::open(input).map_err(|source| Error::Open {
        path: input.to_path_buf(),
        source,
    })?;
    let total_len = source.metadata()?.len();

    let sink = File::create(output).map_err(|source| Error::Create {
        path: output.to_path_buf(),
        source,
    })?;

    log::info!(
        "converting {} to {} ({} bytes, sort: {})",
        input.display(),
        output.display(),
        total_len,
        config.sort
    );

    let summary = convert_stream(source, sink, total_len, config, progress)?;

    log::info!(
        "wrote {} records ({} entries) to {}",
        summary.records,
        summary.entries,
        output.display()
    );
    Ok(summary)
}

/// Convert MTX text read from `input` into MTB bytes written to `output`
///
/// `total_len` is the size of the input used for progress reporting. Both
/// streams are used from their current positions.
pub fn convert_stream<R, W, P>(
    mut input: R,
    output: W,
    total_len: u64,
    config: &ConvertConfig,
    progress: &mut P,
) -> Result<ConvertSummary>
where
    R: Read + Seek,
    W: Write + Seek,
    P: Progress + ?Sized,
{
    let start = input.stream_position()?;
    let header = parse_header(&mut BufReader::new(&mut input))?;
    input.seek(SeekFrom::Start(start + header.data_offset))?;

    let (matrix_type, datatype) = header.validate()?;
    let encoding = ValueEncoding::for_datatype(datatype, config.integer_width, config.real_width);
    log::info!(
        "{}x{} {} matrix, {} declared entries, stored as {}",
        header.nrows,
        header.ncols,
        matrix_type,
        header.nz,
        encoding
    );

    let job = Job {
        header: &header,
        matrix_type,
        encoding,
        total_len,
        config,
    };

    progress.init("Converting MTX to MTB");
    let summary = match datatype {
        Datatype::Pattern => job.run::<Pattern, _, _, _>(input, output, progress),
        Datatype::Integer => job.run::<i64, _, _, _>(input, output, progress),
        Datatype::Real => job.run::<f64, _, _, _>(input, output, progress),
        Datatype::Complex => job.run::<Complex<f64>, _, _, _>(input, output, progress),
    }?;
    progress.finish();

    if summary.entries != header.nz {
        log::warn!(
            "MTX header declares {} entries but {} were parsed",
            header.nz,
            summary.entries
        );
    }
    Ok(summary)
}

/// Settings shared by both conversion paths
struct Job<'a> {
    header: &'a MtxHeader,
    matrix_type: MatrixType,
    encoding: ValueEncoding,
    total_len: u64,
    config: &'a ConvertConfig,
}

impl Job<'_> {
    fn run<T, R, W, P>(&self, input: R, output: W, progress: &mut P) -> Result<ConvertSummary>
    where
        T: MatrixElement,
        R: Read + Seek,
        W: Write + Seek,
        P: Progress + ?Sized,
    {
        let mut stream =
            TripletStream::<R, T>::new(input, self.header, self.config.block_size, self.config.mirroring)?;

        let header = if self.config.sort {
            self.sorted(&mut stream, output, progress)?
        } else {
            self.streamed(&mut stream, output, progress)?
        };

        Ok(ConvertSummary {
            header,
            declared_nz: self.header.nz,
            entries: stream.entries(),
            records: header.nz,
            bytes_read: stream.bytes_consumed(),
            sorted: self.config.sort,
        })
    }

    fn mtb_header(&self, nz: u64) -> MtbHeader {
        MtbHeader::new(
            self.matrix_type,
            self.encoding,
            self.header.nrows,
            self.header.ncols,
            nz,
        )
    }

    /// Encode each block as it is parsed; the header is patched at the end
    fn streamed<T, R, W, P>(
        &self,
        stream: &mut TripletStream<R, T>,
        output: W,
        progress: &mut P,
    ) -> Result<MtbHeader>
    where
        T: MatrixElement,
        R: Read + Seek,
        W: Write + Seek,
        P: Progress + ?Sized,
    {
        // nz stays 0 until finish_with_header patches it
        let mut writer = MtbWriter::new(output, self.mtb_header(0))?.with_batch_records(self.config.batch_records);

        while stream.next_block(&mut writer)? {
            progress.update(stream.bytes_consumed(), self.total_len);
        }

        let (_, header) = writer.finish_with_header()?;
        Ok(header)
    }

    /// Collect every triplet, sort by position, then write
    fn sorted<T, R, W, P>(
        &self,
        stream: &mut TripletStream<R, T>,
        output: W,
        progress: &mut P,
    ) -> Result<MtbHeader>
    where
        T: MatrixElement,
        R: Read + Seek,
        W: Write + Seek,
        P: Progress + ?Sized,
    {
        let worst_case = if stream.is_symmetric() {
            self.header.nz.saturating_mul(2)
        } else {
            self.header.nz
        };

        let mut triplets: Vec<Triplet<T>> = Vec::new();
        let reserved = usize::try_from(worst_case)
            .ok()
            .is_some_and(|capacity| triplets.try_reserve_exact(capacity).is_ok());
        if !reserved {
            log::warn!("cannot reserve room for {worst_case} triplets up front");
        }

        while stream.next_block(&mut triplets)? {
            progress.update(stream.bytes_consumed(), self.total_len);
        }

        log::debug!("sorting {} triplets", triplets.len());
        triplets.par_sort_by(Triplet::cmp_position);

        let mut writer = MtbWriter::new(output, self.mtb_header(triplets.len() as u64))?
            .with_batch_records(self.config.batch_records);
        writer.write_all(&triplets)?;

        let (_, header) = writer.finish()?;
        Ok(header)
    }
}
