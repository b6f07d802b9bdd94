//! MTB - Matrix Market to binary triplet conversion
//!
//! This library converts sparse matrices from the Matrix Market coordinate
//! text format (MTX) into MTB, a fixed binary layout of one 26-byte header
//! followed by `(row, col, value)` records, and reads MTB files back.
//!
//! ## Architecture
//!
//! - **mtb-core**: format definitions, element traits and the record codec (no I/O)
//! - **mtb**: MTX parsing, batched readers and writers, memory mapping and conversion
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mtb::{convert, read_mtb, Triplet};
//!
//! fn example() -> mtb::Result<()> {
//!     let summary = convert("matrix.mtx", "matrix.mtb", true)?;
//!     println!("wrote {} records", summary.records);
//!
//!     let (header, triplets) = read_mtb::<f64>("matrix.mtb")?;
//!     for Triplet { row, col, val } in triplets.iter().take(3) {
//!         println!("{}x{}: ({row}, {col}) = {val}", header.nrows, header.ncols);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **mmap** (default): [`MtbFile`] for lazy decoding from a memory map
//! - **serde** (default): `Serialize` on headers, triplets and summaries
//! - **cli** (default): the `mtb` command line tool

// Re-export format definitions and element types
pub use mtb_core::{
    // Format definitions
    Datatype, MatrixType, MtbHeader, ValueEncoding, Width,
    // Element types
    is_row_major, Complex, MatrixElement, Pattern, Triplet, TripletSink,
    // Errors
    MtbError,
};

pub mod config;
pub mod converter;
pub mod error;
#[cfg(feature = "mmap")]
pub mod mmap_backend;
pub mod mtx;
pub mod progress;
pub mod reader;
pub mod writer;

pub use config::{ConvertConfig, Mirroring, DEFAULT_BLOCK_SIZE};
pub use converter::{convert, convert_stream, convert_with_config, ConvertSummary};
pub use error::{Error, ErrorKind, Result};
pub use mtx::{parse_header, read_mtx, MtxHeader, TripletStream};
pub use progress::{NoProgress, Progress};
pub use reader::{open_mtb, read_header, read_mtb, read_mtb_dynamic, MtbReader, TripletBuffer};
pub use writer::{write_mtb, MtbWriter};

#[cfg(feature = "mmap")]
pub use mmap_backend::MtbFile;
