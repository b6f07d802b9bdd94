//! Binary format definitions for MTB files
//!
//! This module contains pure data structure definitions for the MTB wire format.
//! No I/O operations - only the header layout, tag enums and value encodings.

pub mod constants;
pub mod encoding;
pub mod header;

pub use encoding::{ValueEncoding, Width};
pub use header::{Datatype, MatrixType, MtbHeader};
