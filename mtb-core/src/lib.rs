#![no_std]

//! MTB Core - Binary Triplet Matrix Format Definitions
//!
//! This crate provides the format definitions, element traits and the record
//! codec for the MTB binary triplet format. It performs no I/O.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod codec;
pub mod error;
pub mod format;
pub mod traits;
pub mod triplet;

pub use codec::{check_compatible, decode_record, encode_record};
#[cfg(feature = "alloc")]
pub use codec::{decode_batch, encode_batch};
pub use error::*;
pub use format::*;
pub use traits::*;
pub use triplet::{is_row_major, Triplet};
