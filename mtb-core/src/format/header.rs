//! Core MTB header format definitions
//!
//! This module contains the fixed 26-byte MTB file header and the tag enums
//! stored in it.

use super::constants::{datatype as dt, matrix_type as mt, HEADER_SIZE};
use super::encoding::ValueEncoding;
use crate::{MtbError, Result};

/// Fixed-size header at the start of every .mtb file
///
/// Layout (little-endian, no padding):
///
/// | offset | size | field |
/// |--------|------|-------|
/// | 0      | 1    | matrix type tag |
/// | 1      | 1    | datatype tag (high nibble) \| type size (low nibble) |
/// | 2      | 8    | ncols |
/// | 10     | 8    | nrows |
/// | 18     | 8    | nz |
///
/// Columns are stored before rows. Tags are kept raw; use the typed accessors
/// to validate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MtbHeader {
    /// Matrix type tag (see [`MatrixType`])
    pub matrix_type: u8,
    /// Datatype tag (see [`Datatype`])
    pub datatype: u8,
    /// Byte width of one scalar component (0 for pattern)
    pub type_size: u8,
    /// Number of rows
    pub nrows: u64,
    /// Number of columns
    pub ncols: u64,
    /// Number of triplet records in the data section
    pub nz: u64,
}

impl MtbHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Create a header for a sparse matrix with the given value encoding
    pub const fn new(
        matrix_type: MatrixType,
        encoding: ValueEncoding,
        nrows: u64,
        ncols: u64,
        nz: u64,
    ) -> Self {
        Self {
            matrix_type: matrix_type.to_u8(),
            datatype: encoding.datatype().to_u8(),
            type_size: encoding.type_size(),
            nrows,
            ncols,
            nz,
        }
    }

    /// Parse header from bytes
    ///
    /// Only the length is checked. Tags are not validated here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(MtbError::InsufficientBuffer);
        }

        let matrix_type = bytes[0];
        let packed = bytes[1];

        let ncols = u64::from_le_bytes([
            bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7], bytes[8], bytes[9],
        ]);
        let nrows = u64::from_le_bytes([
            bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15], bytes[16], bytes[17],
        ]);
        let nz = u64::from_le_bytes([
            bytes[18], bytes[19], bytes[20], bytes[21], bytes[22], bytes[23], bytes[24], bytes[25],
        ]);

        Ok(Self {
            matrix_type,
            datatype: packed & dt::MASK,
            type_size: packed & dt::SIZE_MASK,
            nrows,
            ncols,
            nz,
        })
    }

    /// Convert header to bytes (requires alloc feature)
    #[cfg(feature = "alloc")]
    pub fn to_bytes(&self) -> alloc::vec::Vec<u8> {
        self.to_bytes_array().to_vec()
    }

    /// Convert header to a fixed byte array (no-std compatible)
    pub const fn to_bytes_array(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];

        bytes[0] = self.matrix_type;
        bytes[1] = (self.datatype & dt::MASK) | (self.type_size & dt::SIZE_MASK);

        let ncols = self.ncols.to_le_bytes();
        let nrows = self.nrows.to_le_bytes();
        let nz = self.nz.to_le_bytes();

        let mut i = 0;
        while i < 8 {
            bytes[2 + i] = ncols[i];
            bytes[10 + i] = nrows[i];
            bytes[18 + i] = nz[i];
            i += 1;
        }

        bytes
    }

    /// Typed matrix type
    pub fn matrix_type(&self) -> Result<MatrixType> {
        MatrixType::from_u8(self.matrix_type).ok_or(MtbError::UnsupportedMatrixType(self.matrix_type))
    }

    /// Typed datatype
    pub fn datatype(&self) -> Result<Datatype> {
        Datatype::from_u8(self.datatype).ok_or(MtbError::UnsupportedDatatype(self.datatype))
    }

    /// Value encoding described by the datatype and type size fields
    pub fn value_encoding(&self) -> Result<ValueEncoding> {
        ValueEncoding::from_tags(self.datatype, self.type_size)
    }

    /// Size in bytes of the data section implied by `nz`
    ///
    /// Returns `None` on overflow or when the encoding is unsupported.
    pub fn data_size(&self) -> Option<u64> {
        let record = self.value_encoding().ok()?.record_size() as u64;
        self.nz.checked_mul(record)
    }

    /// Whether the matrix type is symmetric sparse
    pub fn is_symmetric(&self) -> bool {
        self.matrix_type == mt::SYMMETRIC_SPARSE
    }
}

/// Matrix types with information about symmetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MatrixType {
    /// General dense matrix (not supported by the converter)
    GeneralDense = mt::GENERAL_DENSE,
    /// Symmetric dense matrix (not supported by the converter)
    SymmetricDense = mt::SYMMETRIC_DENSE,
    /// General sparse matrix
    GeneralSparse = mt::GENERAL_SPARSE,
    /// Symmetric sparse matrix
    SymmetricSparse = mt::SYMMETRIC_SPARSE,
}

impl MatrixType {
    /// Convert from u8 representation
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            mt::GENERAL_DENSE => Some(MatrixType::GeneralDense),
            mt::SYMMETRIC_DENSE => Some(MatrixType::SymmetricDense),
            mt::GENERAL_SPARSE => Some(MatrixType::GeneralSparse),
            mt::SYMMETRIC_SPARSE => Some(MatrixType::SymmetricSparse),
            _ => None,
        }
    }

    /// Convert to u8 representation
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    pub const fn is_sparse(self) -> bool {
        matches!(self, MatrixType::GeneralSparse | MatrixType::SymmetricSparse)
    }

    pub const fn is_symmetric(self) -> bool {
        matches!(self, MatrixType::SymmetricSparse | MatrixType::SymmetricDense)
    }
}

impl core::fmt::Display for MatrixType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MatrixType::GeneralDense => write!(f, "general dense"),
            MatrixType::SymmetricDense => write!(f, "symmetric dense"),
            MatrixType::GeneralSparse => write!(f, "general sparse"),
            MatrixType::SymmetricSparse => write!(f, "symmetric sparse"),
        }
    }
}

/// Datatype of the nonzero entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Datatype {
    /// Structure only, every stored entry equals one
    Pattern = dt::PATTERN,
    /// Signed integer
    Integer = dt::INTEGER,
    /// Floating point
    Real = dt::REAL,
    /// Floating point real and imaginary parts
    Complex = dt::COMPLEX,
}

impl Datatype {
    /// Convert from u8 representation
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            dt::PATTERN => Some(Datatype::Pattern),
            dt::INTEGER => Some(Datatype::Integer),
            dt::REAL => Some(Datatype::Real),
            dt::COMPLEX => Some(Datatype::Complex),
            _ => None,
        }
    }

    /// Convert to u8 representation
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Number of scalar components per value
    pub const fn components(self) -> usize {
        match self {
            Datatype::Pattern => 0,
            Datatype::Integer | Datatype::Real => 1,
            Datatype::Complex => 2,
        }
    }
}

impl core::fmt::Display for Datatype {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Datatype::Pattern => write!(f, "pattern"),
            Datatype::Integer => write!(f, "integer"),
            Datatype::Real => write!(f, "real"),
            Datatype::Complex => write!(f, "complex"),
        }
    }
}
