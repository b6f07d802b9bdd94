//! Value encodings for MTB triplet records
//!
//! Every record is `row (8) | col (8) | value`, where the value layout is
//! selected by the datatype tag and the scalar width stored in the header.

use super::constants::{datatype as dt, INDEX_SIZE};
use super::header::Datatype;
use crate::{MtbError, Result};

/// Width of one scalar component in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Width {
    /// 4 bytes (`i32` / `f32`)
    Four,
    /// 8 bytes (`i64` / `f64`)
    Eight,
}

impl Width {
    pub const fn bytes(self) -> usize {
        match self {
            Width::Four => 4,
            Width::Eight => 8,
        }
    }

    /// Convert from a byte count
    pub const fn from_bytes(size: u8) -> Option<Self> {
        match size {
            4 => Some(Width::Four),
            8 => Some(Width::Eight),
            _ => None,
        }
    }
}

impl core::fmt::Display for Width {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.bytes())
    }
}

/// Physical layout of the value field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueEncoding {
    /// No value bytes
    Pattern,
    /// Signed integer truncated to the width
    Integer(Width),
    /// IEEE-754 float of the width
    Real(Width),
    /// Real part followed by imaginary part, each of the width
    Complex(Width),
}

impl ValueEncoding {
    /// Build an encoding from the raw header tags
    pub const fn from_tags(datatype: u8, type_size: u8) -> Result<Self> {
        let width = Width::from_bytes(type_size);
        match (datatype, width) {
            (dt::PATTERN, _) if type_size == 0 => Ok(ValueEncoding::Pattern),
            (dt::INTEGER, Some(w)) => Ok(ValueEncoding::Integer(w)),
            (dt::REAL, Some(w)) => Ok(ValueEncoding::Real(w)),
            (dt::COMPLEX, Some(w)) => Ok(ValueEncoding::Complex(w)),
            (dt::PATTERN | dt::INTEGER | dt::REAL | dt::COMPLEX, _) => {
                Err(MtbError::UnsupportedTypeSize {
                    datatype,
                    type_size,
                })
            }
            _ => Err(MtbError::UnsupportedDatatype(datatype)),
        }
    }

    /// Build an encoding for a datatype with separate integer and float widths
    pub const fn for_datatype(datatype: Datatype, integer_width: Width, real_width: Width) -> Self {
        match datatype {
            Datatype::Pattern => ValueEncoding::Pattern,
            Datatype::Integer => ValueEncoding::Integer(integer_width),
            Datatype::Real => ValueEncoding::Real(real_width),
            Datatype::Complex => ValueEncoding::Complex(real_width),
        }
    }

    pub const fn datatype(self) -> Datatype {
        match self {
            ValueEncoding::Pattern => Datatype::Pattern,
            ValueEncoding::Integer(_) => Datatype::Integer,
            ValueEncoding::Real(_) => Datatype::Real,
            ValueEncoding::Complex(_) => Datatype::Complex,
        }
    }

    /// Scalar width as stored in the header (0 for pattern)
    pub const fn type_size(self) -> u8 {
        match self {
            ValueEncoding::Pattern => 0,
            ValueEncoding::Integer(w) | ValueEncoding::Real(w) | ValueEncoding::Complex(w) => {
                w.bytes() as u8
            }
        }
    }

    /// Size of the value field in bytes
    pub const fn value_size(self) -> usize {
        match self {
            ValueEncoding::Pattern => 0,
            ValueEncoding::Integer(w) | ValueEncoding::Real(w) => w.bytes(),
            ValueEncoding::Complex(w) => 2 * w.bytes(),
        }
    }

    /// Size of a full record in bytes
    pub const fn record_size(self) -> usize {
        2 * INDEX_SIZE + self.value_size()
    }
}

impl core::fmt::Display for ValueEncoding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ValueEncoding::Pattern => write!(f, "pattern"),
            ValueEncoding::Integer(w) => write!(f, "integer/{w}"),
            ValueEncoding::Real(w) => write!(f, "real/{w}"),
            ValueEncoding::Complex(w) => write!(f, "complex/{w}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(ValueEncoding::Pattern.record_size(), 16);
        assert_eq!(ValueEncoding::Integer(Width::Four).record_size(), 20);
        assert_eq!(ValueEncoding::Real(Width::Eight).record_size(), 24);
        assert_eq!(ValueEncoding::Complex(Width::Four).record_size(), 24);
        assert_eq!(ValueEncoding::Complex(Width::Eight).record_size(), 32);
    }

    #[test]
    fn test_from_tags() {
        assert_eq!(ValueEncoding::from_tags(0x00, 0), Ok(ValueEncoding::Pattern));
        assert_eq!(
            ValueEncoding::from_tags(0x10, 4),
            Ok(ValueEncoding::Integer(Width::Four))
        );
        assert_eq!(
            ValueEncoding::from_tags(0x30, 8),
            Ok(ValueEncoding::Complex(Width::Eight))
        );

        assert_eq!(
            ValueEncoding::from_tags(0x40, 8),
            Err(MtbError::UnsupportedDatatype(0x40))
        );
        assert_eq!(
            ValueEncoding::from_tags(0x20, 2),
            Err(MtbError::UnsupportedTypeSize {
                datatype: 0x20,
                type_size: 2
            })
        );
        assert_eq!(
            ValueEncoding::from_tags(0x00, 8),
            Err(MtbError::UnsupportedTypeSize {
                datatype: 0x00,
                type_size: 8
            })
        );
    }

    #[test]
    fn test_for_datatype() {
        let enc = ValueEncoding::for_datatype(Datatype::Integer, Width::Four, Width::Eight);
        assert_eq!(enc, ValueEncoding::Integer(Width::Four));
        assert_eq!(enc.type_size(), 4);

        let enc = ValueEncoding::for_datatype(Datatype::Complex, Width::Four, Width::Eight);
        assert_eq!(enc, ValueEncoding::Complex(Width::Eight));
        assert_eq!(enc.datatype(), Datatype::Complex);
    }
}
