//! Error types for MTB format operations

/// Errors that can occur while encoding or decoding MTB data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtbError {
    /// Buffer too short for the header or record being read or written
    InsufficientBuffer,
    /// Matrix type tag not known to the format, or not a sparse layout
    UnsupportedMatrixType(u8),
    /// Datatype tag (high nibble of the packed byte) not known to the format
    UnsupportedDatatype(u8),
    /// Scalar width not valid for the datatype
    UnsupportedTypeSize { datatype: u8, type_size: u8 },
    /// Stored values cannot be represented by the requested element type
    IncompatibleElement,
}

impl core::fmt::Display for MtbError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MtbError::InsufficientBuffer => write!(f, "Insufficient buffer space"),
            MtbError::UnsupportedMatrixType(tag) => {
                write!(f, "Unsupported MTB matrix type 0x{tag:02x}")
            }
            MtbError::UnsupportedDatatype(tag) => write!(f, "Unsupported MTB datatype 0x{tag:02x}"),
            MtbError::UnsupportedTypeSize {
                datatype,
                type_size,
            } => write!(
                f,
                "Unsupported type size {type_size} for MTB datatype 0x{datatype:02x}"
            ),
            MtbError::IncompatibleElement => {
                write!(f, "Complex values cannot be decoded into a real element type")
            }
        }
    }
}

/// Result type for MTB format operations
pub type Result<T> = core::result::Result<T, MtbError>;
