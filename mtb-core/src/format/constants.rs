//! Constants of the MTB binary layout

/// Size of the fixed MTB header in bytes
pub const HEADER_SIZE: usize = 26;

/// Size of each stored row or column index in bytes
pub const INDEX_SIZE: usize = 8;

/// Default number of records moved per bulk read or write (2^24)
pub const BUF_RECORDS: usize = 1 << 24;

/// Matrix type tags (byte 0 of the header)
pub mod matrix_type {
    pub const GENERAL_DENSE: u8 = 0x01;
    pub const SYMMETRIC_DENSE: u8 = 0x02;
    pub const GENERAL_SPARSE: u8 = 0x11;
    pub const SYMMETRIC_SPARSE: u8 = 0x12;
}

/// Datatype tags (high nibble of header byte 1)
pub mod datatype {
    pub const PATTERN: u8 = 0x00;
    pub const INTEGER: u8 = 0x10;
    pub const REAL: u8 = 0x20;
    pub const COMPLEX: u8 = 0x30;

    /// Mask selecting the datatype from the packed byte
    pub const MASK: u8 = 0xF0;
    /// Mask selecting the type size from the packed byte
    pub const SIZE_MASK: u8 = 0x0F;
}
