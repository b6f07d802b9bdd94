//! Conversion configuration

use mtb_core::format::constants::BUF_RECORDS;
use mtb_core::Width;

/// Default size in bytes of one raw text block read by the tokenizer (16 MiB)
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 24;

/// How entries of a symmetric matrix are mirrored across the diagonal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Mirroring {
    /// Mirror off-diagonal entries only; diagonal entries are stored once
    #[default]
    OffDiagonal,
    /// Mirror every entry, storing diagonal entries twice
    All,
}

impl Mirroring {
    /// Whether the entry at `(row, col)` gets a transposed twin
    pub fn mirrors(self, row: i64, col: i64) -> bool {
        match self {
            Mirroring::OffDiagonal => row != col,
            Mirroring::All => true,
        }
    }
}

/// Configuration for MTX to MTB conversion
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConvertConfig {
    /// Sort all triplets by (row, col) before writing
    pub sort: bool,
    /// Size of each raw text block in bytes
    pub block_size: usize,
    /// Number of records encoded per bulk write
    pub batch_records: usize,
    /// Stored width of integer values
    pub integer_width: Width,
    /// Stored width of real and complex components
    pub real_width: Width,
    /// Diagonal handling for symmetric matrices
    pub mirroring: Mirroring,
}

impl ConvertConfig {
    /// Config that sorts before writing
    pub fn sorted() -> Self {
        Self::default().with_sort(true)
    }

    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    /// Set the raw block size (at least one byte)
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Set the number of records per bulk write (at least one)
    pub fn with_batch_records(mut self, batch_records: usize) -> Self {
        self.batch_records = batch_records.max(1);
        self
    }

    pub fn with_integer_width(mut self, width: Width) -> Self {
        self.integer_width = width;
        self
    }

    pub fn with_real_width(mut self, width: Width) -> Self {
        self.real_width = width;
        self
    }

    pub fn with_mirroring(mut self, mirroring: Mirroring) -> Self {
        self.mirroring = mirroring;
        self
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            sort: false,
            block_size: DEFAULT_BLOCK_SIZE,
            batch_records: BUF_RECORDS,
            integer_width: Width::Four,
            real_width: Width::Eight,
            mirroring: Mirroring::OffDiagonal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::default();
        assert!(!config.sort);
        assert_eq!(config.block_size, 1 << 24);
        assert_eq!(config.batch_records, 1 << 24);
        assert_eq!(config.integer_width, Width::Four);
        assert_eq!(config.real_width, Width::Eight);
        assert_eq!(config.mirroring, Mirroring::OffDiagonal);
        assert!(ConvertConfig::sorted().sort);
    }

    #[test]
    fn test_builder_clamps() {
        let config = ConvertConfig::default()
            .with_block_size(0)
            .with_batch_records(0);
        assert_eq!(config.block_size, 1);
        assert_eq!(config.batch_records, 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize() {
        let config = ConvertConfig::sorted().with_mirroring(Mirroring::All);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["sort"], true);
        assert_eq!(value["block_size"], 1 << 24);
        assert_eq!(value["mirroring"], "All");
    }

    #[test]
    fn test_mirroring() {
        assert!(!Mirroring::OffDiagonal.mirrors(2, 2));
        assert!(Mirroring::OffDiagonal.mirrors(2, 1));
        assert!(Mirroring::All.mirrors(2, 2));
    }
}
