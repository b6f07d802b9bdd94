//! Triplet representation of a sparse matrix entry

use core::cmp::Ordering;

/// A nonzero entry of a sparse matrix
///
/// Indices are zero-based. They are signed so that the in-memory layout
/// matches the 8-byte signed offsets stored in MTB records.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triplet<T> {
    pub row: i64,
    pub col: i64,
    pub val: T,
}

impl<T: Copy> Triplet<T> {
    pub const fn new(row: i64, col: i64, val: T) -> Self {
        Self { row, col, val }
    }

    /// The entry reflected across the diagonal
    pub fn transposed(&self) -> Self {
        Self {
            row: self.col,
            col: self.row,
            val: self.val,
        }
    }

    pub const fn is_diagonal(&self) -> bool {
        self.row == self.col
    }

    /// Row-major position order: by row, ties broken by column
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

/// Check that a slice of triplets is in row-major order
pub fn is_row_major<T: Copy>(triplets: &[Triplet<T>]) -> bool {
    triplets
        .windows(2)
        .all(|pair| pair[0].cmp_position(&pair[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transposed() {
        let t = Triplet::new(3, 1, 2.5f64);
        assert_eq!(t.transposed(), Triplet::new(1, 3, 2.5));
        assert!(!t.is_diagonal());
        assert!(Triplet::new(2, 2, 0i32).is_diagonal());
    }

    #[test]
    fn test_row_major_order() {
        let sorted = [
            Triplet::new(0, 0, 1),
            Triplet::new(0, 0, 1),
            Triplet::new(0, 4, 1),
            Triplet::new(1, 0, 1),
        ];
        assert!(is_row_major(&sorted));

        let unsorted = [Triplet::new(1, 0, 1), Triplet::new(0, 1, 1)];
        assert!(!is_row_major(&unsorted));
        assert_eq!(
            unsorted[0].cmp_position(&unsorted[1]),
            Ordering::Greater
        );
    }
}
