/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Dense pairwise compatibility matrix.
//!
//! Row index is the younger identity, column index the older one; `get(a, b)`
//! is the directed compatibility strength of `a` toward `b`.
//!
//! # Invariants
//!
//! - **Non-negative**: every entry is finite and `>= 0`. Construction rejects
//!   anything else, and [`CompatibilityMatrix::set`] clamps at zero.
//! - **Rectangular**: all rows share one length; at least one row and column.
//! - **Tolerant reads**: [`CompatibilityMatrix::get`] returns `0.0` for any
//!   out-of-range index instead of failing, so sparse lineages still score.
//! - **Value semantics**: `Clone` is a deep copy. Snapshots taken by the
//!   optimizer never alias the working copy.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::CalibrationError;

/// Rectangular matrix of non-negative compatibility strengths, stored row-major.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")
)]
pub struct CompatibilityMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl CompatibilityMatrix {
    /// Build a `rows × cols` matrix with every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Self, CalibrationError> {
        if rows == 0 || cols == 0 {
            return Err(CalibrationError::EmptyMatrix);
        }
        if !value.is_finite() || value < 0.0 {
            return Err(CalibrationError::InvalidEntry { row: 0, col: 0, value });
        }
        Ok(Self {
            rows,
            cols,
            values: vec![value; rows * cols],
        })
    }

    /// Build a matrix from nested rows, validating shape and entries.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, CalibrationError> {
        let first = rows.first().ok_or(CalibrationError::EmptyMatrix)?;
        let cols = first.as_ref().len();
        if cols == 0 {
            return Err(CalibrationError::EmptyMatrix);
        }

        let mut values = Vec::with_capacity(rows.len() * cols);
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(CalibrationError::RaggedRow {
                    row: r,
                    len: row.len(),
                    expected: cols,
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(CalibrationError::InvalidEntry { row: r, col: c, value });
                }
                values.push(value);
            }
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            values,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Read entry `(row, col)`, or `0.0` when either index is out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row < self.rows && col < self.cols {
            self.values[row * self.cols + col]
        } else {
            0.0
        }
    }

    /// Read entry `(row, col)` when both indices are in range.
    pub fn try_get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.rows && col < self.cols).then(|| self.values[row * self.cols + col])
    }

    /// Write entry `(row, col)`, clamped to `>= 0`.
    ///
    /// Returns `false` (and writes nothing) when the index is out of range or
    /// the value is NaN.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> bool {
        if row >= self.rows || col >= self.cols || value.is_nan() {
            return false;
        }
        self.values[row * self.cols + col] = value.max(0.0);
        true
    }

    /// Iterate over one row, or an empty slice when out of range.
    pub fn row(&self, row: usize) -> &[f64] {
        if row < self.rows {
            &self.values[row * self.cols..(row + 1) * self.cols]
        } else {
            &[]
        }
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.cols).map(|r| r.to_vec()).collect()
    }

    /// Cells whose value differs from `other` at the same position.
    ///
    /// Only the overlapping region is compared.
    pub fn changed_cells(&self, other: &Self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for r in 0..self.rows.min(other.rows) {
            for c in 0..self.cols.min(other.cols) {
                if self.get(r, c) != other.get(r, c) {
                    out.push((r, c));
                }
            }
        }
        out
    }

    /// Largest absolute difference from `other` over the overlapping region.
    pub fn max_deviation(&self, other: &Self) -> f64 {
        let mut max = 0.0f64;
        for r in 0..self.rows.min(other.rows) {
            for c in 0..self.cols.min(other.cols) {
                let a = self.get(r, c);
                let b = other.get(r, c);
                let d = if a > b { a - b } else { b - a };
                max = max.max(d);
            }
        }
        max
    }
}

impl TryFrom<Vec<Vec<f64>>> for CompatibilityMatrix {
    type Error = CalibrationError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<CompatibilityMatrix> for Vec<Vec<f64>> {
    fn from(m: CompatibilityMatrix) -> Self {
        m.to_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_roundtrips_values() {
        let m = CompatibilityMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(m.get(1, 0), 3.0);
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let rows: [[f64; 0]; 0] = [];
        assert_eq!(CompatibilityMatrix::from_rows(&rows), Err(CalibrationError::EmptyMatrix));
        let rows: [[f64; 0]; 1] = [[]];
        assert_eq!(CompatibilityMatrix::from_rows(&rows), Err(CalibrationError::EmptyMatrix));
        assert_eq!(CompatibilityMatrix::filled(0, 3, 1.0), Err(CalibrationError::EmptyMatrix));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows: Vec<Vec<f64>> = vec![vec![1.0, 2.0], vec![3.0]];
        assert_eq!(
            CompatibilityMatrix::from_rows(&rows),
            Err(CalibrationError::RaggedRow { row: 1, len: 1, expected: 2 })
        );
    }

    #[test]
    fn test_negative_and_nan_entries_rejected() {
        assert!(matches!(
            CompatibilityMatrix::from_rows(&[[1.0, -0.5]]),
            Err(CalibrationError::InvalidEntry { row: 0, col: 1, .. })
        ));
        assert!(CompatibilityMatrix::from_rows(&[[f64::NAN]]).is_err());
        assert!(CompatibilityMatrix::filled(2, 2, f64::INFINITY).is_err());
    }

    #[test]
    fn test_out_of_range_reads_are_zero() {
        let m = CompatibilityMatrix::filled(2, 3, 7.0).unwrap();
        assert_eq!(m.get(1, 2), 7.0);
        assert_eq!(m.get(2, 0), 0.0);
        assert_eq!(m.get(0, 3), 0.0);
        assert_eq!(m.get(usize::MAX, usize::MAX), 0.0);
        assert_eq!(m.try_get(2, 0), None);
        assert!(m.row(5).is_empty());
    }

    #[test]
    fn test_set_clamps_at_zero() {
        let mut m = CompatibilityMatrix::filled(1, 1, 5.0).unwrap();
        assert!(m.set(0, 0, -3.0));
        assert_eq!(m.get(0, 0), 0.0);
        assert!(!m.set(1, 0, 1.0));
        assert!(!m.set(0, 0, f64::NAN));
        assert_eq!(m.get(0, 0), 0.0);
    }

    #[test]
    fn test_clone_is_independent() {
        let a = CompatibilityMatrix::filled(2, 2, 1.0).unwrap();
        let mut b = a.clone();
        b.set(0, 1, 9.0);
        assert_eq!(a.get(0, 1), 1.0);
        assert_eq!(b.changed_cells(&a), vec![(0, 1)]);
        assert_eq!(b.max_deviation(&a), 8.0);
    }
}
