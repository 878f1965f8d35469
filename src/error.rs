/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Error type for matrix construction, search parameters and snapshot restore.
//!
//! Scoring and penalty evaluation never fail: missing identities score zero,
//! unknown tier symbols are skipped and out-of-range reads yield zero. Only
//! caller preconditions surface here.

use thiserror::Error;

/// Errors raised by the calibration core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// A matrix must have at least one row and one column.
    #[error("matrix must have at least one row and one column")]
    EmptyMatrix,

    /// A row's length differs from the first row's.
    #[error("row {row} has {len} columns, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// Length of row 0.
        expected: usize,
    },

    /// A matrix entry is negative, NaN or infinite.
    #[error("entry ({row}, {col}) = {value} is not a finite non-negative number")]
    InvalidEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
        /// The rejected value.
        value: f64,
    },

    /// The search step must be finite and strictly positive.
    #[error("step size {0} must be finite and greater than zero")]
    InvalidStepSize(f64),

    /// The motion limit must be finite and not negative.
    #[error("motion limit {0} must be finite and not negative")]
    InvalidMotionLimit(f64),

    /// A priority identity does not index both matrix dimensions.
    #[error("priority index {index} is outside the {rows}x{cols} matrix")]
    PriorityOutOfRange {
        /// The rejected priority index.
        index: usize,
        /// Matrix row count.
        rows: usize,
        /// Matrix column count.
        cols: usize,
    },

    /// Two matrices that must share a shape do not.
    #[error("matrix shape {found:?} does not match expected {expected:?}")]
    DimensionMismatch {
        /// Expected (rows, cols).
        expected: (usize, usize),
        /// Found (rows, cols).
        found: (usize, usize),
    },
}
