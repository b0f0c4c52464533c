//! Error types for segmentation and deblending.

use thiserror::Error;

use crate::pixel_group::GroupId;

/// Errors that can occur while scanning or deblending.
///
/// All variants abort the operation in progress; no group is emitted after
/// an error has been returned.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Row {row} has {actual} pixels, expected {expected} (row length is fixed by the first row)")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Inconsistent segmentation state at row {row}, column {column}: {reason}")]
    MarkerInconsistency {
        row: usize,
        column: usize,
        reason: &'static str,
    },

    #[error("Cannot deblend pixel group {id}: it has no pixels")]
    EmptyGroup { id: GroupId },

    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
