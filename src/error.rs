use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KDTreeError {
    /// No stored point equals the requested point.
    #[error("No point found at {point}")]
    NotFound {
        /// The point that was searched for, formatted for display.
        point: String,
    },

    /// A lookup was attempted on an index that holds no points.
    #[error("Index is empty, trying to find {point}")]
    EmptyIndex {
        /// The point that was searched for, formatted for display.
        point: String,
    },

    /// A point did not have as many coordinates as the index has dimensions.
    #[error("Expected a point with {expected} coordinates, got {actual}")]
    DimensionMismatch {
        /// The number of dimensions of the index.
        expected: usize,
        /// The number of coordinates that were provided.
        actual: usize,
    },

    /// An index cannot be created with this many dimensions.
    #[error("Invalid number of dimensions: {0}")]
    InvalidDimensions(usize),
}

impl KDTreeError {
    pub(crate) fn not_found<N: Debug>(point: &[N]) -> Self {
        Self::NotFound {
            point: format!("{:?}", point),
        }
    }

    pub(crate) fn empty_index<N: Debug>(point: &[N]) -> Self {
        Self::EmptyIndex {
            point: format!("{:?}", point),
        }
    }

    /// Returns `true` for a plain query miss, as opposed to misuse of the index.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, KDTreeError>;

/// Fail with [`KDTreeError::DimensionMismatch`] unless `point` has exactly `dims` coordinates.
#[inline]
pub(crate) fn check_dims<N>(point: &[N], dims: usize) -> Result<()> {
    if point.len() != dims {
        return Err(KDTreeError::DimensionMismatch {
            expected: dims,
            actual: point.len(),
        });
    }
    Ok(())
}
