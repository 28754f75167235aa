//! The error type returned when a segmentation run is misconfigured.

use thiserror::Error;

/// Errors reported before any clustering work begins.
///
/// Conditions that arise during clustering (empty clusters, hitting the iteration cap)
/// are not errors; see [`Termination`](crate::kmeans::Termination).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// There are no samples to cluster (e.g., an image with zero pixels).
    #[error("empty input")]
    EmptyInput,

    /// The requested number of clusters is zero or exceeds the number of samples.
    #[error("invalid cluster count: requested {requested}, but there are {n_samples} samples")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of samples available.
        n_samples: usize,
    },

    /// The iteration cap must allow at least one iteration.
    #[error("max iterations must be at least 1")]
    InvalidMaxIterations,

    /// The number of pixels does not match `width * height`.
    #[error("dimension mismatch: expected {expected} pixels, found {found}")]
    DimensionMismatch {
        /// `width * height`.
        expected: usize,
        /// Number of pixels provided.
        found: usize,
    },

    /// The input is longer than the maximum supported length.
    ///
    /// The inner value is the maximum supported length.
    #[error("above the maximum length of {0}")]
    AboveMaxLen(u32),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
