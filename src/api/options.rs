//! Contains the [`KmeansOptions`] configuration record.

use crate::{kmeans::check_cluster_count, Error, Result};

/// A builder struct to specify the parameters for k-means.
///
/// # Examples
/// ```
/// # use chromaseg::KmeansOptions;
/// let options = KmeansOptions::new(5)
///     .max_iterations(50)
///     .seed(42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KmeansOptions {
    /// The number of clusters.
    pub(crate) k: usize,
    /// The maximum number of centroid updates before giving up on convergence.
    pub(crate) max_iterations: u32,
    /// The seed value for the random number generator.
    pub(crate) seed: u64,
}

impl KmeansOptions {
    /// The default iteration cap.
    pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

    /// Creates a new [`KmeansOptions`] for `k` clusters with default values for the rest.
    #[must_use]
    pub const fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            seed: 0,
        }
    }

    /// Sets the number of clusters.
    #[must_use]
    pub const fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sets the maximum number of iterations.
    ///
    /// Reaching this cap is not an error; the current clustering is returned as is.
    ///
    /// The default is [`KmeansOptions::DEFAULT_MAX_ITERATIONS`].
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the seed value for the random number generator.
    ///
    /// The default seed is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Gets the number of clusters.
    #[must_use]
    pub const fn get_k(&self) -> usize {
        self.k
    }

    /// Gets the maximum number of iterations.
    #[must_use]
    pub const fn get_max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Gets the random seed.
    #[must_use]
    pub const fn get_seed(&self) -> u64 {
        self.seed
    }

    /// Checks that these options can be used to cluster `n_samples` samples.
    ///
    /// # Errors
    /// - [`Error::EmptyInput`] if `n_samples` is `0`.
    /// - [`Error::InvalidClusterCount`] if `k` is `0` or greater than `n_samples`.
    /// - [`Error::InvalidMaxIterations`] if the iteration cap is `0`.
    pub fn validate(&self, n_samples: usize) -> Result<()> {
        check_cluster_count(self.k, n_samples)?;
        if self.max_iterations == 0 {
            Err(Error::InvalidMaxIterations)
        } else {
            Ok(())
        }
    }
}
