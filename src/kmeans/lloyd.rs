use super::{assign, check_cluster_count, seed, update, Centroids};

use crate::{squared_distance, AssignmentTable, Error, KmeansOptions, Result, Sample};

use std::fmt::Display;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_xoshiro::Xoroshiro128PlusPlus;

#[cfg(feature = "threads")]
use super::{assign_par, seed_par, update_par};

/// How the convergence loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// An assignment step left every sample in the same cluster.
    Converged,
    /// The iteration cap was reached while assignments were still changing.
    ///
    /// This is not an error; the clustering is still a usable best-effort result.
    Exhausted,
}

impl Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::Exhausted => write!(f, "exhausted its iterations"),
        }
    }
}

/// The result of running k-means to completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// The final cluster centers.
    pub centroids: Centroids,
    /// The final cluster index for each sample.
    pub assignments: AssignmentTable,
    /// The number of centroid updates performed.
    pub iterations: u32,
    /// Whether the loop converged or hit the iteration cap.
    pub termination: Termination,
}

impl Segmentation {
    /// Returns `true` if the loop stopped because assignments no longer changed.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Returns the number of samples in each cluster.
    #[must_use]
    pub fn counts(&self) -> Vec<u32> {
        self.assignments.counts(self.centroids.len())
    }

    /// Returns the total squared distance from each sample to its cluster's centroid.
    ///
    /// `samples` must be the samples this segmentation was computed from.
    #[must_use]
    pub fn inertia(&self, samples: &[Sample]) -> f64 {
        samples
            .iter()
            .zip(self.assignments.iter())
            .filter_map(|(sample, label)| {
                label.map(|i| squared_distance(&sample.feature, &self.centroids[i]))
            })
            .sum()
    }
}

/// Alternates assignment and update steps until convergence or `max_iterations` updates.
fn lloyd(
    samples: &[Sample],
    mut centroids: Centroids,
    max_iterations: u32,
    assign: impl Fn(&[Sample], &Centroids, &mut AssignmentTable) -> bool,
    update: impl Fn(&[Sample], &AssignmentTable, &mut Centroids),
) -> Segmentation {
    let mut assignments = AssignmentTable::new(samples.len());
    let mut iterations = 0;

    let termination = loop {
        let changed = assign(samples, &centroids, &mut assignments);
        debug!(
            "iteration {}: {}",
            iterations + 1,
            if changed { "changed" } else { "unchanged" }
        );
        if !changed {
            break Termination::Converged;
        }

        update(samples, &assignments, &mut centroids);
        iterations += 1;
        if iterations >= max_iterations {
            break Termination::Exhausted;
        }
    };

    match termination {
        Termination::Converged => info!("k-means {termination} after {iterations} iterations"),
        Termination::Exhausted => warn!("k-means {termination} after {iterations} iterations"),
    }

    Segmentation { centroids, assignments, iterations, termination }
}

/// Validates the inputs of [`run_from`] and [`run_from_par`].
fn check_run_from(samples: &[Sample], centroids: &Centroids, max_iterations: u32) -> Result<()> {
    check_cluster_count(centroids.len(), samples.len())?;
    if max_iterations == 0 {
        Err(Error::InvalidMaxIterations)
    } else {
        Ok(())
    }
}

/// Runs k-means++ seeding followed by Lloyd iterations.
///
/// The random number generator is seeded from `options`, so the result is fully determined
/// by `samples` and `options`.
///
/// # Errors
/// Returns an error if the options are invalid for the given samples
/// (see [`KmeansOptions::validate`]). Nothing is computed in that case.
///
/// # Examples
/// ```
/// # use chromaseg::{kmeans, KmeansOptions, Sample};
/// # fn main() -> Result<(), chromaseg::Error> {
/// let samples = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [100.0, 0.0, 0.0], [101.0, 0.0, 0.0]]
///     .into_iter()
///     .enumerate()
///     .map(|(x, feature)| Sample::new(feature, (x as u32, 0)))
///     .collect::<Vec<_>>();
///
/// let result = kmeans::run(&samples, &KmeansOptions::new(2).seed(7))?;
/// assert!(result.converged());
/// assert_eq!(result.assignments.get(0), result.assignments.get(1));
/// assert_ne!(result.assignments.get(1), result.assignments.get(2));
/// # Ok(())
/// # }
/// ```
pub fn run(samples: &[Sample], options: &KmeansOptions) -> Result<Segmentation> {
    options.validate(samples.len())?;
    info!(
        "running k-means on {} samples with k = {}, max iterations = {}, seed = {}",
        samples.len(),
        options.k,
        options.max_iterations,
        options.seed
    );

    let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(options.seed);
    let centroids = seed(samples, options.k, rng)?;
    Ok(lloyd(samples, centroids, options.max_iterations, assign, update))
}

/// Runs Lloyd iterations starting from the given centroids, skipping seeding.
///
/// # Errors
/// Returns an error if `centroids` is empty or has more entries than there are samples,
/// if `samples` is empty, or if `max_iterations` is `0`.
pub fn run_from(
    samples: &[Sample],
    centroids: Centroids,
    max_iterations: u32,
) -> Result<Segmentation> {
    check_run_from(samples, &centroids, max_iterations)?;
    Ok(lloyd(samples, centroids, max_iterations, assign, update))
}

/// Runs k-means++ seeding followed by Lloyd iterations in parallel.
///
/// Seeding and assignment give identical results to [`run`].
/// Centroid means are summed in a different order, see [`update_par`].
///
/// # Errors
/// See [`run`].
#[cfg(feature = "threads")]
pub fn run_par(samples: &[Sample], options: &KmeansOptions) -> Result<Segmentation> {
    options.validate(samples.len())?;
    info!(
        "running parallel k-means on {} samples with k = {}, max iterations = {}, seed = {}",
        samples.len(),
        options.k,
        options.max_iterations,
        options.seed
    );

    let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(options.seed);
    let centroids = seed_par(samples, options.k, rng)?;
    Ok(lloyd(samples, centroids, options.max_iterations, assign_par, update_par))
}

/// Runs Lloyd iterations in parallel starting from the given centroids.
///
/// # Errors
/// See [`run_from`].
#[cfg(feature = "threads")]
pub fn run_from_par(
    samples: &[Sample],
    centroids: Centroids,
    max_iterations: u32,
) -> Result<Segmentation> {
    check_run_from(samples, &centroids, max_iterations)?;
    Ok(lloyd(samples, centroids, max_iterations, assign_par, update_par))
}
