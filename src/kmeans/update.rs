use super::Centroids;

use crate::{AssignmentTable, Feature, Sample};

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Per-centroid running sums of assigned sample features.
struct Sums {
    /// The per-channel sum for each centroid.
    components: Vec<Feature>,
    /// The number of samples summed for each centroid.
    counts: Vec<u32>,
}

impl Sums {
    /// Creates zeroed sums for `k` centroids.
    fn new(k: usize) -> Self {
        Self {
            components: vec![[0.0; 3]; k],
            counts: vec![0; k],
        }
    }

    /// Adds each sample's feature to the sums of its assigned centroid.
    /// Unassigned samples are skipped.
    fn add_samples(&mut self, samples: &[Sample], labels: &[u32]) {
        for (sample, &label) in samples.iter().zip(labels) {
            if label == AssignmentTable::UNASSIGNED {
                continue;
            }
            let i = label as usize;
            let sum = &mut self.components[i];
            for (s, &c) in sum.iter_mut().zip(&sample.feature) {
                *s += c;
            }
            self.counts[i] += 1;
        }
    }

    /// Moves each centroid with at least one sample to the mean of its samples.
    fn apply(&self, centroids: &mut Centroids) {
        for ((centroid, sum), &count) in centroids
            .as_mut_slice()
            .iter_mut()
            .zip(&self.components)
            .zip(&self.counts)
        {
            move_to_mean(centroid, sum, count);
        }
    }
}

/// Sets `centroid` to `sum / count`, leaving it in place if `count` is `0`.
#[inline]
fn move_to_mean(centroid: &mut Feature, sum: &Feature, count: u32) {
    if count > 0 {
        let n = f64::from(count);
        *centroid = sum.map(|s| s / n);
    }
}

/// Recomputes each centroid as the mean of the samples assigned to it.
///
/// Centroids with no assigned samples keep their previous position.
///
/// # Panics
/// Panics if `table` does not have exactly one entry per sample,
/// or if it refers to a centroid index outside of `centroids`.
pub fn update(samples: &[Sample], table: &AssignmentTable, centroids: &mut Centroids) {
    assert_eq!(samples.len(), table.len());
    let mut sums = Sums::new(centroids.len());
    sums.add_samples(samples, table.as_raw());
    sums.apply(centroids);
}

/// Recomputes each centroid as the mean of its assigned samples in parallel.
///
/// Member lists are gathered for contiguous chunks of samples in parallel,
/// then each centroid sums its members in sample order on its own thread.
/// This adds the same values in the same order as [`update`], so the result is bit-identical.
///
/// # Panics
/// See [`update`].
#[cfg(feature = "threads")]
pub fn update_par(samples: &[Sample], table: &AssignmentTable, centroids: &mut Centroids) {
    assert_eq!(samples.len(), table.len());

    let k = centroids.len();
    let chunk_size = samples.len().div_ceil(rayon::current_num_threads()).max(1);

    let members = table
        .as_raw()
        .par_chunks(chunk_size)
        .enumerate()
        .map(|(chunk, labels)| {
            let offset = chunk * chunk_size;
            let mut members = vec![Vec::new(); k];
            for (i, &label) in labels.iter().enumerate() {
                if label != AssignmentTable::UNASSIGNED {
                    members[label as usize].push(offset + i);
                }
            }
            members
        })
        .collect::<Vec<_>>();

    centroids
        .as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, centroid)| {
            let mut sum = [0.0; 3];
            let mut count = 0u32;
            for &index in members.iter().flat_map(|chunk| &chunk[i]) {
                for (s, &c) in sum.iter_mut().zip(&samples[index].feature) {
                    *s += c;
                }
                count += 1;
            }
            move_to_mean(centroid, &sum, count);
        });
}
