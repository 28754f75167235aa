use super::Centroids;

use crate::{AssignmentTable, Sample};

#[cfg(feature = "threads")]
use {
    rayon::prelude::*,
    std::sync::atomic::{AtomicBool, Ordering},
};

/// Labels each sample in the chunk with its nearest centroid.
/// Returns whether any label differs from its previous value.
#[inline]
fn assign_chunk(samples: &[Sample], centroids: &Centroids, labels: &mut [u32]) -> bool {
    let mut changed = false;
    for (label, sample) in labels.iter_mut().zip(samples) {
        #[allow(clippy::cast_possible_truncation)]
        let nearest = centroids.nearest(&sample.feature) as u32; // k <= MAX_PIXELS
        if *label != nearest {
            *label = nearest;
            changed = true;
        }
    }
    changed
}

/// Assigns every sample to its nearest centroid by Euclidean distance in feature space.
///
/// Ties are broken in favor of the lowest centroid index.
/// Returns `true` if at least one sample's assignment changed, where a previously
/// unassigned sample always counts as a change.
///
/// # Panics
/// Panics if `table` does not have exactly one entry per sample.
pub fn assign(samples: &[Sample], centroids: &Centroids, table: &mut AssignmentTable) -> bool {
    assert_eq!(samples.len(), table.len());
    assign_chunk(samples, centroids, table.as_raw_mut())
}

/// Assigns every sample to its nearest centroid in parallel.
///
/// The samples are split into contiguous chunks, one per unit of work, and each worker
/// writes only the table entries for its own chunk.
/// Workers only touch the shared "changed" flag once, after finishing their chunk.
///
/// The resulting table and return value are identical to [`assign`].
///
/// # Panics
/// Panics if `table` does not have exactly one entry per sample.
#[cfg(feature = "threads")]
pub fn assign_par(samples: &[Sample], centroids: &Centroids, table: &mut AssignmentTable) -> bool {
    assert_eq!(samples.len(), table.len());

    let chunk_size = samples.len().div_ceil(rayon::current_num_threads()).max(1);
    let changed = AtomicBool::new(false);

    table
        .as_raw_mut()
        .par_chunks_mut(chunk_size)
        .zip(samples.par_chunks(chunk_size))
        .for_each(|(labels, samples)| {
            if assign_chunk(samples, centroids, labels) {
                changed.store(true, Ordering::Relaxed);
            }
        });

    changed.into_inner()
}
