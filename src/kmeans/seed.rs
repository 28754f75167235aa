use super::Centroids;

use crate::{squared_distance, Error, Feature, Result, Sample};

use log::trace;
use rand::Rng;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Checks that `k` centroids can be seeded from `n_samples` samples.
///
/// # Errors
/// Returns [`Error::EmptyInput`] if there are no samples, or
/// [`Error::InvalidClusterCount`] if `k` is `0` or greater than `n_samples`.
pub fn check_cluster_count(k: usize, n_samples: usize) -> Result<()> {
    if n_samples == 0 {
        Err(Error::EmptyInput)
    } else if k == 0 || k > n_samples {
        Err(Error::InvalidClusterCount { requested: k, n_samples })
    } else {
        Ok(())
    }
}

/// Picks the index where the running sum of `weights` first reaches `threshold`.
///
/// Zero-weight entries are never picked unless every weight is zero.
/// If rounding keeps the running sum below `threshold`, the last positive-weight
/// entry is returned instead.
fn weighted_pick(weights: &[f64], threshold: f64) -> usize {
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &weight) in weights.iter().enumerate() {
        if weight > 0.0 {
            cumulative += weight;
            if cumulative >= threshold {
                return i;
            }
            last_positive = Some(i);
        }
    }
    last_positive.unwrap_or(weights.len() - 1)
}

/// The shared k-means++ loop.
///
/// `update_distances` lowers each entry of the distance buffer to the squared distance
/// between its sample and the newly chosen centroid, if that is closer.
fn seed_with(
    samples: &[Sample],
    k: usize,
    rng: &mut impl Rng,
    update_distances: impl Fn(&[Sample], &Feature, &mut [f64]),
) -> Result<Centroids> {
    check_cluster_count(k, samples.len())?;

    let first = rng.gen_range(0..samples.len());
    trace!("seeded centroid 0 from sample {first}");

    let mut centroids = Vec::with_capacity(k);
    centroids.push(samples[first].feature);

    let mut distances = vec![f64::INFINITY; samples.len()];
    let mut latest = samples[first].feature;
    for i in 1..k {
        update_distances(samples, &latest, &mut distances);

        // summed in sample order so the single and multi-threaded versions agree
        let total = distances.iter().sum::<f64>();
        let threshold = rng.gen::<f64>() * total;
        let chosen = weighted_pick(&distances, threshold);
        trace!("seeded centroid {i} from sample {chosen}");

        latest = samples[chosen].feature;
        centroids.push(latest);
    }

    Ok(Centroids::new(centroids))
}

/// Chooses `k` initial centroids from `samples` using k-means++ seeding.
///
/// The first centroid is a uniformly random sample. Each following centroid is a sample drawn
/// with probability proportional to its squared distance from the nearest centroid chosen so far.
/// Centroids are copies of sample features and are not guaranteed to be distinct.
///
/// # Errors
/// Returns [`Error::EmptyInput`] if `samples` is empty, or
/// [`Error::InvalidClusterCount`] if `k` is `0` or greater than `samples.len()`.
/// No random values are drawn in either case.
pub fn seed(samples: &[Sample], k: usize, rng: &mut impl Rng) -> Result<Centroids> {
    seed_with(samples, k, rng, |samples, latest, distances| {
        for (distance, sample) in distances.iter_mut().zip(samples) {
            *distance = distance.min(squared_distance(&sample.feature, latest));
        }
    })
}

/// Chooses `k` initial centroids from `samples` in parallel using k-means++ seeding.
///
/// The result is identical to [`seed`] given the same `rng` state.
///
/// # Errors
/// See [`seed`].
#[cfg(feature = "threads")]
pub fn seed_par(samples: &[Sample], k: usize, rng: &mut impl Rng) -> Result<Centroids> {
    seed_with(samples, k, rng, |samples, latest, distances| {
        distances
            .par_iter_mut()
            .zip(samples)
            .for_each(|(distance, sample)| {
                *distance = distance.min(squared_distance(&sample.feature, latest));
            });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use rand::{RngCore, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    fn rng(seed: u64) -> Xoroshiro128PlusPlus {
        Xoroshiro128PlusPlus::seed_from_u64(seed)
    }

    /// Replays a fixed list of raw outputs.
    ///
    /// A raw output of `0` makes `gen_range(0..n)` return `0`, and [`unit`]
    /// gives a raw output that `gen::<f64>()` turns back into the same fraction.
    struct ScriptedRng(std::vec::IntoIter<u64>);

    impl ScriptedRng {
        fn new(outputs: &[u64]) -> Self {
            Self(outputs.to_vec().into_iter())
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            #[allow(clippy::cast_possible_truncation)]
            let value = self.next_u64() as u32;
            value
        }

        fn next_u64(&mut self) -> u64 {
            self.0.next().expect("script ran out of values")
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    /// The raw output that `gen::<f64>()` maps to `fraction` (exact for multiples of `2^-53`).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn unit(fraction: f64) -> u64 {
        ((fraction * (1u64 << 53) as f64) as u64) << 11
    }

    #[test]
    fn rejects_bad_cluster_counts() {
        let samples = two_pairs();
        assert_eq!(
            seed(&samples, 0, &mut rng(0)),
            Err(Error::InvalidClusterCount { requested: 0, n_samples: 4 })
        );
        assert_eq!(
            seed(&samples, 5, &mut rng(0)),
            Err(Error::InvalidClusterCount { requested: 5, n_samples: 4 })
        );
        assert_eq!(seed(&[], 1, &mut rng(0)), Err(Error::EmptyInput));
    }

    #[test]
    fn bad_cluster_count_draws_nothing() {
        let mut used = rng(3);
        let _ = seed(&two_pairs(), 9, &mut used);
        let mut fresh = rng(3);
        assert_eq!(used.gen::<u64>(), fresh.gen::<u64>());
    }

    #[test]
    fn weighted_pick_follows_cumulative_sum() {
        let weights = [1.0, 0.0, 2.0, 3.0];
        assert_eq!(weighted_pick(&weights, 0.0), 0);
        assert_eq!(weighted_pick(&weights, 1.0), 0);
        assert_eq!(weighted_pick(&weights, 1.5), 2);
        assert_eq!(weighted_pick(&weights, 3.0), 2);
        assert_eq!(weighted_pick(&weights, 3.5), 3);
    }

    #[test]
    fn weighted_pick_falls_back_to_last_positive() {
        assert_eq!(weighted_pick(&[1.0, 2.0, 0.0], 3.0 + 1e-9), 1);
        assert_eq!(weighted_pick(&[0.0, 0.0, 0.0], 0.0), 2);
    }

    #[test]
    fn zero_threshold_skips_chosen_samples() {
        assert_eq!(weighted_pick(&[0.0, 0.0, 4.0, 1.0], 0.0), 2);
    }

    #[test]
    fn weights_are_squared_distance_to_nearest_centroid() {
        let samples = samples_from_features(&[
            [0.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
        ]);
        // first pick: sample 0
        // second pick: weights [0, 4, 16, 100], threshold 30 -> sample 3
        //   (plain distances [0, 2, 4, 10] would give threshold 4 -> sample 2)
        // third pick: weights [0, 4, 16, 0], threshold 10 -> sample 2
        //   (distances to the latest centroid only, [100, 64, 36, 0], would give sample 0)
        let script = [0, unit(0.25), unit(0.5)];

        let centroids = seed(&samples, 3, &mut ScriptedRng::new(&script)).unwrap();
        assert_eq!(
            centroids.into_inner(),
            vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [4.0, 0.0, 0.0]]
        );

        #[cfg(feature = "threads")]
        assert_eq!(
            seed_par(&samples, 3, &mut ScriptedRng::new(&script))
                .unwrap()
                .into_inner(),
            vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [4.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn far_samples_are_picked_by_squared_distance() {
        // with the origin chosen first, sample 1 has weight 1 and sample 2 has weight 9
        let mut features = vec![[0.0; 3]; 8];
        features.push([1.0, 0.0, 0.0]);
        features.push([3.0, 0.0, 0.0]);
        let samples = samples_from_features(&features);

        let mut rng = rng(99);
        let mut near = 0u32;
        let mut total = 0u32;
        for _ in 0..20_000 {
            let centroids = seed(&samples, 2, &mut rng).unwrap();
            if centroids[0] == [0.0; 3] {
                total += 1;
                if centroids[1] == [1.0, 0.0, 0.0] {
                    near += 1;
                } else {
                    assert_eq!(centroids[1], [3.0, 0.0, 0.0]);
                }
            }
        }

        let share = f64::from(near) / f64::from(total);
        assert!((0.08..0.12).contains(&share), "near share {share}");
    }

    #[test]
    fn seeds_exactly_k_centroids() {
        let samples = test_samples_1024();
        for k in [1, 2, 7, 64] {
            let centroids = seed(&samples, k, &mut rng(1)).unwrap();
            assert_eq!(centroids.len(), k);
            for centroid in centroids.as_slice() {
                assert!(samples.iter().any(|s| s.feature == *centroid));
            }
        }
    }

    #[test]
    fn never_reseeds_a_covered_color() {
        // once one color is chosen, only the other color has positive weight
        let samples = samples_from_features(&[
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [50.0, 50.0, 50.0],
        ]);
        for s in 0..16 {
            let mut centroids = seed(&samples, 2, &mut rng(s)).unwrap().into_inner();
            centroids.sort_by(|a, b| a[0].total_cmp(&b[0]));
            assert_eq!(centroids, vec![[0.0, 0.0, 0.0], [50.0, 50.0, 50.0]]);
        }
    }

    #[test]
    fn k_equal_to_sample_count_picks_every_sample() {
        let samples = samples_from_features(&[
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [0.0, 20.0, 0.0],
            [0.0, 0.0, 30.0],
            [40.0, 40.0, 40.0],
        ]);
        let mut centroids = seed(&samples, samples.len(), &mut rng(5))
            .unwrap()
            .into_inner();
        centroids.sort_by(|a, b| a.iter().sum::<f64>().total_cmp(&b.iter().sum::<f64>()));

        let mut expected = samples.iter().map(|s| s.feature).collect::<Vec<_>>();
        expected.sort_by(|a, b| a.iter().sum::<f64>().total_cmp(&b.iter().sum::<f64>()));
        assert_eq!(centroids, expected);
    }

    #[test]
    fn same_seed_same_centroids() {
        let samples = test_samples_1024();
        let a = seed(&samples, 16, &mut rng(42)).unwrap();
        let b = seed(&samples, 16, &mut rng(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let samples = test_samples_1024();
        for k in [1, 5, 32] {
            let single = seed(&samples, k, &mut rng(7)).unwrap();
            let par = seed_par(&samples, k, &mut rng(7)).unwrap();
            assert_eq!(single, par);
        }
    }
}
