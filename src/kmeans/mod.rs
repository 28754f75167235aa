//! Lloyd's k-means clustering over color features.
//!
//! The algorithm is split into its individual steps so that each can be used and tested on
//! its own:
//! - [`seed`]: k-means++ seeding (weighted furthest-point sampling).
//! - [`assign`]: label every sample with its nearest centroid.
//! - [`update`]: move every centroid to the mean of its samples.
//! - [`run`]: the convergence loop tying the three together.
//!
//! Each step also has a parallel `_par` version (needs the `threads` feature)
//! that gives identical results for the same input and random seed.
//!
//! A centroid that ends up with no samples keeps its previous position.
//! Empty clusters are not reseeded.

mod assign;
mod lloyd;
mod seed;
mod update;

pub use assign::*;
pub use lloyd::*;
pub use seed::*;
pub use update::*;

use crate::Feature;
use std::ops::Index;

/// The `k` running cluster centers.
///
/// The number of centroids is fixed once created.
/// Only their positions change, via [`update`].
#[derive(Debug, Clone, PartialEq)]
#[repr(transparent)]
pub struct Centroids(Vec<Feature>);

impl Centroids {
    /// Creates a set of centroids from explicit positions.
    #[must_use]
    pub fn new(centroids: Vec<Feature>) -> Self {
        Self(centroids)
    }

    /// Returns the inner `Vec` of centroid positions.
    #[must_use]
    pub fn into_inner(self) -> Vec<Feature> {
        self.0
    }

    /// Returns the number of centroids, `k`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no centroids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the centroid positions as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Feature] {
        &self.0
    }

    /// Mutable access to the positions, without allowing the count to change.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Feature] {
        &mut self.0
    }

    /// Returns the index of the centroid nearest to `feature`.
    ///
    /// Ties go to the lowest index.
    #[inline]
    #[must_use]
    pub fn nearest(&self, feature: &Feature) -> usize {
        let mut nearest = 0;
        let mut min_distance = f64::INFINITY;
        for (i, centroid) in self.0.iter().enumerate() {
            let distance = crate::squared_distance(feature, centroid);
            if distance < min_distance {
                min_distance = distance;
                nearest = i;
            }
        }
        nearest
    }
}

impl From<Centroids> for Vec<Feature> {
    fn from(value: Centroids) -> Self {
        value.into_inner()
    }
}

impl Index<usize> for Centroids {
    type Output = Feature;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
