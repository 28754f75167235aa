//! Contains the data types shared across the crate.

use crate::{Error, Result, MAX_PIXELS};
use palette::Srgb;
use std::ops::Deref;
#[cfg(feature = "threads")]
use rayon::prelude::*;
#[cfg(feature = "image")]
use {image::RgbImage, palette::cast::ComponentsAs};

/// A point in the 3-dimensional feature (color) space.
pub type Feature = [f64; 3];

/// The squared Euclidean distance between two features.
#[inline]
#[must_use]
pub fn squared_distance(a: &Feature, b: &Feature) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d0 * d0 + d1 * d1 + d2 * d2
}

/// A single observation: a color feature tagged with its pixel coordinate.
///
/// Samples are never mutated once created; only their cluster label
/// (stored separately in an [`AssignmentTable`]) changes across iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// The color channels of the pixel in the clustering color space.
    pub feature: Feature,
    /// The `(x, y)` position of the pixel in the source image.
    pub coord: (u32, u32),
}

impl Sample {
    /// Creates a new [`Sample`] from a raw feature vector.
    #[must_use]
    pub const fn new(feature: Feature, coord: (u32, u32)) -> Self {
        Self { feature, coord }
    }

    /// Creates a new [`Sample`] whose feature is the sRGB channels in the range `0.0..=255.0`.
    #[must_use]
    pub fn from_srgb(color: Srgb<u8>, coord: (u32, u32)) -> Self {
        let Srgb { red, green, blue, .. } = color;
        Self::new([red.into(), green.into(), blue.into()], coord)
    }
}

/// Converts a row-major pixel grid into samples, one per pixel.
///
/// `convert` maps each pixel to its feature vector (e.g., an sRGB or Oklab triple).
///
/// # Errors
/// Returns [`Error::DimensionMismatch`] if `colors.len() != width * height`.
pub fn samples_from_pixels(
    colors: ColorSlice<Srgb<u8>>,
    width: u32,
    height: u32,
    convert: impl Fn(Srgb<u8>) -> Feature,
) -> Result<Vec<Sample>> {
    check_dimensions(colors, width, height)?;
    Ok(colors
        .iter()
        .enumerate()
        .map(|(i, &color)| Sample::new(convert(color), coord_of(i, width)))
        .collect())
}

/// Converts a row-major pixel grid into samples in parallel.
///
/// See [`samples_from_pixels`] for more details.
///
/// # Errors
/// Returns [`Error::DimensionMismatch`] if `colors.len() != width * height`.
#[cfg(feature = "threads")]
pub fn samples_from_pixels_par(
    colors: ColorSlice<Srgb<u8>>,
    width: u32,
    height: u32,
    convert: impl Fn(Srgb<u8>) -> Feature + Sync,
) -> Result<Vec<Sample>> {
    check_dimensions(colors, width, height)?;
    Ok(colors
        .par_iter()
        .enumerate()
        .map(|(i, &color)| Sample::new(convert(color), coord_of(i, width)))
        .collect())
}

/// Ensures the pixel slice covers the whole `width * height` grid.
fn check_dimensions(colors: ColorSlice<Srgb<u8>>, width: u32, height: u32) -> Result<()> {
    let expected = width as usize * height as usize;
    if colors.len() == expected {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { expected, found: colors.len() })
    }
}

/// The row-major coordinate of the `i`-th pixel.
#[inline]
fn coord_of(i: usize, width: u32) -> (u32, u32) {
    let width = width as usize;
    #[allow(clippy::cast_possible_truncation)]
    {
        // i < MAX_PIXELS, so both components fit in a u32
        ((i % width) as u32, (i / width) as u32)
    }
}

/// Maps each sample index to the index of its nearest centroid.
///
/// Every entry starts out as [`AssignmentTable::UNASSIGNED`]
/// and holds a centroid index once an assignment step has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTable(Vec<u32>);

impl AssignmentTable {
    /// The sentinel value for a sample that has not been assigned yet.
    pub const UNASSIGNED: u32 = u32::MAX;

    /// Creates a table for `len` samples with every entry unassigned.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self(vec![Self::UNASSIGNED; len])
    }

    /// Returns the number of entries in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the centroid index for the `i`-th sample, if it has been assigned.
    ///
    /// # Panics
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<usize> {
        match self.0[i] {
            Self::UNASSIGNED => None,
            index => Some(index as usize),
        }
    }

    /// Returns `true` if every sample has been assigned a centroid.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.0.iter().all(|&i| i != Self::UNASSIGNED)
    }

    /// Returns the number of samples assigned to each of the `k` centroids.
    #[must_use]
    pub fn counts(&self, k: usize) -> Vec<u32> {
        let mut counts = vec![0; k];
        for index in self.iter().flatten() {
            counts[index] += 1;
        }
        counts
    }

    /// Iterates over the entries in sample order.
    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }

    /// The raw entries, with [`AssignmentTable::UNASSIGNED`] for unassigned samples.
    #[must_use]
    pub fn as_raw(&self) -> &[u32] {
        &self.0
    }

    /// Mutable access to the raw entries for the assignment step.
    pub(crate) fn as_raw_mut(&mut self) -> &mut [u32] {
        &mut self.0
    }
}

/// A simple new type wrapper around `&'a [Color]` with the invariant that the length of the
/// inner slice must not be greater than [`MAX_PIXELS`].
///
/// # Examples
/// From a raw color slice:
/// ```
/// # use chromaseg::ColorSlice;
/// # use palette::Srgb;
/// # fn main() -> Result<(), chromaseg::Error> {
/// let srgb = vec![Srgb::new(0, 0, 0)];
/// let colors: ColorSlice<_> = srgb.as_slice().try_into()?;
/// # Ok(())
/// # }
/// ```
///
/// From an image (needs the `image` feature to be enabled):
/// ```no_run
/// # use chromaseg::ColorSlice;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgb8();
/// let colors = ColorSlice::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorSlice<'a, Color>(&'a [Color]);

impl<'a, Color> Clone for ColorSlice<'a, Color> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, Color> Copy for ColorSlice<'a, Color> {}

impl<'a, Color> Deref for ColorSlice<'a, Color> {
    type Target = [Color];

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<'a, Color> TryFrom<&'a [Color]> for ColorSlice<'a, Color> {
    type Error = Error;

    fn try_from(slice: &'a [Color]) -> Result<Self> {
        if slice.len() <= MAX_PIXELS as usize {
            Ok(Self(slice))
        } else {
            Err(Error::AboveMaxLen(MAX_PIXELS))
        }
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a RgbImage> for ColorSlice<'a, Srgb<u8>> {
    type Error = Error;

    fn try_from(image: &'a RgbImage) -> Result<Self> {
        let pixels = image.pixels().len();
        if pixels <= MAX_PIXELS as usize {
            let buf = &image.as_raw()[..(pixels * 3)];
            Ok(Self(buf.components_as()))
        } else {
            Err(Error::AboveMaxLen(MAX_PIXELS))
        }
    }
}
