//! Maps a finished clustering back to pixel colors.
//!
//! Every sample is painted with the color of its cluster's centroid.
//! Centroid features are expected to be sRGB channels in `0.0..=255.0`
//! (see [`ColorSpace::srgb_from_feature`](crate::ColorSpace::srgb_from_feature));
//! out of range or non-finite channels are clamped rather than rejected.

use crate::{kmeans::Centroids, AssignmentTable, Feature, Sample};

use palette::Srgb;
#[cfg(feature = "threads")]
use rayon::prelude::*;
#[cfg(feature = "image")]
use {
    crate::{Error, Result},
    image::{Rgb, RgbImage},
};

/// A pixel coordinate paired with its rendered color.
pub type RenderedPixel = ((u32, u32), Srgb<u8>);

/// Rounds and clamps a channel value to `0..=255`. `NAN` becomes `0`.
#[inline]
#[must_use]
pub fn clamp_channel(channel: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        // float to int casts saturate and map NAN to 0
        channel.round().clamp(0.0, 255.0) as u8
    }
}

/// Converts an sRGB feature to a displayable color.
#[must_use]
pub fn feature_to_srgb(feature: Feature) -> Srgb<u8> {
    let [red, green, blue] = feature.map(clamp_channel);
    Srgb::new(red, green, blue)
}

/// Returns the displayable color of each centroid.
#[must_use]
pub fn centroid_colors(centroids: &Centroids) -> Vec<Srgb<u8>> {
    centroids.as_slice().iter().copied().map(feature_to_srgb).collect()
}

/// The color of a single sample: its centroid's color, or its own color if it has no centroid.
///
/// [`AssignmentTable::UNASSIGNED`] is never a valid palette index, so it takes the fallback too.
#[inline]
fn pixel_color(sample: &Sample, label: u32, palette: &[Srgb<u8>]) -> Srgb<u8> {
    palette
        .get(label as usize)
        .copied()
        .unwrap_or_else(|| feature_to_srgb(sample.feature))
}

/// Pairs each sample's coordinate with the color of its assigned centroid.
///
/// Samples that were never assigned, or whose label is not an index into `centroids`,
/// keep their own color.
///
/// # Panics
/// Panics if `table` does not have exactly one entry per sample.
#[must_use]
pub fn render(
    samples: &[Sample],
    table: &AssignmentTable,
    centroids: &Centroids,
) -> Vec<RenderedPixel> {
    assert_eq!(samples.len(), table.len());
    let palette = centroid_colors(centroids);
    samples
        .iter()
        .zip(table.as_raw())
        .map(|(sample, &label)| (sample.coord, pixel_color(sample, label, &palette)))
        .collect()
}

/// Pairs each sample's coordinate with the color of its assigned centroid in parallel.
///
/// See [`render`] for more details.
///
/// # Panics
/// Panics if `table` does not have exactly one entry per sample.
#[cfg(feature = "threads")]
#[must_use]
pub fn render_par(
    samples: &[Sample],
    table: &AssignmentTable,
    centroids: &Centroids,
) -> Vec<RenderedPixel> {
    assert_eq!(samples.len(), table.len());
    let palette = centroid_colors(centroids);
    samples
        .par_iter()
        .zip(table.as_raw())
        .map(|(sample, &label)| (sample.coord, pixel_color(sample, label, &palette)))
        .collect()
}

/// Writes rendered pixels into a new `width x height` image.
///
/// Pixels not covered by `pixels` are left black and coordinates outside of the image are ignored.
#[cfg(feature = "image")]
#[must_use]
pub fn pixels_to_rgbimage(width: u32, height: u32, pixels: &[RenderedPixel]) -> RgbImage {
    let mut image = RgbImage::new(width, height);
    for &((x, y), color) in pixels {
        if x < width && y < height {
            image.put_pixel(x, y, Rgb(color.into()));
        }
    }
    image
}

/// Renders the clustering as a `width x height` image.
///
/// # Errors
/// Returns [`Error::DimensionMismatch`] if the number of samples is not `width * height`.
#[cfg(feature = "image")]
pub fn render_rgbimage(
    width: u32,
    height: u32,
    samples: &[Sample],
    table: &AssignmentTable,
    centroids: &Centroids,
) -> Result<RgbImage> {
    let expected = width as usize * height as usize;
    if samples.len() == expected {
        Ok(pixels_to_rgbimage(width, height, &render(samples, table, centroids)))
    } else {
        Err(Error::DimensionMismatch { expected, found: samples.len() })
    }
}
