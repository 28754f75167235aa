//! Contains the [`SegmentPipeline`] builder struct for the high level API.

use crate::{
    kmeans::{self, Centroids, Segmentation, Termination},
    render::{self, RenderedPixel},
    samples_from_pixels, ColorSlice, ColorSpace, Error, KmeansOptions, Result, Sample,
};
use palette::Srgb;
#[cfg(feature = "threads")]
use crate::samples_from_pixels_par;
#[cfg(feature = "image")]
use image::RgbImage;

/// The output of a [`SegmentPipeline`] run in compact, indexed form.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentOutput {
    /// The sRGB color of each cluster's centroid.
    ///
    /// The colors are not guaranteed to be unique.
    pub palette: Vec<Srgb<u8>>,
    /// The number of pixels assigned to each color in `palette`.
    pub counts: Vec<u32>,
    /// The index into `palette` for each pixel, in row-major order.
    pub indices: Vec<u32>,
    /// The number of centroid updates performed.
    pub iterations: u32,
    /// Whether k-means converged or hit the iteration cap.
    pub termination: Termination,
}

/// A builder struct to specify options to segment an image.
///
/// # Examples
/// To start, create a [`SegmentPipeline`] from a [`RgbImage`] (note that the `image` feature is needed):
/// ```no_run
/// # use chromaseg::SegmentPipeline;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgb8();
/// let mut pipeline = SegmentPipeline::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
///
/// Then, change the clustering options:
/// ```
/// # use chromaseg::SegmentPipeline;
/// # use palette::Srgb;
/// # fn main() -> Result<(), chromaseg::Error> {
/// # let srgb = vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)];
/// # let mut pipeline = SegmentPipeline::new(srgb.as_slice().try_into()?, 2, 1)?;
/// let pipeline = pipeline
///     .k(2)
///     .max_iterations(20)
///     .seed(42);
/// # Ok(())
/// # }
/// ```
///
/// Finally, run the pipeline:
/// ```
/// # use chromaseg::SegmentPipeline;
/// # use palette::Srgb;
/// # fn main() -> Result<(), chromaseg::Error> {
/// # let srgb = vec![Srgb::new(0, 0, 0), Srgb::new(255, 255, 255)];
/// # let mut pipeline = SegmentPipeline::new(srgb.as_slice().try_into()?, 2, 1)?;
/// let output = pipeline.k(2).segmented()?;
/// assert_eq!(output.counts, vec![1, 1]);
/// # Ok(())
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct SegmentPipeline<'a> {
    /// The input image as a flat slice of pixels.
    colors: ColorSlice<'a, Srgb<u8>>,
    /// The dimensions of the image.
    dimensions: (u32, u32),
    /// The k-means parameters.
    options: KmeansOptions,
    /// The color space to cluster in.
    colorspace: ColorSpace,
}

impl<'a> SegmentPipeline<'a> {
    /// The default number of clusters.
    pub const DEFAULT_K: usize = 5;

    /// Creates a new [`SegmentPipeline`] with default options.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if the length of `colors` is not equal to `width * height`.
    pub fn new(colors: ColorSlice<'a, Srgb<u8>>, width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize;
        if colors.len() == expected {
            Ok(Self {
                colors,
                dimensions: (width, height),
                options: KmeansOptions::new(Self::DEFAULT_K),
                colorspace: ColorSpace::Srgb,
            })
        } else {
            Err(Error::DimensionMismatch { expected, found: colors.len() })
        }
    }

    /// Sets the number of clusters (segments).
    ///
    /// The default is [`SegmentPipeline::DEFAULT_K`].
    pub fn k(&mut self, k: usize) -> &mut Self {
        self.options = self.options.k(k);
        self
    }

    /// Sets the maximum number of k-means iterations.
    ///
    /// The default is [`KmeansOptions::DEFAULT_MAX_ITERATIONS`].
    pub fn max_iterations(&mut self, max_iterations: u32) -> &mut Self {
        self.options = self.options.max_iterations(max_iterations);
        self
    }

    /// Sets the seed value for the random number generator.
    ///
    /// The default seed is `0`.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.options = self.options.seed(seed);
        self
    }

    /// Replaces all k-means parameters at once.
    pub fn options(&mut self, options: KmeansOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Sets the color space to cluster in.
    ///
    /// See [`ColorSpace`] for more details.
    ///
    /// The default color space is [`ColorSpace::Srgb`].
    #[cfg(feature = "colorspaces")]
    pub fn colorspace(&mut self, colorspace: ColorSpace) -> &mut Self {
        self.colorspace = colorspace;
        self
    }

    /// Returns the dimensions of the input image.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Converts the input pixels into samples in the configured color space.
    ///
    /// # Errors
    /// Returns [`Error::DimensionMismatch`] if the pixel count does not match the dimensions.
    pub fn samples(&self) -> Result<Vec<Sample>> {
        let (width, height) = self.dimensions;
        let colorspace = self.colorspace;
        samples_from_pixels(self.colors, width, height, |c| colorspace.feature_from_srgb(c))
    }

    /// Converts the centroids back to sRGB features for rendering.
    fn srgb_centroids(&self, centroids: &Centroids) -> Centroids {
        Centroids::new(
            centroids
                .as_slice()
                .iter()
                .map(|&c| self.colorspace.srgb_from_feature(c))
                .collect(),
        )
    }

    /// Summarizes a finished clustering.
    fn output(&self, segmentation: Segmentation) -> SegmentOutput {
        let counts = segmentation.counts();
        let Segmentation { centroids, assignments, iterations, termination } = segmentation;
        SegmentOutput {
            palette: render::centroid_colors(&self.srgb_centroids(&centroids)),
            counts,
            indices: assignments.as_raw().to_vec(),
            iterations,
            termination,
        }
    }

    /// Runs k-means on the image and returns the raw clustering along with the samples.
    ///
    /// Centroids are in the configured color space.
    ///
    /// # Errors
    /// Returns an error if the options are invalid for this image
    /// (see [`KmeansOptions::validate`]).
    pub fn segmentation(&self) -> Result<(Vec<Sample>, Segmentation)> {
        let samples = self.samples()?;
        let segmentation = kmeans::run(&samples, &self.options)?;
        Ok((samples, segmentation))
    }

    /// Runs the pipeline and returns the palette and per-pixel indices.
    ///
    /// # Errors
    /// See [`SegmentPipeline::segmentation`].
    pub fn segmented(&self) -> Result<SegmentOutput> {
        let (_, segmentation) = self.segmentation()?;
        Ok(self.output(segmentation))
    }

    /// Runs the pipeline and returns each pixel coordinate with its segment color.
    ///
    /// # Errors
    /// See [`SegmentPipeline::segmentation`].
    pub fn segmented_pixels(&self) -> Result<Vec<RenderedPixel>> {
        let (samples, segmentation) = self.segmentation()?;
        let centroids = self.srgb_centroids(&segmentation.centroids);
        Ok(render::render(&samples, &segmentation.assignments, &centroids))
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a RgbImage> for SegmentPipeline<'a> {
    type Error = Error;

    fn try_from(image: &'a RgbImage) -> Result<Self> {
        Self::new(image.try_into()?, image.width(), image.height())
    }
}

#[cfg(feature = "image")]
impl<'a> SegmentPipeline<'a> {
    /// Runs the pipeline and returns the segmented image.
    ///
    /// # Errors
    /// See [`SegmentPipeline::segmentation`].
    pub fn segmented_rgbimage(&self) -> Result<RgbImage> {
        let (width, height) = self.dimensions;
        let pixels = self.segmented_pixels()?;
        Ok(render::pixels_to_rgbimage(width, height, &pixels))
    }
}

#[cfg(feature = "threads")]
impl<'a> SegmentPipeline<'a> {
    /// Converts the input pixels into samples in parallel.
    ///
    /// # Errors
    /// See [`SegmentPipeline::samples`].
    pub fn samples_par(&self) -> Result<Vec<Sample>> {
        let (width, height) = self.dimensions;
        let colorspace = self.colorspace;
        samples_from_pixels_par(self.colors, width, height, |c| {
            colorspace.feature_from_srgb(c)
        })
    }

    /// Runs k-means on the image in parallel.
    ///
    /// # Errors
    /// See [`SegmentPipeline::segmentation`].
    pub fn segmentation_par(&self) -> Result<(Vec<Sample>, Segmentation)> {
        let samples = self.samples_par()?;
        let segmentation = kmeans::run_par(&samples, &self.options)?;
        Ok((samples, segmentation))
    }

    /// Runs the pipeline in parallel and returns the palette and per-pixel indices.
    ///
    /// # Errors
    /// See [`SegmentPipeline::segmentation`].
    pub fn segmented_par(&self) -> Result<SegmentOutput> {
        let (_, segmentation) = self.segmentation_par()?;
        Ok(self.output(segmentation))
    }

    /// Runs the pipeline in parallel and returns each pixel coordinate with its segment color.
    ///
    /// # Errors
    /// See [`SegmentPipeline::segmentation`].
    pub fn segmented_pixels_par(&self) -> Result<Vec<RenderedPixel>> {
        let (samples, segmentation) = self.segmentation_par()?;
        let centroids = self.srgb_centroids(&segmentation.centroids);
        Ok(render::render_par(&samples, &segmentation.assignments, &centroids))
    }
}

#[cfg(all(feature = "threads", feature = "image"))]
impl<'a> SegmentPipeline<'a> {
    /// Runs the pipeline in parallel and returns the segmented image.
    ///
    /// # Errors
    /// See [`SegmentPipeline::segmentation`].
    pub fn segmented_rgbimage_par(&self) -> Result<RgbImage> {
        let (width, height) = self.dimensions;
        let pixels = self.segmented_pixels_par()?;
        Ok(render::pixels_to_rgbimage(width, height, &pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    /// A 4x2 image with two distinct colors, each with slight variation.
    fn two_tone() -> Vec<Srgb<u8>> {
        vec![
            Srgb::new(10, 10, 10),
            Srgb::new(12, 10, 10),
            Srgb::new(250, 0, 0),
            Srgb::new(252, 0, 0),
            Srgb::new(11, 10, 10),
            Srgb::new(13, 10, 10),
            Srgb::new(251, 0, 0),
            Srgb::new(253, 0, 0),
        ]
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let colors = two_tone();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();
        assert_eq!(
            SegmentPipeline::new(colors, 3, 3).map(|p| p.dimensions()),
            Err(Error::DimensionMismatch { expected: 9, found: 8 })
        );
    }

    #[test]
    fn empty_image_is_rejected() {
        let colors: &[Srgb<u8>] = &[];
        let colors = ColorSlice::try_from(colors).unwrap();
        let pipeline = SegmentPipeline::new(colors, 0, 0).unwrap();
        assert_eq!(pipeline.segmented(), Err(Error::EmptyInput));
    }

    #[test]
    fn too_many_segments_is_rejected() {
        let colors = two_tone();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();
        let mut pipeline = SegmentPipeline::new(colors, 4, 2).unwrap();
        assert_eq!(
            pipeline.k(9).segmented(),
            Err(Error::InvalidClusterCount { requested: 9, n_samples: 8 })
        );
    }

    #[test]
    fn two_tone_image_splits_by_color() {
        let colors = two_tone();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();
        let mut pipeline = SegmentPipeline::new(colors, 4, 2).unwrap();
        let output = pipeline.k(2).seed(3).segmented().unwrap();

        assert_eq!(output.termination, Termination::Converged);
        assert_eq!(output.counts, vec![4, 4]);

        let dark = output.indices[0];
        let red = output.indices[2];
        assert_ne!(dark, red);
        assert_eq!(output.indices, vec![dark, dark, red, red, dark, dark, red, red]);
        assert_eq!(output.palette[dark as usize], Srgb::new(12, 10, 10));
        assert_eq!(output.palette[red as usize], Srgb::new(252, 0, 0));
    }

    #[test]
    fn rendered_pixels_cover_the_grid() {
        let colors = two_tone();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();
        let mut pipeline = SegmentPipeline::new(colors, 4, 2).unwrap();
        let pixels = pipeline.k(2).seed(1).segmented_pixels().unwrap();

        let coords = pixels.iter().map(|&(coord, _)| coord).collect::<Vec<_>>();
        let expected = (0..2)
            .flat_map(|y| (0..4).map(move |x| (x, y)))
            .collect::<Vec<_>>();
        assert_eq!(coords, expected);
        assert_eq!(pixels[0].1, pixels[5].1);
        assert_eq!(pixels[2].1, pixels[7].1);
    }

    #[test]
    #[cfg(feature = "colorspaces")]
    fn oklab_segments_like_srgb_on_distinct_colors() {
        let colors = two_tone();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();
        let mut pipeline = SegmentPipeline::new(colors, 4, 2).unwrap();
        let srgb = pipeline.k(2).seed(9).segmented().unwrap();
        let oklab = pipeline.colorspace(ColorSpace::Oklab).segmented().unwrap();

        assert_eq!(oklab.counts, vec![4, 4]);
        let same_partition = srgb
            .indices
            .iter()
            .zip(&oklab.indices)
            .all(|(a, b)| (a == &srgb.indices[0]) == (b == &oklab.indices[0]));
        assert!(same_partition);
    }

    #[test]
    #[cfg(feature = "threads")]
    fn single_and_multi_threaded_match() {
        let colors = test_data_1024();
        let colors = ColorSlice::try_from(colors.as_slice()).unwrap();
        let mut pipeline = SegmentPipeline::new(colors, 32, 32).unwrap();
        pipeline.k(7).seed(2);

        assert_eq!(pipeline.segmented().unwrap(), pipeline.segmented_par().unwrap());
        assert_eq!(
            pipeline.segmented_pixels().unwrap(),
            pipeline.segmented_pixels_par().unwrap()
        );
    }

    #[test]
    #[cfg(feature = "image")]
    fn rgbimage_round_trip_dimensions() {
        let colors = two_tone();
        let mut image = RgbImage::new(4, 2);
        for (pixel, color) in image.pixels_mut().zip(&colors) {
            *pixel = image::Rgb((*color).into());
        }

        let mut pipeline = SegmentPipeline::try_from(&image).unwrap();
        let segmented = pipeline.k(2).segmented_rgbimage().unwrap();
        assert_eq!(segmented.dimensions(), (4, 2));
        assert_eq!(segmented.get_pixel(0, 0).0, [12, 10, 10]);
        assert_eq!(segmented.get_pixel(3, 1).0, [252, 0, 0]);
    }
}
